//! Store port - persistence abstraction

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{BalanceAggregate, BalancePatch, LedgerEntry, Session, User};

/// Persistence abstraction for the wallet backend
///
/// This trait defines all store operations. Implementations (adapters)
/// provide the actual persistence logic; services receive the store as an
/// explicit `Arc<dyn WalletStore>` so tests can substitute the in-memory
/// adapter.
///
/// Contract notes:
/// - `insert_user` must enforce email uniqueness at the storage layer (a
///   read-then-write check is not sufficient under concurrency) and fail
///   with `Conflict` on a duplicate.
/// - `insert_session` must reject a duplicate token with `Conflict`, even
///   though token entropy makes collisions negligible.
/// - `insert_entry` is an independent append; the store assigns the
///   insertion position and `list_entries_by_user` orders by it.
/// - `merge_aggregate` must apply the patch atomically with respect to
///   concurrent merges for the same user and return the row as it was
///   before the merge.
pub trait WalletStore: Send + Sync {
    // === Users ===

    /// Insert a new user; `Conflict` if the email is already registered
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Look up a user by normalized email
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up a user by id
    fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    // === Sessions ===

    /// Persist an issued session; `Conflict` if the token already exists
    fn insert_session(&self, session: &Session) -> Result<()>;

    /// Look up a session by exact token match
    fn get_session_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Delete a session; returns whether a row was removed
    fn delete_session(&self, token: &str) -> Result<bool>;

    // === Ledger entries ===

    /// Append an immutable entry; `NotFound` if the user does not exist
    fn insert_entry(&self, entry: &LedgerEntry) -> Result<()>;

    /// All entries for a user in insertion order; empty for no entries
    fn list_entries_by_user(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>>;

    // === Balance aggregates ===

    /// Create the single aggregate row for a user; `Conflict` if one exists
    fn insert_aggregate(&self, aggregate: &BalanceAggregate) -> Result<()>;

    /// Fetch the aggregate row; `None` is the expected state for new users
    fn get_aggregate(&self, user_id: Uuid) -> Result<Option<BalanceAggregate>>;

    /// Merge a partial update into the existing row and return the prior
    /// row; `NotFound` if no aggregate exists yet for this user
    fn merge_aggregate(&self, user_id: Uuid, patch: &BalancePatch) -> Result<BalanceAggregate>;
}
