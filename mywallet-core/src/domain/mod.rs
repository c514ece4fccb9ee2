//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod aggregate;
mod entry;
mod session;
mod user;
mod wallet;
pub mod result;

pub use aggregate::{BalanceAggregate, BalancePatch};
pub use entry::{EntryKind, LedgerEntry};
pub use session::{Session, TOKEN_BYTES};
pub use user::{normalize_email, User, UserProfile};
pub use wallet::WalletSnapshot;
