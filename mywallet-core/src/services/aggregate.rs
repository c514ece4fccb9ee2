//! Aggregate service - per-user balance summary management

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{BalanceAggregate, BalancePatch};
use crate::ports::WalletStore;

/// Aggregate service managing the independently-authored balance summary
///
/// The summary is not derived from ledger entries; clients own its figures
/// and push partial updates. The service only guards existence and merge
/// semantics.
pub struct AggregateService {
    store: Arc<dyn WalletStore>,
}

impl AggregateService {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Create the aggregate row for a user: zeroed, then any fields the
    /// patch supplies. Fails with `Conflict` if one already exists.
    pub fn init(&self, user_id: Uuid, patch: &BalancePatch) -> Result<BalanceAggregate> {
        if self.store.get_user_by_id(user_id)?.is_none() {
            return Err(Error::not_found(format!("No user {}", user_id)));
        }
        let mut aggregate = BalanceAggregate::new(user_id);
        if !patch.is_empty() {
            aggregate.apply(patch);
        }
        self.store.insert_aggregate(&aggregate)?;
        Ok(aggregate)
    }

    /// Fetch the aggregate, if the user has initialized one.
    pub fn get(&self, user_id: Uuid) -> Result<Option<BalanceAggregate>> {
        self.store.get_aggregate(user_id)
    }

    /// Merge a partial update into an existing aggregate.
    ///
    /// Update-only: a user without an aggregate gets `NotFound`, never an
    /// implicit row. Returns the row as it was BEFORE the merge; callers
    /// wanting the new state read again.
    pub fn merge(&self, user_id: Uuid, patch: &BalancePatch) -> Result<BalanceAggregate> {
        self.store.merge_aggregate(user_id, patch)
    }
}
