//! Wallet service - composed read model for a user's wallet

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{UserProfile, WalletSnapshot};
use crate::ports::WalletStore;

/// Wallet service assembling the per-user snapshot
pub struct WalletService {
    store: Arc<dyn WalletStore>,
}

impl WalletService {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Build the composed wallet view for a user: profile (no credential
    /// material), the aggregate if initialized, and all ledger entries in
    /// insertion order. A user who never initialized an aggregate gets a
    /// snapshot flagged `uninitialized` instead of an error.
    pub fn compose(&self, user_id: Uuid) -> Result<WalletSnapshot> {
        let user = self
            .store
            .get_user_by_id(user_id)?
            .ok_or_else(|| Error::not_found(format!("No user {}", user_id)))?;

        let aggregate = self.store.get_aggregate(user_id)?;
        let entries = self.store.list_entries_by_user(user_id)?;

        Ok(WalletSnapshot::new(
            UserProfile::from(&user),
            aggregate,
            entries,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{BalanceAggregate, User};

    #[test]
    fn test_compose_for_fresh_user_is_uninitialized_and_hash_free() {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("Maria", "maria@example.com", "$argon2id$secret");
        store.insert_user(&user).unwrap();
        let svc = WalletService::new(store);

        let snapshot = svc.compose(user.id).unwrap();
        assert!(snapshot.uninitialized);
        assert!(snapshot.aggregate.is_none());
        assert!(snapshot.entries.is_empty());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_compose_after_init_carries_aggregate() {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("Maria", "maria@example.com", "$argon2id$secret");
        store.insert_user(&user).unwrap();
        store
            .insert_aggregate(&BalanceAggregate::new(user.id))
            .unwrap();
        let svc = WalletService::new(store);

        let snapshot = svc.compose(user.id).unwrap();
        assert!(!snapshot.uninitialized);
        assert!(snapshot.aggregate.is_some());
    }

    #[test]
    fn test_compose_unknown_user_is_not_found() {
        let svc = WalletService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            svc.compose(Uuid::new_v4()).unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
