//! Wallet snapshot domain model

use serde::{Deserialize, Serialize};

use crate::domain::{BalanceAggregate, LedgerEntry, UserProfile};

/// Read-only composed view of a user's wallet.
///
/// Built from a profile lookup (hash stripped), the optional balance
/// aggregate, and the full ledger listing. `uninitialized` is the explicit
/// flag for a user whose aggregate row does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub profile: UserProfile,
    pub uninitialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<BalanceAggregate>,
    pub entries: Vec<LedgerEntry>,
}

impl WalletSnapshot {
    pub fn new(
        profile: UserProfile,
        aggregate: Option<BalanceAggregate>,
        entries: Vec<LedgerEntry>,
    ) -> Self {
        Self {
            profile,
            uninitialized: aggregate.is_none(),
            aggregate,
            entries,
        }
    }
}
