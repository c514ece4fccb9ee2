//! Balance aggregate domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hand-maintained cash summary for one user.
///
/// This is an independently authored figure, not a materialized view over
/// ledger entries; callers update it directly through merge operations.
/// At most one row exists per user, and absence is a normal state for a
/// freshly registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAggregate {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BalanceAggregate {
    /// Create a zeroed aggregate for a user
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            balance: Decimal::ZERO,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, leaving fields the patch does not mention
    /// untouched
    pub fn apply(&mut self, patch: &BalancePatch) {
        if let Some(balance) = patch.balance {
            self.balance = balance;
        }
        if let Some(income) = patch.income {
            self.income = income;
        }
        if let Some(expense) = patch.expense {
            self.expense = expense;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update payload for a balance aggregate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalancePatch {
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub income: Option<Decimal>,
    #[serde(default)]
    pub expense: Option<Decimal>,
}

impl BalancePatch {
    pub fn is_empty(&self) -> bool {
        self.balance.is_none() && self.income.is_none() && self.expense.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_leaves_unmentioned_fields() {
        let mut agg = BalanceAggregate::new(Uuid::new_v4());
        agg.income = Decimal::new(50000, 2);

        agg.apply(&BalancePatch {
            balance: Some(Decimal::new(12345, 2)),
            ..Default::default()
        });

        assert_eq!(agg.balance, Decimal::new(12345, 2));
        assert_eq!(agg.income, Decimal::new(50000, 2), "income untouched");
        assert_eq!(agg.expense, Decimal::ZERO);
    }

    #[test]
    fn test_empty_patch() {
        assert!(BalancePatch::default().is_empty());
        let patch = BalancePatch {
            expense: Some(Decimal::ONE),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
