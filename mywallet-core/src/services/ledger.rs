//! Ledger service - income/expense recording and listing

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{EntryKind, LedgerEntry};
use crate::ports::WalletStore;

/// Ledger service for recording and listing wallet movements
pub struct LedgerService {
    store: Arc<dyn WalletStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Record an income entry. `amount` is the positive magnitude.
    pub fn record_income(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: &str,
        entry_date: NaiveDate,
    ) -> Result<LedgerEntry> {
        self.record(user_id, amount, description, entry_date, EntryKind::Income)
    }

    /// Record an expense entry. `amount` is the positive magnitude; the
    /// stored amount is negated.
    pub fn record_expense(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: &str,
        entry_date: NaiveDate,
    ) -> Result<LedgerEntry> {
        self.record(user_id, amount, description, entry_date, EntryKind::Expense)
    }

    fn record(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: &str,
        entry_date: NaiveDate,
        kind: EntryKind,
    ) -> Result<LedgerEntry> {
        let mut problems = Vec::new();
        if amount <= Decimal::ZERO {
            problems.push("amount must be greater than zero".to_string());
        }
        if description.trim().is_empty() {
            problems.push("description must not be empty".to_string());
        }
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }

        if self.store.get_user_by_id(user_id)?.is_none() {
            return Err(Error::not_found(format!("No user {}", user_id)));
        }

        let entry = LedgerEntry::new(user_id, amount, description.trim(), entry_date, kind);
        self.store.insert_entry(&entry)?;

        // Re-read so the caller sees the assigned position
        let stored = self
            .store
            .list_entries_by_user(user_id)?
            .into_iter()
            .find(|e| e.id == entry.id)
            .unwrap_or(entry);
        Ok(stored)
    }

    /// List all entries for a user in insertion order.
    pub fn list_by_user(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        if self.store.get_user_by_id(user_id)?.is_none() {
            return Err(Error::not_found(format!("No user {}", user_id)));
        }
        self.store.list_entries_by_user(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::User;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn setup() -> (LedgerService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("Maria", "maria@example.com", "$argon2id$fake");
        store.insert_user(&user).unwrap();
        (LedgerService::new(store), user.id)
    }

    #[test]
    fn test_income_positive_expense_negative() {
        let (svc, user_id) = setup();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let income = svc
            .record_income(user_id, dec("1500.00"), "Salary", date)
            .unwrap();
        let expense = svc
            .record_expense(user_id, dec("42.50"), "Groceries", date)
            .unwrap();

        assert_eq!(income.amount, dec("1500.00"));
        assert_eq!(expense.amount, dec("-42.50"));
        assert_eq!(income.kind, EntryKind::Income);
        assert_eq!(expense.kind, EntryKind::Expense);
    }

    #[test]
    fn test_listing_preserves_insertion_order() {
        let (svc, user_id) = setup();
        let early = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        // Recorded out of date order on purpose
        svc.record_income(user_id, dec("10"), "first", late).unwrap();
        svc.record_income(user_id, dec("20"), "second", early).unwrap();
        svc.record_expense(user_id, dec("5"), "third", late).unwrap();

        let entries = svc.list_by_user(user_id).unwrap();
        let descriptions: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rejects_non_positive_amount_and_blank_description() {
        let (svc, user_id) = setup();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let err = svc
            .record_income(user_id, Decimal::ZERO, "  ", date)
            .unwrap_err();
        match err {
            Error::Validation(problems) => assert_eq!(problems.len(), 2),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let (svc, _user_id) = setup();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ghost = Uuid::new_v4();

        assert!(matches!(
            svc.record_income(ghost, dec("10"), "x", date).unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            svc.list_by_user(ghost).unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
