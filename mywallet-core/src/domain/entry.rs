//! Ledger entry domain model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which logical ledger an entry was written to.
///
/// The kind is fixed by which recording operation the caller invoked, never
/// by a client-supplied sign field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

/// One immutable signed monetary record attributed to a user.
///
/// Append-only: entries are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Insertion position assigned by the store; listing orders by this,
    /// not by `entry_date`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    /// Signed amount: positive for income, negative for expense
    pub amount: Decimal,
    pub description: String,
    pub entry_date: NaiveDate,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create an entry from a positive magnitude; the sign is derived from
    /// the kind
    pub fn new(
        user_id: Uuid,
        magnitude: Decimal,
        description: impl Into<String>,
        entry_date: NaiveDate,
        kind: EntryKind,
    ) -> Self {
        let amount = match kind {
            EntryKind::Income => magnitude,
            EntryKind::Expense => -magnitude,
        };
        Self {
            id: Uuid::new_v4(),
            user_id,
            position: None,
            amount,
            description: description.into(),
            entry_date,
            kind,
            created_at: Utc::now(),
        }
    }
}
