//! In-memory store for testing
//!
//! Implements the same contract as the DuckDB store (unique email, unique
//! token, update-only merge returning the prior row) without touching disk,
//! so service logic can be unit tested in isolation.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{BalanceAggregate, BalancePatch, LedgerEntry, Session, User};
use crate::ports::WalletStore;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    sessions: HashMap<String, Session>,
    entries: Vec<LedgerEntry>,
    aggregates: HashMap<Uuid, BalanceAggregate>,
    next_position: i64,
}

/// In-memory WalletStore implementation
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryStore {
    fn insert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(Error::conflict(format!(
                "Duplicate key \"email: {}\" violates unique constraint",
                user.email
            )));
        }
        inner.users.push(user.clone());
        Ok(())
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    fn insert_session(&self, session: &Session) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.sessions.contains_key(&session.token) {
            return Err(Error::conflict("Duplicate session token"));
        }
        inner.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    fn get_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.sessions.get(token).cloned())
    }

    fn delete_session(&self, token: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.sessions.remove(token).is_some())
    }

    fn insert_entry(&self, entry: &LedgerEntry) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.iter().any(|u| u.id == entry.user_id) {
            return Err(Error::not_found("referenced user does not exist"));
        }
        inner.next_position += 1;
        let mut stored = entry.clone();
        stored.position = Some(inner.next_position);
        inner.entries.push(stored);
        Ok(())
    }

    fn list_entries_by_user(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<LedgerEntry> = inner
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.position);
        Ok(entries)
    }

    fn insert_aggregate(&self, aggregate: &BalanceAggregate) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.aggregates.contains_key(&aggregate.user_id) {
            return Err(Error::conflict(format!(
                "Balance aggregate already exists for user {}",
                aggregate.user_id
            )));
        }
        inner.aggregates.insert(aggregate.user_id, aggregate.clone());
        Ok(())
    }

    fn get_aggregate(&self, user_id: Uuid) -> Result<Option<BalanceAggregate>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.aggregates.get(&user_id).cloned())
    }

    fn merge_aggregate(&self, user_id: Uuid, patch: &BalancePatch) -> Result<BalanceAggregate> {
        let mut inner = self.inner.lock().unwrap();
        let current = inner
            .aggregates
            .get_mut(&user_id)
            .ok_or_else(|| Error::not_found(format!("No balance aggregate for user {}", user_id)))?;
        let prior = current.clone();
        current.apply(patch);
        Ok(prior)
    }
}
