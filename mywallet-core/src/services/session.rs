//! Session service - bearer token issuance and resolution

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Session, User, TOKEN_BYTES};
use crate::ports::WalletStore;

/// Session service issuing and resolving opaque bearer tokens
pub struct SessionService {
    store: Arc<dyn WalletStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn WalletStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Issue a fresh session for the given user.
    ///
    /// Multiple live sessions per user are allowed; logging in twice gives
    /// two independent tokens.
    pub fn issue(&self, user_id: Uuid) -> Result<Session> {
        let token = generate_token();
        let session = Session::new(token, user_id, self.ttl);
        self.store.insert_session(&session)?;
        Ok(session)
    }

    /// Resolve a token to its user.
    ///
    /// Expiry is checked lazily here: an expired session is deleted on
    /// first sight and reported as `Expired`. Unknown tokens and sessions
    /// whose user row has gone are both `Unauthenticated`.
    pub fn resolve(&self, token: &str) -> Result<User> {
        if token.trim().is_empty() {
            return Err(Error::Unauthenticated);
        }

        let session = self
            .store
            .get_session_by_token(token)?
            .ok_or(Error::Unauthenticated)?;

        if session.is_expired(Utc::now()) {
            self.store.delete_session(token)?;
            return Err(Error::Expired);
        }

        self.store
            .get_user_by_id(session.user_id)?
            .ok_or(Error::Unauthenticated)
    }

    /// Revoke a session. Returns true if a live session was removed.
    pub fn revoke(&self, token: &str) -> Result<bool> {
        self.store.delete_session(token)
    }
}

/// 32 bytes from the OS RNG, URL-safe base64 without padding.
/// Uniqueness is ultimately enforced by the token primary key.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
