//! Session domain model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of random bytes in a session token (256 bits of entropy)
pub const TOKEN_BYTES: usize = 32;

/// An issued bearer session
///
/// The token is opaque to clients: 32 bytes from the OS random source,
/// base64url-encoded without padding. A user may hold any number of
/// concurrent sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session expiring `ttl` after now
    pub fn new(token: impl Into<String>, user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: token.into(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the session has passed its expiry time
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
