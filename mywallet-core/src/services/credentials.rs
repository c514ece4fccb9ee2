//! Credential service - account registration and password verification

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::domain::result::{Error, Result};
use crate::domain::{normalize_email, User, UserProfile};
use crate::ports::WalletStore;

/// Minimum accepted display name length
pub const MIN_DISPLAY_NAME_LEN: usize = 3;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 4;

/// Credential service for registration and login checks
pub struct CredentialService {
    store: Arc<dyn WalletStore>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Register a new account.
    ///
    /// Validation problems are collected and reported together. Email
    /// uniqueness is NOT pre-checked here; the store's unique constraint is
    /// the single authority, so two concurrent registrations of the same
    /// address race down to one `Conflict` loser.
    pub fn register(&self, display_name: &str, email: &str, password: &str) -> Result<UserProfile> {
        let email = normalize_email(email);

        let mut problems = Vec::new();
        if display_name.trim().chars().count() < MIN_DISPLAY_NAME_LEN {
            problems.push(format!(
                "display name must be at least {} characters",
                MIN_DISPLAY_NAME_LEN
            ));
        }
        if !is_plausible_email(&email) {
            problems.push(format!("'{}' is not a valid email address", email));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            problems.push(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }

        let password_hash = self.hash_password(password)?;
        let user = User::new(display_name.trim(), &email, &password_hash);

        self.store.insert_user(&user)?;

        Ok(UserProfile::from(&user))
    }

    /// Verify an email/password pair, returning the matching user.
    ///
    /// Unknown email and wrong password both fail with the same `Auth` error
    /// so callers cannot probe which addresses are registered. The
    /// missing-account path still pays for one hash so the two failures take
    /// comparable time.
    pub fn verify(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);

        let user = match self.store.get_user_by_email(&email)? {
            Some(user) => user,
            None => {
                let _ = self.hash_password(password);
                return Err(Error::Auth);
            }
        };

        let parsed = PasswordHash::new(&user.password_hash).map_err(|_| Error::Auth)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| Error::Auth)?;

        Ok(user)
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::storage(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }
}

/// Cheap structural check: one '@' with a dotted, non-empty domain.
/// Deliverability is not our problem; obvious typos are.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
