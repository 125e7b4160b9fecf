//! Credential service - user registration and authentication

use std::sync::Arc;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{require, UserId};
use crate::ports::{LedgerStore, StoreError};

use super::session::SessionKeys;

/// Hash a password with Argon2id (default cost parameters) into a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| Error::internal(format!("failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::internal(format!("failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string
///
/// A mismatch is `Unauthorized`; a hash that cannot be parsed is `Internal`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| Error::internal(format!("stored password hash is malformed: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(Error::unauthorized("invalid password")),
        Err(e) => Err(Error::internal(format!("password verification failed: {}", e))),
    }
}

/// Registers users and exchanges credentials for session tokens
pub struct CredentialService {
    store: Arc<dyn LedgerStore>,
    sessions: Arc<SessionKeys>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn LedgerStore>, sessions: Arc<SessionKeys>) -> Self {
        Self { store, sessions }
    }

    /// Register a new user
    ///
    /// The existence check gives the common case a clean `Conflict`; the
    /// store's uniqueness constraint settles concurrent registrations.
    pub fn register(&self, username: &str, password: &str) -> Result<UserId> {
        require("username", username)?;
        require("password", password)?;

        if self.store.user_exists(username)? {
            return Err(Error::conflict(format!("user {} already exists", username)));
        }

        let hash = hash_password(password)?;
        match self.store.create_user(username, &hash) {
            Ok(id) => {
                debug!(user_id = %id, "registered user");
                Ok(id)
            }
            Err(StoreError::Duplicate) => {
                Err(Error::conflict(format!("user {} already exists", username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and issue a session token
    pub fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        require("username", username)?;

        let user = self
            .store
            .get_user_by_username(username)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", username)))?;

        verify_password(password, &user.password_hash)?;

        self.sessions.issue(user.id, Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::services::session::DEFAULT_TTL_SECS;

    fn service() -> (CredentialService, Arc<SessionKeys>) {
        let sessions = Arc::new(SessionKeys::new(b"unit-test-secret", DEFAULT_TTL_SECS));
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryStore::new());
        (CredentialService::new(store, Arc::clone(&sessions)), sessions)
    }

    #[test]
    fn test_hash_is_argon2id_phc() {
        let hash = hash_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pw1", &hash).is_ok());
        assert!(matches!(verify_password("pw2", &hash), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_is_internal() {
        assert!(matches!(verify_password("pw", "plaintext"), Err(Error::Internal(_))));
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let (service, _) = service();
        assert!(matches!(service.register("", "pw"), Err(Error::InvalidInput(_))));
        assert!(matches!(service.register("alice", ""), Err(Error::InvalidInput(_))));
        assert!(matches!(service.register("   ", "pw"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_register_then_authenticate() {
        let (service, sessions) = service();
        let id = service.register("alice", "pw1").unwrap();

        let token = service.authenticate("alice", "pw1").unwrap();
        assert_eq!(sessions.verify(&token).unwrap().user_id, id);
    }

    #[test]
    fn test_authenticate_failures() {
        let (service, _) = service();
        service.register("alice", "pw1").unwrap();

        assert!(matches!(service.authenticate("alice", "nope"), Err(Error::Unauthorized(_))));
        assert!(matches!(service.authenticate("bob", "pw1"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_register_duplicate_is_conflict() {
        let (service, _) = service();
        service.register("alice", "pw1").unwrap();
        let err = service.register("alice", "pw2").unwrap_err();
        assert_eq!(err, Error::conflict("user alice already exists"));
    }
}
