//! Session keys - signing and verifying session tokens
//!
//! Tokens are HS256 JWTs carrying [`SessionClaims`]. Nothing is stored
//! server-side; the signature and expiry are checked on every call.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::result::{Error, Result};
use crate::domain::{SessionClaims, UserId};

/// Default token lifetime (24 hours)
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

/// Holds the server secret used to sign session tokens
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    /// Sign a token for `user_id`, issued at `issued_at` (unix seconds)
    pub fn issue(&self, user_id: UserId, issued_at: i64) -> Result<String> {
        let claims = SessionClaims::new(user_id, issued_at, self.ttl_secs);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::internal(format!("failed to sign session token: {}", e)))
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token.trim(), &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| Error::unauthorized("invalid session token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret-with-enough-entropy", DEFAULT_TTL_SECS)
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys();
        let now = Utc::now().timestamp();
        let token = keys.issue(UserId(7), now).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, UserId(7));
        assert_eq!(claims.iat, now);
        assert_eq!(claims.exp, now + DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let keys = keys();
        let now = Utc::now().timestamp();
        let first = keys.issue(UserId(1), now).unwrap();
        let second = keys.issue(UserId(1), now).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = keys().issue(UserId(1), Utc::now().timestamp()).unwrap();
        let other = SessionKeys::new(b"some-other-secret", DEFAULT_TTL_SECS);

        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let keys = SessionKeys::new(b"test-secret-with-enough-entropy", 60);
        let long_ago = Utc::now().timestamp() - 24 * 60 * 60;
        let token = keys.issue(UserId(1), long_ago).unwrap();

        assert!(matches!(keys.verify(&token), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        assert!(matches!(keys().verify("not-a-token"), Err(Error::Unauthorized(_))));
        assert!(matches!(keys().verify(""), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_tampered_token_is_unauthorized() {
        let keys = keys();
        let now = Utc::now().timestamp();
        let alice = keys.issue(UserId(1), now).unwrap();
        let mallory = keys.issue(UserId(2), now).unwrap();

        // Alice's signature on Mallory's claims
        let (mallory_body, _) = mallory.rsplit_once('.').unwrap();
        let (_, alice_sig) = alice.rsplit_once('.').unwrap();
        let forged = format!("{}.{}", mallory_body, alice_sig);

        assert!(matches!(keys.verify(&forged), Err(Error::Unauthorized(_))));
    }
}
