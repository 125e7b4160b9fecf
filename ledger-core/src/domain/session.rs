//! Session token claims

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::UserId;

/// Claims carried by a signed session token
///
/// `nonce` makes every issued token distinct, even when a user logs in twice
/// within the same second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub nonce: Uuid,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user_id: UserId, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            user_id,
            nonce: Uuid::new_v4(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }
}
