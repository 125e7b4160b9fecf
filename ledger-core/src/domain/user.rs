//! User domain model

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// A registered user
///
/// Users are immutable once registered. The password hash is a PHC string
/// (`$argon2id$...`) and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}
