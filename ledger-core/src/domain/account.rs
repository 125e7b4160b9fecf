//! Account domain model

use serde::{Deserialize, Serialize};

use super::ids::{AccountId, UserId};

/// A named account owned by exactly one user
///
/// Names are unique per owner and compared exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner: UserId,
    pub name: String,
}

impl Account {
    pub fn new(id: AccountId, owner: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
        }
    }
}
