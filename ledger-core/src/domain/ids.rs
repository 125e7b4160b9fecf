//! Identifier newtypes
//!
//! Users, accounts and transactions all get sequential `i64` identifiers from
//! the store. Wrapping them keeps an account id from being passed where a
//! user id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::Error;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| Error::invalid_input(format!("invalid {}: {}", $label, s)))
            }
        }
    };
}

define_id!(
    /// Identifier of a registered user
    UserId,
    "user id"
);
define_id!(
    /// Identifier of an account
    AccountId,
    "account id"
);
define_id!(
    /// Identifier of a recorded transaction
    TransactionId,
    "transaction id"
);
