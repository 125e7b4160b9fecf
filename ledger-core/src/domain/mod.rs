//! Core domain entities
//!
//! All ledger entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod amount;
pub mod balance;
mod ids;
pub mod result;
mod session;
mod transaction;
mod user;

pub use account::Account;
pub use amount::Amount;
pub use balance::{derive_balances, AccountBalance};
pub use ids::{AccountId, TransactionId, UserId};
pub use session::SessionClaims;
pub use transaction::{NewTransaction, Transaction};
pub use user::User;

use result::{Error, Result};

/// Reject empty or whitespace-only required fields
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{} is required", field)));
    }
    Ok(())
}
