//! Persistence port - ledger storage abstraction

use thiserror::Error;

use crate::domain::result::Error;
use crate::domain::{
    Account, AccountBalance, AccountId, NewTransaction, Transaction, TransactionId, User, UserId,
};

/// Failure surfaced by a store
///
/// Storage-specific detail is flattened into `Io`; the core only looks at
/// the variant, never the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Any storage failure, including cancellation. Retryable by the caller.
    #[error("storage failure: {0}")]
    Io(String),

    /// A uniqueness constraint rejected the write
    #[error("duplicate entry")]
    Duplicate,

    /// An account referenced by a new transaction is missing or has another owner
    #[error("account not owned by caller")]
    NotOwned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(detail) => Error::internal(detail),
            StoreError::Duplicate => Error::conflict("already exists"),
            StoreError::NotOwned => Error::invalid_input("credit or debit account does not exist"),
        }
    }
}

/// Ledger store abstraction
///
/// Implementations must be safe to share between threads. Every operation
/// is short-lived and synchronous; check-and-insert operations
/// (`create_user`, `create_account`, `create_transaction`) are atomic.
pub trait LedgerStore: Send + Sync {
    // === Users ===

    fn user_exists(&self, username: &str) -> StoreResult<bool>;

    /// Insert a user. Fails with `Duplicate` if the username is taken.
    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserId>;

    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    // === Accounts ===

    fn account_exists_by_name(&self, owner: UserId, name: &str) -> StoreResult<bool>;

    /// True only if the account exists and belongs to `owner`
    fn account_exists_by_id(&self, owner: UserId, id: AccountId) -> StoreResult<bool>;

    /// Insert an account. Fails with `Duplicate` if `owner` already has `name`.
    fn create_account(&self, owner: UserId, name: &str) -> StoreResult<AccountId>;

    /// Accounts owned by `owner`, ordered by id
    fn list_accounts_by_owner(&self, owner: UserId) -> StoreResult<Vec<Account>>;

    // === Transactions ===

    /// Re-check that both accounts belong to `owner` and insert, as one unit.
    /// Fails with `NotOwned` if either check fails.
    fn create_transaction(&self, owner: UserId, tx: &NewTransaction) -> StoreResult<TransactionId>;

    /// Balances of every account owned by `owner`, ordered by account id
    fn compute_balances(&self, owner: UserId) -> StoreResult<Vec<AccountBalance>>;

    /// Transactions where `owner` holds the credit side, the debit side, or both
    fn list_transactions_touching_owner(&self, owner: UserId) -> StoreResult<Vec<Transaction>>;
}
