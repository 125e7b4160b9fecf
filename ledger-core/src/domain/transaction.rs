//! Transaction domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::ids::{AccountId, TransactionId};

/// A validated transaction that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub detail: String,
    pub amount: Amount,
    pub credit_account: AccountId,
    pub debit_account: AccountId,
}

/// A recorded double-entry transaction
///
/// `amount` moves into `credit_account` and out of `debit_account`.
/// Transactions are immutable; a reversal is a new offsetting transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub detail: String,
    pub amount: Amount,
    pub credit_account: AccountId,
    pub debit_account: AccountId,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn from_new(id: TransactionId, new: NewTransaction, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            detail: new.detail,
            amount: new.amount,
            credit_account: new.credit_account,
            debit_account: new.debit_account,
            created_at,
        }
    }

    /// True if either side of the transaction is `account`
    pub fn touches(&self, account: AccountId) -> bool {
        self.credit_account == account || self.debit_account == account
    }
}
