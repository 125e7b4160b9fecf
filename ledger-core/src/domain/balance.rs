//! Account balance domain model
//!
//! Balances are never stored. They are derived from the full transaction
//! history every time they are asked for.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::Account;
use super::ids::AccountId;
use super::transaction::Transaction;

/// Derived balance of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: AccountId,
    pub account_name: String,
    pub balance: Decimal,
}

/// Compute `credits - debits` for every account in `accounts`
///
/// Transactions touching accounts outside `accounts` only contribute to the
/// sides that are listed. The result follows the order of `accounts`.
pub fn derive_balances(accounts: &[Account], transactions: &[Transaction]) -> Vec<AccountBalance> {
    let mut totals: HashMap<AccountId, Decimal> =
        accounts.iter().map(|a| (a.id, Decimal::ZERO)).collect();

    for tx in transactions {
        if let Some(total) = totals.get_mut(&tx.credit_account) {
            *total += tx.amount.value();
        }
        if let Some(total) = totals.get_mut(&tx.debit_account) {
            *total -= tx.amount.value();
        }
    }

    accounts
        .iter()
        .map(|a| AccountBalance {
            account_id: a.id,
            account_name: a.name.clone(),
            balance: totals.get(&a.id).copied().unwrap_or(Decimal::ZERO).normalize(),
        })
        .collect()
}
