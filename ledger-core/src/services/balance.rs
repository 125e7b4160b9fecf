//! Balance service - per-account balances derived from the transaction history

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{AccountBalance, UserId};
use crate::ports::LedgerStore;

/// Balances are recomputed by the store on every call, never cached here
pub struct BalanceService {
    store: Arc<dyn LedgerStore>,
}

impl BalanceService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Balance of every account owned by `owner`, ordered by account id
    pub fn get_balances(&self, owner: UserId) -> Result<Vec<AccountBalance>> {
        Ok(self.store.compute_balances(owner)?)
    }
}
