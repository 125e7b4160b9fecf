//! In-memory ledger store
//!
//! Same contract as the DuckDB store, held in plain vectors behind one
//! mutex. Used by tests and by `LedgerContext::in_memory`.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::{
    derive_balances, Account, AccountBalance, AccountId, NewTransaction, Transaction,
    TransactionId, User, UserId,
};
use crate::ports::{LedgerStore, StoreError, StoreResult};

#[derive(Default)]
struct State {
    users: Vec<User>,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
}

impl State {
    fn owns(&self, owner: UserId, id: AccountId) -> bool {
        self.accounts.iter().any(|a| a.id == id && a.owner == owner)
    }

    fn accounts_of(&self, owner: UserId) -> Vec<Account> {
        self.accounts
            .iter()
            .filter(|a| a.owner == owner)
            .cloned()
            .collect()
    }
}

/// Ledger store kept entirely in memory
///
/// Identifiers are assigned sequentially from 1, matching the DuckDB
/// sequences.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| StoreError::Io(format!("Lock poisoned: {}", e)))
    }
}

impl LedgerStore for InMemoryStore {
    fn user_exists(&self, username: &str) -> StoreResult<bool> {
        let state = self.lock()?;
        Ok(state.users.iter().any(|u| u.username == username))
    }

    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserId> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Duplicate);
        }

        let id = UserId(state.users.len() as i64 + 1);
        state.users.push(User::new(id, username, password_hash));
        Ok(id)
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    fn account_exists_by_name(&self, owner: UserId, name: &str) -> StoreResult<bool> {
        let state = self.lock()?;
        Ok(state
            .accounts
            .iter()
            .any(|a| a.owner == owner && a.name == name))
    }

    fn account_exists_by_id(&self, owner: UserId, id: AccountId) -> StoreResult<bool> {
        let state = self.lock()?;
        Ok(state.owns(owner, id))
    }

    fn create_account(&self, owner: UserId, name: &str) -> StoreResult<AccountId> {
        let mut state = self.lock()?;
        if !state.users.iter().any(|u| u.id == owner) {
            return Err(StoreError::Io(format!("owner {} does not exist", owner)));
        }
        if state.accounts.iter().any(|a| a.owner == owner && a.name == name) {
            return Err(StoreError::Duplicate);
        }

        let id = AccountId(state.accounts.len() as i64 + 1);
        state.accounts.push(Account::new(id, owner, name));
        Ok(id)
    }

    fn list_accounts_by_owner(&self, owner: UserId) -> StoreResult<Vec<Account>> {
        let state = self.lock()?;
        Ok(state.accounts_of(owner))
    }

    fn create_transaction(&self, owner: UserId, new: &NewTransaction) -> StoreResult<TransactionId> {
        let mut state = self.lock()?;
        if !state.owns(owner, new.credit_account) || !state.owns(owner, new.debit_account) {
            return Err(StoreError::NotOwned);
        }

        let id = TransactionId(state.transactions.len() as i64 + 1);
        let tx = Transaction::from_new(id, new.clone(), Utc::now());
        state.transactions.push(tx);
        Ok(id)
    }

    fn compute_balances(&self, owner: UserId) -> StoreResult<Vec<AccountBalance>> {
        let state = self.lock()?;
        let accounts = state.accounts_of(owner);
        Ok(derive_balances(&accounts, &state.transactions))
    }

    fn list_transactions_touching_owner(&self, owner: UserId) -> StoreResult<Vec<Transaction>> {
        let state = self.lock()?;
        let accounts = state.accounts_of(owner);
        Ok(state
            .transactions
            .iter()
            .filter(|tx| accounts.iter().any(|a| tx.touches(a.id)))
            .cloned()
            .collect())
    }
}
