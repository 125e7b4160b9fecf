//! Account service - creating and listing a user's accounts

use std::sync::Arc;

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{require, Account, AccountId, UserId};
use crate::ports::{LedgerStore, StoreError};

pub struct AccountService {
    store: Arc<dyn LedgerStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Create an account named `name` for `owner`
    ///
    /// Names are unique per owner, compared exactly as given.
    pub fn create_account(&self, owner: UserId, name: &str) -> Result<AccountId> {
        require("account name", name)?;

        let conflict = || Error::conflict(format!("account {} already exists", name));

        if self.store.account_exists_by_name(owner, name)? {
            return Err(conflict());
        }

        match self.store.create_account(owner, name) {
            Ok(id) => {
                debug!(owner = %owner, account_id = %id, "created account");
                Ok(id)
            }
            Err(StoreError::Duplicate) => Err(conflict()),
            Err(e) => Err(e.into()),
        }
    }

    /// Accounts owned by `owner` (never anyone else's)
    pub fn list_accounts(&self, owner: UserId) -> Result<Vec<Account>> {
        Ok(self.store.list_accounts_by_owner(owner)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;

    fn setup() -> (AccountService, Arc<dyn LedgerStore>) {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryStore::new());
        (AccountService::new(Arc::clone(&store)), store)
    }

    #[test]
    fn test_create_and_list() {
        let (service, store) = setup();
        let alice = store.create_user("alice", "h").unwrap();

        let cash = service.create_account(alice, "Cash").unwrap();
        let loan = service.create_account(alice, "Loan").unwrap();

        let accounts = service.list_accounts(alice).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, cash);
        assert_eq!(accounts[1].id, loan);
        assert!(accounts.iter().all(|a| a.owner == alice));
    }

    #[test]
    fn test_empty_name_rejected() {
        let (service, store) = setup();
        let alice = store.create_user("alice", "h").unwrap();
        assert!(matches!(service.create_account(alice, ""), Err(Error::InvalidInput(_))));
        assert!(matches!(service.create_account(alice, "  "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_name_is_conflict() {
        let (service, store) = setup();
        let alice = store.create_user("alice", "h").unwrap();
        service.create_account(alice, "Cash").unwrap();

        let err = service.create_account(alice, "Cash").unwrap_err();
        assert_eq!(err, Error::conflict("account Cash already exists"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let (service, store) = setup();
        let alice = store.create_user("alice", "h").unwrap();
        service.create_account(alice, "Cash").unwrap();
        assert!(service.create_account(alice, "CASH").is_ok());
    }
}
