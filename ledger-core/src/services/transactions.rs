//! Transaction service - recording and querying double-entry transactions

use std::sync::Arc;

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{AccountId, Amount, NewTransaction, Transaction, TransactionId, UserId};
use crate::ports::LedgerStore;

const ACCOUNT_MISSING: &str = "credit or debit account does not exist";

pub struct TransactionService {
    store: Arc<dyn LedgerStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Record `amount` moving into `credit` and out of `debit`
    ///
    /// Both accounts must belong to `owner`. An account owned by someone
    /// else is reported exactly like a missing one.
    pub fn record_transaction(
        &self,
        owner: UserId,
        detail: &str,
        credit: AccountId,
        debit: AccountId,
        amount: &str,
    ) -> Result<TransactionId> {
        let amount = Amount::parse(amount)?;

        if credit == debit {
            return Err(Error::invalid_input("credit and debit account must differ"));
        }

        if !self.store.account_exists_by_id(owner, credit)?
            || !self.store.account_exists_by_id(owner, debit)?
        {
            return Err(Error::invalid_input(ACCOUNT_MISSING));
        }

        let new = NewTransaction {
            detail: detail.to_string(),
            amount,
            credit_account: credit,
            debit_account: debit,
        };

        // The store re-checks ownership inside the insert; NotOwned maps to
        // the same InvalidInput as above.
        let id = self.store.create_transaction(owner, &new)?;
        debug!(owner = %owner, transaction_id = %id, "recorded transaction");
        Ok(id)
    }

    /// Every transaction touching an account owned by `owner`, from either side
    pub fn get_transactions(&self, owner: UserId) -> Result<Vec<Transaction>> {
        Ok(self.store.list_transactions_touching_owner(owner)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use rust_decimal::Decimal;

    struct Fixture {
        service: TransactionService,
        alice: UserId,
        cash: AccountId,
        loan: AccountId,
        bob_cash: AccountId,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryStore::new());
        let alice = store.create_user("alice", "h").unwrap();
        let bob = store.create_user("bob", "h").unwrap();
        let cash = store.create_account(alice, "Cash").unwrap();
        let loan = store.create_account(alice, "Loan").unwrap();
        let bob_cash = store.create_account(bob, "Cash").unwrap();
        Fixture {
            service: TransactionService::new(store),
            alice,
            cash,
            loan,
            bob_cash,
        }
    }

    #[test]
    fn test_record_and_list() {
        let f = fixture();
        let id = f
            .service
            .record_transaction(f.alice, "Bank Loan", f.cash, f.loan, "30000")
            .unwrap();

        let txs = f.service.get_transactions(f.alice).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, id);
        assert_eq!(txs[0].detail, "Bank Loan");
        assert_eq!(txs[0].amount.value(), Decimal::new(30000, 0));
    }

    #[test]
    fn test_invalid_amounts() {
        let f = fixture();
        for amount in ["", "zero", "0", "-10", "1.23456"] {
            let result = f.service.record_transaction(f.alice, "x", f.cash, f.loan, amount);
            assert!(matches!(result, Err(Error::InvalidInput(_))), "amount {amount:?}");
        }
    }

    #[test]
    fn test_same_account_both_sides_rejected() {
        let f = fixture();
        let err = f
            .service
            .record_transaction(f.alice, "x", f.cash, f.cash, "5")
            .unwrap_err();
        assert_eq!(err, Error::invalid_input("credit and debit account must differ"));
    }

    #[test]
    fn test_foreign_or_missing_account_rejected() {
        let f = fixture();
        for (credit, debit) in [
            (f.cash, f.bob_cash),
            (f.bob_cash, f.cash),
            (f.cash, AccountId(999)),
        ] {
            let err = f
                .service
                .record_transaction(f.alice, "x", credit, debit, "5")
                .unwrap_err();
            assert_eq!(err, Error::invalid_input(ACCOUNT_MISSING));
        }
        assert!(f.service.get_transactions(f.alice).unwrap().is_empty());
    }

    #[test]
    fn test_amount_checked_before_accounts() {
        let f = fixture();
        let err = f
            .service
            .record_transaction(f.alice, "x", f.cash, AccountId(999), "abc")
            .unwrap_err();
        assert!(err.to_string().contains("invalid amount"));
    }

    #[test]
    fn test_empty_detail_allowed() {
        let f = fixture();
        assert!(f.service.record_transaction(f.alice, "", f.cash, f.loan, "1").is_ok());
    }
}
