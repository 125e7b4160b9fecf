//! Ledger facade - the single authorization-checked entry point
//!
//! Every operation except `register` and `authenticate` takes a session
//! token and re-derives the caller from it. Each call writes exactly one
//! audit record; a failing audit sink is logged and otherwise ignored.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::domain::result::Result;
use crate::domain::{Account, AccountBalance, AccountId, Transaction, TransactionId, UserId};
use crate::ports::{AuditSink, LedgerStore};

use super::accounts::AccountService;
use super::audit::SERVICE_NAME;
use super::balance::BalanceService;
use super::credentials::CredentialService;
use super::session::SessionKeys;
use super::transactions::TransactionService;

pub struct Ledger {
    credentials: CredentialService,
    accounts: AccountService,
    transactions: TransactionService,
    balances: BalanceService,
    sessions: Arc<SessionKeys>,
    audit: Arc<dyn AuditSink>,
}

impl Ledger {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        sessions: Arc<SessionKeys>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            credentials: CredentialService::new(Arc::clone(&store), Arc::clone(&sessions)),
            accounts: AccountService::new(Arc::clone(&store)),
            transactions: TransactionService::new(Arc::clone(&store)),
            balances: BalanceService::new(store),
            sessions,
            audit,
        }
    }

    // === Unauthenticated ===

    pub fn register(&self, username: &str, password: &str) -> Result<UserId> {
        let message = format!("Register called with parameters [{}] [redacted]", username);
        self.audited("Register", message, || {
            self.credentials.register(username, password)
        })
    }

    /// Exchange credentials for a session token
    pub fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let message = format!("Authenticate called with parameters [{}] [redacted]", username);
        self.audited("Authenticate", message, || {
            self.credentials.authenticate(username, password)
        })
    }

    // === Authorized ===

    pub fn create_account(&self, token: &str, name: &str) -> Result<AccountId> {
        let owner = self.authorize("CreateAccount", token)?;
        let message = format!("CreateAccount called by [{}] with parameters [{}]", owner, name);
        self.audited("CreateAccount", message, || {
            self.accounts.create_account(owner, name)
        })
    }

    pub fn list_accounts(&self, token: &str) -> Result<Vec<Account>> {
        let owner = self.authorize("ListAccounts", token)?;
        let message = format!("ListAccounts called by [{}]", owner);
        self.audited("ListAccounts", message, || self.accounts.list_accounts(owner))
    }

    pub fn record_transaction(
        &self,
        token: &str,
        detail: &str,
        credit: AccountId,
        debit: AccountId,
        amount: &str,
    ) -> Result<TransactionId> {
        let owner = self.authorize("RecordTransaction", token)?;
        let message = format!(
            "RecordTransaction called by [{}] with parameters [{}] [{}] [{}] [{}]",
            owner, detail, credit, debit, amount
        );
        self.audited("RecordTransaction", message, || {
            self.transactions
                .record_transaction(owner, detail, credit, debit, amount)
        })
    }

    pub fn get_balances(&self, token: &str) -> Result<Vec<AccountBalance>> {
        let owner = self.authorize("GetBalances", token)?;
        let message = format!("GetBalances called by [{}]", owner);
        self.audited("GetBalances", message, || self.balances.get_balances(owner))
    }

    pub fn get_transactions(&self, token: &str) -> Result<Vec<Transaction>> {
        let owner = self.authorize("GetTransactions", token)?;
        let message = format!("GetTransactions called by [{}]", owner);
        self.audited("GetTransactions", message, || {
            self.transactions.get_transactions(owner)
        })
    }

    // === Plumbing ===

    /// Verify the token; a rejection is the call's audit record
    fn authorize(&self, operation: &str, token: &str) -> Result<UserId> {
        match self.sessions.verify(token) {
            Ok(claims) => Ok(claims.user_id),
            Err(err) => {
                self.emit(&format!("{} rejected: invalid session token", operation));
                Err(err)
            }
        }
    }

    /// Run `call` and emit its audit record, with internal error detail appended
    fn audited<T>(
        &self,
        operation: &str,
        message: String,
        call: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let result = call();

        match result.as_ref().err().and_then(|e| e.internal_detail()) {
            Some(detail) => {
                warn!(operation, "internal error");
                self.emit(&format!(
                    "{}; Error encountered in {}: {}",
                    message, operation, detail
                ));
            }
            None => self.emit(&message),
        }

        result
    }

    fn emit(&self, message: &str) {
        if let Err(e) = self.audit.record(SERVICE_NAME, Utc::now().timestamp(), message) {
            warn!(error = %e, "audit sink failed, continuing");
        }
    }
}
