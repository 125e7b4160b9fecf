//! DuckDB ledger store

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::{
    Account, AccountBalance, AccountId, Amount, NewTransaction, Transaction, TransactionId, User,
    UserId,
};
use crate::migrations::MIGRATIONS;
use crate::ports::{LedgerStore, StoreError, StoreResult};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock")
        || lower.contains("file is already open")
}

fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("unique constraint")
}

impl From<duckdb::Error> for StoreError {
    fn from(err: duckdb::Error) -> Self {
        let msg = err.to_string();
        if is_unique_violation(&msg) {
            StoreError::Duplicate
        } else {
            StoreError::Io(msg)
        }
    }
}

/// Parse a DECIMAL column that was cast to VARCHAR
fn parse_decimal(raw: &str) -> StoreResult<Decimal> {
    Decimal::from_str_exact(raw.trim())
        .map(|d| d.normalize())
        .map_err(|e| StoreError::Io(format!("invalid decimal {:?} in database: {}", raw, e)))
}

fn parse_timestamp_ms(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Io(format!("invalid timestamp {} in database", ms)))
}

/// DuckDB-backed ledger store
///
/// A single connection guarded by a mutex. Check-and-insert operations run
/// inside a DuckDB transaction while the lock is held, and the UNIQUE
/// constraints in the schema back up the checks.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

/// Run `attempt` until it succeeds, retrying file-lock failures with
/// exponential backoff (50, 100, 200, 400ms)
fn retry_on_lock<T>(mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
    let mut last_error = None;

    for n in 0..MAX_RETRIES {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) => {
                let err_msg = e.to_string();
                if is_retryable_error(&err_msg) && n < MAX_RETRIES - 1 {
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(n));
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        attempt = n + 1,
                        max_retries = MAX_RETRIES,
                        error = %err_msg,
                        "database busy, retrying"
                    );
                    thread::sleep(delay);
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
}

/// Open a DuckDB file with extension autoloading off, retrying while
/// another process holds the lock
pub(crate) fn open_connection(db_path: &Path) -> Result<Connection> {
    retry_on_lock(|| {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    })
}

impl DuckDbStore {
    /// Open (or create) a ledger database file
    ///
    /// Retries with backoff while another process still holds the file.
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_connection(db_path)?),
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Io(format!("Lock poisoned: {}", e)))
    }
}

impl LedgerStore for DuckDbStore {
    // === Users ===

    fn user_exists(&self, username: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sys_users WHERE username = ?",
            params![username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserId> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let taken: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM sys_users WHERE username = ?",
            params![username],
            |row| row.get(0),
        )?;
        if taken {
            return Err(StoreError::Duplicate);
        }

        let id: i64 = tx.query_row("SELECT nextval('seq_user_id')", [], |row| row.get(0))?;
        tx.execute(
            "INSERT INTO sys_users (user_id, username, password_hash) VALUES (?, ?, ?)",
            params![id, username, password_hash],
        )?;
        tx.commit()?;

        Ok(UserId(id))
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT user_id, username, password_hash FROM sys_users WHERE username = ?",
            params![username],
            |row| {
                Ok(User::new(
                    UserId(row.get(0)?),
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // === Accounts ===

    fn account_exists_by_name(&self, owner: UserId, name: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sys_accounts WHERE owner_id = ? AND name = ?",
            params![owner.get(), name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn account_exists_by_id(&self, owner: UserId, id: AccountId) -> StoreResult<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sys_accounts WHERE owner_id = ? AND account_id = ?",
            params![owner.get(), id.get()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create_account(&self, owner: UserId, name: &str) -> StoreResult<AccountId> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let taken: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM sys_accounts WHERE owner_id = ? AND name = ?",
            params![owner.get(), name],
            |row| row.get(0),
        )?;
        if taken {
            return Err(StoreError::Duplicate);
        }

        let id: i64 = tx.query_row("SELECT nextval('seq_account_id')", [], |row| row.get(0))?;
        tx.execute(
            "INSERT INTO sys_accounts (account_id, owner_id, name) VALUES (?, ?, ?)",
            params![id, owner.get(), name],
        )?;
        tx.commit()?;

        Ok(AccountId(id))
    }

    fn list_accounts_by_owner(&self, owner: UserId) -> StoreResult<Vec<Account>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT account_id, owner_id, name
             FROM sys_accounts
             WHERE owner_id = ?
             ORDER BY account_id",
        )?;

        let accounts = stmt
            .query_map(params![owner.get()], |row| {
                Ok(Account::new(
                    AccountId(row.get(0)?),
                    UserId(row.get(1)?),
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(accounts)
    }

    // === Transactions ===

    fn create_transaction(&self, owner: UserId, new: &NewTransaction) -> StoreResult<TransactionId> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let owned: i64 = tx.query_row(
            "SELECT COUNT(*) FROM sys_accounts
             WHERE owner_id = ? AND account_id IN (?, ?)",
            params![owner.get(), new.credit_account.get(), new.debit_account.get()],
            |row| row.get(0),
        )?;
        let expected = if new.credit_account == new.debit_account { 1 } else { 2 };
        if owned != expected {
            return Err(StoreError::NotOwned);
        }

        let id: i64 =
            tx.query_row("SELECT nextval('seq_transaction_id')", [], |row| row.get(0))?;
        tx.execute(
            "INSERT INTO sys_transactions
                 (transaction_id, detail, amount, credit_account_id, debit_account_id, created_at)
             VALUES (?, ?, CAST(? AS DECIMAL(18, 4)), ?, ?, ?)",
            params![
                id,
                new.detail,
                new.amount.to_string(),
                new.credit_account.get(),
                new.debit_account.get(),
                Utc::now().timestamp_millis(),
            ],
        )?;
        tx.commit()?;

        Ok(TransactionId(id))
    }

    fn compute_balances(&self, owner: UserId) -> StoreResult<Vec<AccountBalance>> {
        let conn = self.lock()?;
        // CAST to VARCHAR keeps the DECIMAL exact on the way out
        let mut stmt = conn.prepare(
            "SELECT a.account_id, a.name,
                    CAST(
                        COALESCE((SELECT SUM(t.amount) FROM sys_transactions t
                                  WHERE t.credit_account_id = a.account_id), 0)
                      - COALESCE((SELECT SUM(t.amount) FROM sys_transactions t
                                  WHERE t.debit_account_id = a.account_id), 0)
                    AS VARCHAR) AS balance
             FROM sys_accounts a
             WHERE a.owner_id = ?
             ORDER BY a.account_id",
        )?;

        let rows = stmt
            .query_map(params![owner.get()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, name, balance)| {
                Ok(AccountBalance {
                    account_id: AccountId(id),
                    account_name: name,
                    balance: parse_decimal(&balance)?,
                })
            })
            .collect()
    }

    fn list_transactions_touching_owner(&self, owner: UserId) -> StoreResult<Vec<Transaction>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT t.transaction_id, t.detail, CAST(t.amount AS VARCHAR),
                    t.credit_account_id, t.debit_account_id, t.created_at
             FROM sys_transactions t
             WHERE t.credit_account_id IN (SELECT account_id FROM sys_accounts WHERE owner_id = ?)
                OR t.debit_account_id IN (SELECT account_id FROM sys_accounts WHERE owner_id = ?)
             ORDER BY t.transaction_id",
        )?;

        let rows = stmt
            .query_map(params![owner.get(), owner.get()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, detail, amount, credit, debit, created_at)| {
                let amount = Amount::new(parse_decimal(&amount)?)
                    .map_err(|e| StoreError::Io(format!("stored amount rejected: {}", e)))?;
                Ok(Transaction {
                    id: TransactionId(id),
                    detail,
                    amount,
                    credit_account: AccountId(credit),
                    debit_account: AccountId(debit),
                    created_at: parse_timestamp_ms(created_at)?,
                })
            })
            .collect()
    }
}
