//! Ledger Core - multi-user double-entry ledger
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core ledger entities (User, Account, Transaction, AccountBalance)
//! - **ports**: Trait definitions for external dependencies (LedgerStore, AuditSink)
//! - **services**: Business logic orchestration, composed by the `Ledger` facade
//! - **adapters**: Concrete store implementations (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use adapters::{DuckDbStore, InMemoryStore};
use config::Config;
use ports::{AuditSink, LedgerStore};
use services::{AuditLog, Ledger, SessionKeys, TracingAuditSink};

// Re-export commonly used types at crate root
pub use domain::result::{Error, ErrorKind, OperationResult};
pub use domain::{
    Account, AccountBalance, AccountId, Amount, SessionClaims, Transaction, TransactionId, User,
    UserId,
};

/// Main context for ledger operations
///
/// Owns the store, the audit log and the facade built on top of them.
/// Dropping the context closes the databases.
pub struct LedgerContext {
    pub config: Config,
    pub store: Arc<dyn LedgerStore>,
    pub audit_log: Option<Arc<AuditLog>>,
    pub ledger: Ledger,
}

impl LedgerContext {
    /// Open the ledger stored in `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
        let config = Config::load(data_dir)?;

        let db_path = data_dir.join(&config.database_file);
        let store = DuckDbStore::open(&db_path)
            .with_context(|| format!("Failed to open ledger database: {:?}", db_path))?;
        store.ensure_schema()?;
        debug!(path = ?db_path, "opened ledger database");

        let audit_log = if config.audit_enabled {
            Some(Arc::new(AuditLog::open(data_dir)?))
        } else {
            None
        };

        Ok(Self::assemble(config, Arc::new(store), audit_log))
    }

    /// A throwaway ledger kept in memory, audited through `tracing`
    pub fn in_memory(secret: &str) -> Self {
        Self::assemble(Config::ephemeral(secret), Arc::new(InMemoryStore::new()), None)
    }

    fn assemble(
        config: Config,
        store: Arc<dyn LedgerStore>,
        audit_log: Option<Arc<AuditLog>>,
    ) -> Self {
        let sessions = Arc::new(SessionKeys::new(
            config.session_secret.as_bytes(),
            config.session_ttl_secs,
        ));
        let sink: Arc<dyn AuditSink> = match &audit_log {
            Some(log) => Arc::clone(log) as Arc<dyn AuditSink>,
            None => Arc::new(TracingAuditSink),
        };
        let ledger = Ledger::new(Arc::clone(&store), sessions, sink);

        Self {
            config,
            store,
            audit_log,
            ledger,
        }
    }
}
