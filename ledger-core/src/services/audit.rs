//! Audit sinks - where the ledger facade sends one record per call
//!
//! `AuditLog` keeps records in audit.duckdb, separate from the ledger
//! database so that audit writes never contend with ledger writes.
//! `TracingAuditSink` forwards records to the `tracing` subscriber instead.
//!
//! Messages never contain passwords; the facade redacts them before
//! calling `record`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use duckdb::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::duckdb::open_connection;
use crate::log_migrations::LOG_MIGRATIONS;
use crate::ports::AuditSink;

use super::migration::MigrationService;

/// Service name attached to every record the ledger emits
pub const SERVICE_NAME: &str = "ledger";

/// An audit record as stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub service: String,
    /// Unix seconds
    pub timestamp: i64,
    pub message: String,
}

/// Persistent audit log backed by its own DuckDB file
pub struct AuditLog {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl AuditLog {
    /// Open or create audit.duckdb in `data_dir` and run pending migrations
    ///
    /// Retries while another process holds the file, like `DuckDbStore::open`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let db_path = data_dir.join("audit.duckdb");
        let conn = open_connection(&db_path)?;
        Self::with_connection(conn, Some(db_path))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        MigrationService::new(&conn, LOG_MIGRATIONS).run_pending()?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Most recent records first, up to `limit`
    pub fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT id, service, timestamp, message
             FROM sys_audit_log
             ORDER BY id DESC
             LIMIT ?",
        )?;

        let records = stmt
            .query_map([limit as i64], |row| {
                Ok(AuditRecord {
                    id: row.get(0)?,
                    service: row.get(1)?,
                    timestamp: row.get(2)?,
                    message: row.get(3)?,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Total number of stored records
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_audit_log", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Delete records older than `timestamp` (unix seconds)
    pub fn delete_before(&self, timestamp: i64) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let deleted = conn.execute(
            "DELETE FROM sys_audit_log WHERE timestamp < ?",
            [timestamp],
        )?;
        Ok(deleted as u64)
    }

    /// Path of the audit database, `None` when in memory
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

impl AuditSink for AuditLog {
    fn record(&self, service: &str, timestamp: i64, message: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        conn.execute(
            "INSERT INTO sys_audit_log (id, service, timestamp, message)
             VALUES (nextval('seq_audit_id'), ?, ?, ?)",
            params![service, timestamp, message],
        )?;
        Ok(())
    }
}

/// Audit sink that emits each record as a `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, service: &str, timestamp: i64, message: &str) -> Result<()> {
        info!(target: "ledger::audit", service, timestamp, "{}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_audit_log_creation() {
        let dir = tempdir().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();

        assert!(log.db_path().unwrap().exists());
        assert_eq!(log.count().unwrap(), 0);
    }

    #[test]
    fn test_record_and_recent() {
        let log = AuditLog::open_in_memory().unwrap();

        log.record(SERVICE_NAME, 100, "Register called with parameters [alice] [redacted]")
            .unwrap();
        log.record(SERVICE_NAME, 101, "GetBalances called by [1]").unwrap();

        let records = log.recent(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "GetBalances called by [1]");
        assert_eq!(records[0].timestamp, 101);
        assert_eq!(records[1].service, "ledger");

        assert_eq!(log.recent(1).unwrap().len(), 1);
    }

    #[test]
    fn test_count_and_delete() {
        let log = AuditLog::open_in_memory().unwrap();

        log.record(SERVICE_NAME, 10, "one").unwrap();
        log.record(SERVICE_NAME, 20, "two").unwrap();
        log.record(SERVICE_NAME, 30, "three").unwrap();
        assert_eq!(log.count().unwrap(), 3);

        let deleted = log.delete_before(25).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(log.count().unwrap(), 1);
        assert_eq!(log.recent(10).unwrap()[0].message, "three");
    }

    #[test]
    fn test_reopen_keeps_records() {
        let dir = tempdir().unwrap();
        {
            let log = AuditLog::open(dir.path()).unwrap();
            log.record(SERVICE_NAME, 1, "persisted").unwrap();
        }

        let log = AuditLog::open(dir.path()).unwrap();
        assert_eq!(log.count().unwrap(), 1);
    }

    #[test]
    fn test_tracing_sink_never_fails() {
        assert!(TracingAuditSink.record(SERVICE_NAME, 0, "anything").is_ok());
    }
}
