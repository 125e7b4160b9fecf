//! Audit sink port

use anyhow::Result;

/// Destination for audit records
///
/// Callers treat this as fire-and-forget: an error is logged and dropped,
/// never returned to the ledger client.
pub trait AuditSink: Send + Sync {
    fn record(&self, service: &str, timestamp: i64, message: &str) -> Result<()>;
}
