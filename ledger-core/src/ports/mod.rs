//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The ledger
//! services depend only on these traits, not on concrete implementations.

mod audit;
mod store;

pub use audit::AuditSink;
pub use store::{LedgerStore, StoreError, StoreResult};
