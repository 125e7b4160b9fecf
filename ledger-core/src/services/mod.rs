//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! covers one ledger concern; `Ledger` composes them behind session tokens.

mod accounts;
pub mod audit;
mod balance;
pub mod credentials;
mod ledger;
pub mod migration;
pub mod session;
mod transactions;

pub use accounts::AccountService;
pub use audit::{AuditLog, AuditRecord, TracingAuditSink, SERVICE_NAME};
pub use balance::BalanceService;
pub use credentials::CredentialService;
pub use ledger::Ledger;
pub use migration::{MigrationResult, MigrationService};
pub use session::SessionKeys;
pub use transactions::TransactionService;
