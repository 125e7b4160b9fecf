//! Adapter implementations (hexagonal architecture)
//!
//! Adapters implement the port traits for specific storage backends.

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbStore;
pub use self::memory::InMemoryStore;
