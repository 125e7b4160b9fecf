//! Audit database migrations - embedded SQL files
//!
//! Applied by the same runner as the ledger migrations, against
//! audit.duckdb instead of the ledger database.

/// All audit log migrations, embedded at compile time.
/// Format: (filename, sql_content)
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
