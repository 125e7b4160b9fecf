//! Output formatting utilities

use std::fmt;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, CellAlignment, ContentArrangement, Table};
use ledger_core::OperationResult;
use rust_decimal::Decimal;
use serde::Serialize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Right-align the given columns, for amounts
pub fn align_right(table: &mut Table, columns: &[usize]) {
    for &index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Signed amount, red when negative
pub fn format_balance(balance: Decimal) -> String {
    if balance.is_sign_negative() && !balance.is_zero() {
        balance.to_string().red().to_string()
    } else {
        balance.to_string()
    }
}

/// Unix seconds as `YYYY-MM-DD HH:MM:SS` in UTC
pub fn format_timestamp(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Marker error for failures already written to stdout as JSON
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation failed")
    }
}

impl std::error::Error for Reported {}

/// Print a ledger result wrapped in an `OperationResult` envelope
///
/// A failed result is printed too, then surfaced as `Reported` so the
/// process still exits non-zero.
pub fn print_envelope<T: Serialize>(result: ledger_core::domain::result::Result<T>) -> Result<()> {
    let envelope = OperationResult::from(result);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if envelope.success {
        Ok(())
    } else {
        Err(Reported.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_failed_envelope_is_reported() {
        let result: ledger_core::domain::result::Result<u32> =
            Err(ledger_core::Error::not_found("user bob not found"));
        let err = print_envelope(result).unwrap_err();
        assert!(err.is::<Reported>());
        assert!(print_envelope(Ok(1u32)).is_ok());
    }
}
