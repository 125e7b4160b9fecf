//! Audit command - inspect and prune the audit log

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use ledger_core::services::AuditLog;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show the most recent audit records
    List {
        /// Number of records to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old audit records
    Clear {
        /// Delete records older than N days
        #[arg(long, default_value = "90")]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AuditCommands) -> Result<()> {
    let ctx = get_context()?;
    let Some(log) = ctx.audit_log.as_deref() else {
        bail!("Audit log is disabled (audit.enabled is false or LEDGER_AUDIT=false)");
    };

    match command {
        AuditCommands::List { limit, json } => list(log, limit, json),
        AuditCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(log, older_than_days, force, json),
    }
}

fn list(log: &AuditLog, limit: usize, json: bool) -> Result<()> {
    let records = log.recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No audit records found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Time (UTC)", "Service", "Message"]);
    for record in records {
        let message = if record.message.contains("Error encountered") {
            record.message.red().to_string()
        } else {
            record.message
        };
        table.add_row(vec![
            record.id.to_string(),
            output::format_timestamp(record.timestamp),
            record.service,
            message,
        ]);
    }
    println!("{}", table);

    if let Some(path) = log.db_path() {
        println!("{}", format!("{} records in {}", log.count()?, path.display()).dimmed());
    }
    Ok(())
}

/// Only `--force` skips the prompt; JSON mode cannot prompt, so it needs `--force`
fn needs_confirmation(force: bool, json: bool) -> Result<bool> {
    if force {
        return Ok(false);
    }
    if json {
        bail!("`audit clear --json` cannot ask for confirmation; pass --force to delete");
    }
    Ok(true)
}

fn clear(log: &AuditLog, older_than_days: u32, force: bool, json: bool) -> Result<()> {
    let cutoff = Utc::now().timestamp() - i64::from(older_than_days) * 24 * 60 * 60;

    if needs_confirmation(force, json)? {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete audit records older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            output::warning("Cancelled.");
            return Ok(());
        }
    }

    let deleted = log.delete_before(cutoff)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        output::success(&format!("Deleted {} audit records", deleted));
    }
    Ok(())
}
