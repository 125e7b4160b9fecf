//! Ledger CLI - a multi-user double-entry ledger in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod output;

use commands::{account, audit, balance, login, register, tx, PasswordArgs, SessionArgs};

/// Ledger - multi-user double-entry bookkeeping
///
/// Data lives in ~/.ledger unless LEDGER_DIR points elsewhere.
#[derive(Parser)]
#[command(name = "ledger", version, about, long_about = None)]
struct Cli {
    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user
    Register {
        username: String,
        #[command(flatten)]
        password: PasswordArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in and print a session token
    Login {
        username: String,
        #[command(flatten)]
        password: PasswordArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Record and list transactions
    Tx {
        #[command(subcommand)]
        command: tx::TxCommands,
    },

    /// Show account balances
    Balance {
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect the audit log
    Audit {
        #[command(subcommand)]
        command: audit::AuditCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<output::Reported>() => ExitCode::FAILURE,
        Err(e) => {
            output::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register {
            username,
            password,
            json,
        } => register::run(&username, password, json),
        Commands::Login {
            username,
            password,
            json,
        } => login::run(&username, password, json),
        Commands::Account { command } => account::run(command),
        Commands::Tx { command } => tx::run(command),
        Commands::Balance { session, json } => balance::run(session, json),
        Commands::Audit { command } => audit::run(command),
    }
}
