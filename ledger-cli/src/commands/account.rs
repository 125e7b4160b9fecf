//! Account commands - create and list the caller's accounts

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use super::{get_context, SessionArgs};
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create an account
    New {
        /// Account name, unique among your accounts
        name: String,
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your accounts
    List {
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        AccountCommands::New { name, session, json } => {
            let result = ctx.ledger.create_account(&session.token, &name);
            if json {
                return output::print_envelope(result.map(|id| json!({ "accountId": id })));
            }
            let id = result?;
            output::success(&format!("Created account '{}' (id {})", name, id));
        }
        AccountCommands::List { session, json } => {
            let result = ctx.ledger.list_accounts(&session.token);
            if json {
                return output::print_envelope(result);
            }

            let accounts = result?;
            if accounts.is_empty() {
                output::info("No accounts yet. Create one with `ledger account new <name>`.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name"]);
            for account in accounts {
                table.add_row(vec![account.id.to_string(), account.name]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
