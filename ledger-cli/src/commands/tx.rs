//! Transaction commands - record and list transactions

use std::collections::HashMap;

use anyhow::Result;
use clap::Subcommand;
use ledger_core::AccountId;
use serde_json::json;

use super::{get_context, SessionArgs};
use crate::output;

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a transaction moving AMOUNT into CREDIT and out of DEBIT
    New {
        /// Free-text description
        #[arg(long, default_value = "")]
        detail: String,
        /// Account ID receiving the amount
        #[arg(long)]
        credit: String,
        /// Account ID giving up the amount
        #[arg(long)]
        debit: String,
        /// Positive decimal amount, e.g. 30000 or 12.50
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List transactions touching any of your accounts
    List {
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: TxCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        TxCommands::New {
            detail,
            credit,
            debit,
            amount,
            session,
            json,
        } => {
            let result = credit.parse::<AccountId>().and_then(|credit| {
                let debit = debit.parse::<AccountId>()?;
                ctx.ledger
                    .record_transaction(&session.token, &detail, credit, debit, &amount)
            });
            if json {
                return output::print_envelope(result.map(|id| json!({ "transactionId": id })));
            }
            let id = result?;
            output::success(&format!("Recorded transaction {}", id));
        }
        TxCommands::List { session, json } => {
            if json {
                return output::print_envelope(ctx.ledger.get_transactions(&session.token));
            }

            let transactions = ctx.ledger.get_transactions(&session.token)?;
            let accounts = ctx.ledger.list_accounts(&session.token)?;
            if transactions.is_empty() {
                output::info("No transactions yet.");
                return Ok(());
            }

            // Accounts of other users show up by id only
            let names: HashMap<AccountId, String> =
                accounts.into_iter().map(|a| (a.id, a.name)).collect();
            let label = |id: AccountId| match names.get(&id) {
                Some(name) => format!("{} ({})", name, id),
                None => format!("#{}", id),
            };

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Date", "Detail", "Credit", "Debit", "Amount"]);
            for tx in transactions {
                table.add_row(vec![
                    tx.id.to_string(),
                    tx.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    tx.detail,
                    label(tx.credit_account),
                    label(tx.debit_account),
                    tx.amount.to_string(),
                ]);
            }
            output::align_right(&mut table, &[5]);
            println!("{}", table);
        }
    }

    Ok(())
}
