//! Balance command - derived balances of the caller's accounts

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;

use super::{get_context, SessionArgs};
use crate::output;

pub fn run(session: SessionArgs, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.ledger.get_balances(&session.token);

    if json {
        return output::print_envelope(result);
    }

    let balances = result?;
    if balances.is_empty() {
        output::info("No accounts yet.");
        return Ok(());
    }

    let total: Decimal = balances.iter().map(|b| b.balance).sum();

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Account", "Balance"]);
    for balance in &balances {
        table.add_row(vec![
            balance.account_id.to_string(),
            balance.account_name.clone(),
            output::format_balance(balance.balance),
        ]);
    }
    table.add_row(vec![
        String::new(),
        "Total".bold().to_string(),
        output::format_balance(total.normalize()),
    ]);
    output::align_right(&mut table, &[2]);
    println!("{}", table);

    if !total.is_zero() {
        // Only possible when another user's account sits on the far side
        output::warning("Balances do not net to zero across your accounts.");
    }

    Ok(())
}
