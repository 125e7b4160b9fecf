//! Login command - exchange credentials for a session token

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::{get_context, PasswordArgs};
use crate::output;

pub fn run(username: &str, password: PasswordArgs, json: bool) -> Result<()> {
    let password = password.resolve(false)?;
    let ctx = get_context()?;
    let result = ctx.ledger.authenticate(username, &password);

    if json {
        let ttl = ctx.config.session_ttl_secs;
        return output::print_envelope(
            result.map(|token| json!({ "token": token, "expiresInSecs": ttl })),
        );
    }

    let token = result?;
    println!("{}", token);
    eprintln!(
        "{}",
        format!(
            "Token valid for {} seconds. Export it as LEDGER_TOKEN or pass --token.",
            ctx.config.session_ttl_secs
        )
        .dimmed()
    );
    Ok(())
}
