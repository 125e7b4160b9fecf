//! Register command - create a user

use anyhow::Result;
use serde_json::json;

use super::{get_context, PasswordArgs};
use crate::output;

pub fn run(username: &str, password: PasswordArgs, json: bool) -> Result<()> {
    let password = password.resolve(!json)?;
    let ctx = get_context()?;
    let result = ctx.ledger.register(username, &password);

    if json {
        return output::print_envelope(result.map(|id| json!({ "userId": id })));
    }

    let id = result?;
    output::success(&format!("Registered '{}' (user {})", username, id));
    output::info("Run `ledger login` to get a session token");
    Ok(())
}
