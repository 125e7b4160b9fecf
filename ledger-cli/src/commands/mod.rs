//! CLI command implementations

pub mod account;
pub mod audit;
pub mod balance;
pub mod login;
pub mod register;
pub mod tx;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use dialoguer::Password;
use ledger_core::LedgerContext;
use tracing::debug;

/// Session token taken from `--token` or `LEDGER_TOKEN`
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session token printed by `ledger login`
    #[arg(long, env = "LEDGER_TOKEN", hide_env_values = true)]
    pub token: String,
}

/// Password taken from `--password` or `LEDGER_PASSWORD`, prompted otherwise
#[derive(Args, Debug)]
pub struct PasswordArgs {
    /// Password (prompted for when omitted)
    #[arg(long, env = "LEDGER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl PasswordArgs {
    pub fn resolve(self, confirm: bool) -> Result<String> {
        if let Some(password) = self.password {
            return Ok(password);
        }

        let mut prompt = Password::new().with_prompt("Password");
        if confirm {
            prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
        }
        Ok(prompt.interact()?)
    }
}

/// Get the ledger directory from environment or default
pub fn get_ledger_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LEDGER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".ledger"))
        .ok_or_else(|| anyhow!("Could not find home directory; set LEDGER_DIR"))
}

/// Open the ledger in the configured directory
pub fn get_context() -> Result<LedgerContext> {
    let ledger_dir = get_ledger_dir()?;
    debug!(dir = ?ledger_dir, "opening ledger");
    LedgerContext::open(&ledger_dir)
        .with_context(|| format!("Failed to open ledger in {:?}", ledger_dir))
}
