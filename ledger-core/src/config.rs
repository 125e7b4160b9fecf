//! Configuration management
//!
//! Settings live in `<data_dir>/settings.json`:
//! ```json
//! {
//!   "session": { "secret": "...", "ttlSeconds": 86400 },
//!   "audit": { "enabled": true },
//!   "database": { "file": "ledger.duckdb" }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::session::DEFAULT_TTL_SECS;

const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_DATABASE_FILE: &str = "ledger.duckdb";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    session: SessionSettings,
    #[serde(default)]
    audit: AuditSettings,
    #[serde(default)]
    database: DatabaseSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl_seconds: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
}

/// Ledger configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign session tokens
    pub session_secret: String,
    pub session_ttl_secs: i64,
    /// Persist audit records to audit.duckdb
    pub audit_enabled: bool,
    /// Ledger database file name, relative to the data directory
    pub database_file: String,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_secret: generate_secret(),
            session_ttl_secs: DEFAULT_TTL_SECS,
            audit_enabled: true,
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

/// 32 random bytes, base64 encoded
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment overrides:
    /// - `LEDGER_JWT_SECRET` replaces the session secret
    /// - `LEDGER_SESSION_TTL_SECS` replaces the token lifetime
    /// - `LEDGER_AUDIT` toggles the persistent audit log
    ///
    /// If neither the file nor the environment provides a secret, one is
    /// generated and written back so tokens survive restarts.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {:?}", settings_path))?
        } else {
            SettingsFile::default()
        };

        let lookup = |key: &str| std::env::var(key).ok();
        let mut config = Self::from_settings(raw);

        // Generate before applying overrides so env values are never persisted
        let env_secret = lookup("LEDGER_JWT_SECRET").is_some_and(|s| !s.is_empty());
        if config.session_secret.is_empty() && !env_secret {
            config.session_secret = generate_secret();
            config.save(data_dir)?;
            info!("generated new session secret");
        }

        config.apply_env(lookup);
        Ok(config)
    }

    /// Config for an ephemeral ledger: fixed secret, no persistent audit log
    pub fn ephemeral(secret: impl Into<String>) -> Self {
        Self {
            session_secret: secret.into(),
            audit_enabled: false,
            ..Self::default()
        }
    }

    fn from_settings(raw: SettingsFile) -> Self {
        Self {
            session_secret: raw.session.secret.clone().unwrap_or_default(),
            // A non-positive lifetime would expire every token on issue
            session_ttl_secs: raw
                .session
                .ttl_seconds
                .filter(|ttl| *ttl > 0)
                .unwrap_or(DEFAULT_TTL_SECS),
            audit_enabled: raw.audit.enabled.unwrap_or(true),
            database_file: raw
                .database
                .file
                .clone()
                .unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string()),
            _raw_settings: raw,
        }
    }

    /// Apply environment overrides through `lookup`
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("LEDGER_JWT_SECRET").filter(|s| !s.is_empty()) {
            self.session_secret = secret;
        }
        if let Some(ttl) = lookup("LEDGER_SESSION_TTL_SECS").and_then(|v| v.parse::<i64>().ok()) {
            if ttl > 0 {
                self.session_ttl_secs = ttl;
            }
        }
        if let Some(enabled) = lookup("LEDGER_AUDIT").and_then(|v| parse_bool(&v)) {
            self.audit_enabled = enabled;
        }
    }

    /// Save config to the data directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.session.secret = Some(self.session_secret.clone());
        settings.session.ttl_seconds = Some(self.session_ttl_secs);
        settings.audit.enabled = Some(self.audit_enabled);
        settings.database.file = Some(self.database_file.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
