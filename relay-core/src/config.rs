//! Relay config: operator identity, database, logging and the two presence timeouts.
//! Loaded from env; the binary is expected to have loaded `.env` beforehand.

use crate::error::{RelayError, Result};
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://relay_bot.db";
const DEFAULT_LOG_FILE: &str = "logs/relay-bot.log";
const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 600;
const DEFAULT_AVAILABILITY_WINDOW_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// OPERATOR_ID: platform user id of the account that answers relayed messages
    pub operator_id: i64,
    /// DATABASE_URL (sqlite://path or sqlite::memory:)
    pub database_url: String,
    /// LOG_FILE
    pub log_file: String,
    /// REPLY_TIMEOUT_SECS: how long a "replying to" pointer stays valid
    pub reply_timeout_secs: u64,
    /// AVAILABILITY_WINDOW_SECS: inactivity after which the operator counts as unavailable
    pub availability_window_secs: u64,
}

impl RelayConfig {
    /// Load from environment variables. OPERATOR_ID is required.
    pub fn load() -> Result<Self> {
        let operator_id = match env::var("OPERATOR_ID") {
            Ok(raw) => parse_var("OPERATOR_ID", raw)?,
            Err(_) => return Err(RelayError::MissingVar("OPERATOR_ID")),
        };
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let reply_timeout_secs = match env::var("REPLY_TIMEOUT_SECS") {
            Ok(raw) => parse_var("REPLY_TIMEOUT_SECS", raw)?,
            Err(_) => DEFAULT_REPLY_TIMEOUT_SECS,
        };
        let availability_window_secs = match env::var("AVAILABILITY_WINDOW_SECS") {
            Ok(raw) => parse_var("AVAILABILITY_WINDOW_SECS", raw)?,
            Err(_) => DEFAULT_AVAILABILITY_WINDOW_SECS,
        };

        let config = Self {
            operator_id,
            database_url,
            log_file,
            reply_timeout_secs,
            availability_window_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate config: the database URL must name a SQLite database.
    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(RelayError::Config(format!(
                "DATABASE_URL must be a sqlite: URL, got {}",
                self.database_url
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| RelayError::InvalidVar { name, value: raw })
}
