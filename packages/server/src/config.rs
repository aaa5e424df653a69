use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// How long a hold stays live before it lapses (minutes).
    pub hold_minutes: i64,
    /// Lookback window for the per-actor duplicate-submission check (minutes).
    pub duplicate_window_minutes: i64,
    /// Whether the periodic expired-hold sweep runs in this process.
    pub sweep_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            hold_minutes: env::var("HOLD_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("HOLD_MINUTES must be a valid number")?,
            duplicate_window_minutes: env::var("DUPLICATE_WINDOW_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("DUPLICATE_WINDOW_MINUTES must be a valid number")?,
            sweep_enabled: env::var("SWEEP_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        })
    }
}
