//! Configuration management

use anyhow::{Context, Result};

use crate::services::messaging::TwilioConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API binds to
    pub bind_addr: String,

    /// Kardinal API base URL
    pub kardinal_url: String,

    /// Kardinal API bearer credential
    pub kardinal_api_key: String,

    /// Column mapper selection for session uploads
    pub column_mapper: String,

    /// Twilio messaging credentials (optional, mock provider without them)
    pub twilio: Option<TwilioConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let kardinal_url = std::env::var("KARDINAL_API_URL")
            .unwrap_or_else(|_| "https://app.kardinal.ai/api/v2".to_string());

        // Mandatory: refusing to start beats shipping an embedded default key
        let kardinal_api_key = std::env::var("KARDINAL_API_KEY")
            .context("KARDINAL_API_KEY must be set")?;

        if kardinal_api_key.trim().is_empty() {
            anyhow::bail!("KARDINAL_API_KEY must not be empty");
        }

        let column_mapper = std::env::var("COLUMN_MAPPER")
            .unwrap_or_else(|_| "header".to_string());

        let twilio = TwilioConfig::from_env();

        Ok(Self {
            bind_addr,
            kardinal_url,
            kardinal_api_key,
            column_mapper,
            twilio,
        })
    }
}
