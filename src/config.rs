use crate::catalog::{CatalogOptions, DEFAULT_BASE_URL};
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub api_timeout: Option<Duration>,
    pub mirror_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            api_base_url: env::var("ESTATE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_token: env::var("ESTATE_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            api_timeout: env::var("ESTATE_API_TIMEOUT_SECS")
                .ok()
                .map(|secs| secs.parse::<u64>().map(Duration::from_secs))
                .transpose()
                .context("ESTATE_API_TIMEOUT_SECS must be a whole number of seconds")?,
            mirror_dir: env::var("ESTATE_MIRROR_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".estate-mirror")),
        })
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            base_url: self.api_base_url.clone(),
            token: self.api_token.clone(),
            timeout: self.api_timeout,
        }
    }
}
