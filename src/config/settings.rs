//! Application settings loaded from config.toml
//!
//! The file is optional: a missing file yields defaults, a malformed one is an error.
//! `BIND_ADDRESS` in the environment overrides the configured bind address.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Categories to create at startup when missing
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Retries for a stock adjustment that lost a concurrent update
    #[serde(default = "default_max_adjust_retries")]
    pub max_adjust_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            max_adjust_retries: default_max_adjust_retries(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

const fn default_max_adjust_retries() -> u32 {
    3
}

/// A category seeded at startup
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Category name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] when the TOML is invalid.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file, falling back to defaults when it does not exist.
///
/// # Errors
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    parse_config(&contents)
}

/// Loads configuration from `CONFIG_PATH` (default `./config.toml`) and applies
/// environment overrides.
///
/// # Errors
/// Returns [`Error::Config`] if the file exists but is invalid.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_config(path)?;

    if let Ok(bind_address) = std::env::var("BIND_ADDRESS") {
        config.server.bind_address = bind_address;
    }

    Ok(config)
}
