//! services/storefront/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Project URL of the hosted backend, without a trailing slash.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub log_level: Level,
    pub allowed_origin: String,
    pub http_timeout: Duration,
    /// Visitors idle for longer than this lose their page session.
    pub visitor_idle: Duration,
    /// Upper bound on live page sessions; the least recently seen is dropped first.
    pub max_visitors: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(&std::env::vars().collect())
    }

    /// Builds the configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty());

        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").map_or("0.0.0.0:3000", String::as_str);
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").map_or("INFO", String::as_str);
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var("ALLOWED_ORIGIN")
            .cloned()
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        // --- Backend Connection (required) ---
        let supabase_url = var("SUPABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("SUPABASE_URL".to_string()))?
            .trim_end_matches('/')
            .to_string();
        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "SUPABASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", supabase_url),
            ));
        }

        let supabase_anon_key = var("SUPABASE_ANON_KEY")
            .ok_or_else(|| ConfigError::MissingVar("SUPABASE_ANON_KEY".to_string()))?
            .clone();

        let timeout_str = var("HTTP_TIMEOUT_SECS").map_or("10", String::as_str);
        let http_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".to_string(), e.to_string()))?;

        // --- Page Sessions ---
        let idle_str = var("VISITOR_IDLE_SECS").map_or("1800", String::as_str);
        let visitor_idle = idle_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue("VISITOR_IDLE_SECS".to_string(), e.to_string()))?;

        let max_str = var("MAX_VISITORS").map_or("10000", String::as_str);
        let max_visitors = match max_str.parse::<usize>() {
            Ok(max) if max > 0 => max,
            Ok(_) => {
                return Err(ConfigError::InvalidValue(
                    "MAX_VISITORS".to_string(),
                    "must be at least 1".to_string(),
                ))
            }
            Err(e) => return Err(ConfigError::InvalidValue("MAX_VISITORS".to_string(), e.to_string())),
        };

        Ok(Self {
            bind_address,
            supabase_url,
            supabase_anon_key,
            log_level,
            allowed_origin,
            http_timeout,
            visitor_idle,
            max_visitors,
        })
    }
}
