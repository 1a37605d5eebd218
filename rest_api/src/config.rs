// rest_api/src/config.rs

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_REST_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_REST_API_PORT: u16 = 5000;

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
}

/// Loads the REST API configuration from the environment, falling back to
/// defaults when `SAFE_TRAIL_HOST` / `SAFE_TRAIL_PORT` are unset.
pub fn load_rest_api_config() -> Result<RestApiConfig> {
    config_from(env::var("SAFE_TRAIL_HOST").ok(), env::var("SAFE_TRAIL_PORT").ok())
}

fn config_from(host: Option<String>, port: Option<String>) -> Result<RestApiConfig> {
    let host = host.unwrap_or_else(|| DEFAULT_REST_API_HOST.to_string());
    let port = match port {
        Some(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("Invalid SAFE_TRAIL_PORT value: {}", raw))?,
        None => DEFAULT_REST_API_PORT,
    };
    Ok(RestApiConfig { host, port })
}
