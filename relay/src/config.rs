//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables once at process start;
//! nothing is reloaded afterwards.

use std::collections::HashMap;
use std::env;

use tracing::warn;

use crate::routing::RegionEndpoint;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret PayPal must present as the `key` query parameter
    pub webhook_key: Option<String>,

    /// Region code -> billing backend endpoint
    pub region_endpoints: HashMap<String, RegionEndpoint>,

    /// Region used when a payload carries no usable hint
    pub default_region: String,

    /// Timeout for the outbound forward call, in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            webhook_key: env::var("WEBHOOK_KEY").ok(),

            region_endpoints: parse_region_endpoints("REGION_ENDPOINTS"),

            default_region: env::var("DEFAULT_REGION").unwrap_or_else(|_| "US".to_string()),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}

/// Parse a JSON map of region code -> endpoint, e.g.
/// `{"US": {"base_address": "https://billing.example.com", "webhook_key": "abc"}}`.
fn parse_region_endpoints(name: &str) -> HashMap<String, RegionEndpoint> {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return HashMap::new(),
    };

    match serde_json::from_str(&raw) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            warn!(env_var = name, error = %e, "Invalid region endpoint map, using empty");
            HashMap::new()
        }
    }
}
