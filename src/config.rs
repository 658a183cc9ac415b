use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_STORE_PATH: &str = "data/purchase_orders.json";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got `{value}`")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub remote_api_url: Option<String>,
    pub remote_timeout: Duration,
    pub port: u16,
}

impl Config {
    /// Reads settings from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_path = lookup("PO_STORE_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());

        let remote_api_url = lookup("REMOTE_API_URL").filter(|v| !v.trim().is_empty());

        let remote_timeout_secs = parse_number(
            "REMOTE_TIMEOUT_SECS",
            lookup("REMOTE_TIMEOUT_SECS"),
            DEFAULT_REMOTE_TIMEOUT_SECS,
        )?;
        let port = parse_number("PORT", lookup("PORT"), DEFAULT_PORT)?;

        Ok(Self {
            store_path: PathBuf::from(store_path),
            remote_api_url,
            remote_timeout: Duration::from_secs(remote_timeout_secs),
            port,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: v }),
    }
}
