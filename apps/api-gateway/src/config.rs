//! Gateway Configuration Settings
//!
//! Loaded from environment variables. Unset or unparsable numeric values
//! fall back to their defaults.

use std::time::Duration;

/// Default HTTP port for the gateway.
pub const DEFAULT_PORT: u16 = 8001;

/// Default strategy engine base URL.
pub const DEFAULT_ANALYTICS_URL: &str = "http://localhost:8000";

/// Complete gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Strategy engine base URL, without a trailing slash.
    pub analytics_url: String,
    /// Timeout for forwarded analysis requests.
    pub analyze_timeout: Duration,
    /// Timeout for the upstream health probe.
    pub health_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            analytics_url: DEFAULT_ANALYTICS_URL.to_string(),
            analyze_timeout: Duration::from_secs(60),
            health_timeout: Duration::from_secs(5),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `ANALYTICS_SERVICE_URL` is set but empty or is
    /// not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let analytics_url = match lookup("ANALYTICS_SERVICE_URL") {
            Some(url) => normalize_url(&url)?,
            None => defaults.analytics_url,
        };

        Ok(Self {
            port: parse_u16(lookup("GATEWAY_PORT"), defaults.port),
            analytics_url,
            analyze_timeout: parse_duration_secs(
                lookup("GATEWAY_ANALYZE_TIMEOUT_SECS"),
                defaults.analyze_timeout,
            ),
            health_timeout: parse_duration_secs(
                lookup("GATEWAY_HEALTH_TIMEOUT_SECS"),
                defaults.health_timeout,
            ),
        })
    }

    /// URL of an engine endpoint, e.g. `endpoint("/health")`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.analytics_url)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable is not a usable URL.
    #[error("environment variable {name} is not an http(s) URL: {value}")]
    InvalidUrl {
        /// Variable name.
        name: String,
        /// Offending value.
        value: String,
    },
}

fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue("ANALYTICS_SERVICE_URL".to_string()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl {
            name: "ANALYTICS_SERVICE_URL".to_string(),
            value: raw.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_u16(value: Option<String>, default: u16) -> u16 {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_duration_secs(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map_or(default, Duration::from_secs)
}
