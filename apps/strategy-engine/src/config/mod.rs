//! Configuration module for the strategy engine.
//!
//! Loads YAML configuration with `${VAR}` / `${VAR:-default}` environment
//! interpolation and validates it before the service starts.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strategy_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod data;
mod forecast;
mod observability;
mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtest::{ParallelConfig, SignalSettings, StrategySettings};

pub use data::DataConfig;
pub use forecast::ForecastConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use server::ServerConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Price history locations.
    #[serde(default)]
    pub data: DataConfig,
    /// Volatility forecaster configuration.
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Signal parameters.
    #[serde(default)]
    pub signals: SignalSettings,
    /// Forecast worker pool configuration.
    #[serde(default)]
    pub parallel: ParallelConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Strategy run settings derived from this configuration.
    #[must_use]
    pub fn strategy_settings(&self) -> StrategySettings {
        StrategySettings {
            window: self.forecast.window,
            history_start: self.forecast.history_start,
            signals: self.signals.clone(),
        }
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.forecast.window == 0 {
        return invalid("forecast.window must be positive");
    }
    if config.forecast.max_iterations == 0 {
        return invalid("forecast.max_iterations must be positive");
    }
    if !(config.forecast.tolerance > 0.0 && config.forecast.tolerance.is_finite()) {
        return invalid("forecast.tolerance must be positive");
    }

    let signals = &config.signals;
    if signals.premium_std_window == 0 || signals.rsi_period == 0 || signals.band_period == 0 {
        return invalid("signals windows must be positive");
    }
    let rsi_bounds_ordered = 0.0 < signals.rsi_lower
        && signals.rsi_lower < signals.rsi_upper
        && signals.rsi_upper < 100.0;
    if !rsi_bounds_ordered {
        return invalid("signals.rsi_lower must be below signals.rsi_upper, both within (0, 100)");
    }
    if !(signals.band_std_dev > 0.0 && signals.band_std_dev.is_finite()) {
        return invalid("signals.band_std_dev must be positive");
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.listen_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics.listen_addr '{}' is not a socket address",
            metrics.listen_addr
        )));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}
