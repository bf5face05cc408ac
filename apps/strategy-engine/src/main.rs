//! Strategy Engine Binary
//!
//! Serves the intraday volatility strategy backtest over HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin strategy-engine
//! ```
//!
//! # Environment Variables
//!
//! - `STRATEGY_CONFIG`: Path to the YAML config (default: `config.yaml`;
//!   built-in defaults are used when the default file is absent)
//! - `RUST_LOG`: Log level override
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use strategy_engine::backtest::{
    CsvDataSource, ForecastExecutor, GarchModel, IntradayVolatilityStrategy,
};
use strategy_engine::config::{Config, load_config};
use strategy_engine::observability::{MetricsConfig, init_metrics};
use strategy_engine::telemetry::init_telemetry;
use strategy_engine::{AppState, create_router};
use tokio::net::TcpListener;
use tokio::signal;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = load_engine_config()?;
    let _telemetry = init_telemetry(&config.observability.logging);

    tracing::info!("Starting Strategy Engine");
    log_config(&config);

    if config.observability.metrics.enabled {
        let addr = config
            .observability
            .metrics
            .listen_addr
            .parse()
            .context("invalid metrics listen address")?;
        if let Err(e) = init_metrics(&MetricsConfig::with_addr(addr)) {
            tracing::warn!(error = %e, "Failed to start metrics exporter, continuing without it");
        }
    }

    let executor = ForecastExecutor::new(
        config.parallel.clone(),
        GarchModel::new(config.forecast.simplex()),
    )?;
    tracing::info!(
        threads = executor.effective_thread_count(),
        "Forecast worker pool ready"
    );

    let source = CsvDataSource::new(&config.data.daily_path, &config.data.intraday_path);
    let strategy = IntradayVolatilityStrategy::new(
        Arc::new(source),
        Arc::new(executor),
        config.strategy_settings(),
    );
    let app = create_router(AppState::new(strategy));

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  POST /analyze/garch");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Strategy engine stopped");
    Ok(())
}

/// Load the config file, falling back to defaults when the default file is absent.
fn load_engine_config() -> anyhow::Result<Config> {
    match std::env::var("STRATEGY_CONFIG") {
        Ok(path) => load_config(Some(&path)).with_context(|| format!("loading {path}")),
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Some(DEFAULT_CONFIG_PATH)).context("loading config.yaml")
        }
        Err(_) => Ok(Config::default()),
    }
}

fn log_config(config: &Config) {
    tracing::info!(
        daily_path = %config.data.daily_path,
        intraday_path = %config.data.intraday_path,
        window = config.forecast.window,
        history_start = ?config.forecast.history_start,
        max_threads = config.parallel.max_threads,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
