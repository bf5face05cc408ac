//! API Gateway Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin api-gateway
//! ```
//!
//! # Environment Variables
//!
//! - `GATEWAY_PORT`: HTTP port (default: 8001)
//! - `ANALYTICS_SERVICE_URL`: Strategy engine base URL (default: <http://localhost:8000>)
//! - `GATEWAY_ANALYZE_TIMEOUT_SECS`: Forwarded analysis timeout (default: 60)
//! - `GATEWAY_HEALTH_TIMEOUT_SECS`: Engine health probe timeout (default: 5)
//! - `GATEWAY_LOG_FORMAT`: `json` or `pretty` (default: pretty)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use api_gateway::infrastructure::telemetry;
use api_gateway::{GatewayConfig, GatewayState, HttpAnalyticsBackend, create_router};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting API Gateway");

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        port = config.port,
        analytics_url = %config.analytics_url,
        analyze_timeout_secs = config.analyze_timeout.as_secs(),
        health_timeout_secs = config.health_timeout.as_secs(),
        "Configuration loaded"
    );

    let backend = HttpAnalyticsBackend::new(&config)?;
    let app = create_router(GatewayState::new(Arc::new(backend)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    let shutdown_token = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown_token.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_token.cancelled_owned())
        .await?;

    tracing::info!("API Gateway stopped");
    Ok(())
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

/// Wait for SIGINT or SIGTERM, then cancel the token.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
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

    shutdown_token.cancel();
}
