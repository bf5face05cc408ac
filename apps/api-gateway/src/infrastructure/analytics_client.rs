//! HTTP adapter for the strategy engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::application::{AnalyticsBackend, AnalyzeRequest, BackendError};
use crate::config::GatewayConfig;

/// `AnalyticsBackend` backed by the engine's REST API.
#[derive(Debug, Clone)]
pub struct HttpAnalyticsBackend {
    client: Client,
    analyze_url: String,
    health_url: String,
    analyze_timeout: Duration,
    health_timeout: Duration,
}

impl HttpAnalyticsBackend {
    /// Create a client for the engine at `config.analytics_url`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Client` if the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            client,
            analyze_url: config.endpoint("/analyze/garch"),
            health_url: config.endpoint("/health"),
            analyze_timeout: config.analyze_timeout,
            health_timeout: config.health_timeout,
        })
    }

    async fn fetch_json(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<Value, BackendError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(&e, timeout))?
            .error_for_status()
            .map_err(|e| classify(&e, timeout))?;

        response.json().await.map_err(|e| classify(&e, timeout))
    }
}

#[async_trait]
impl AnalyticsBackend for HttpAnalyticsBackend {
    async fn analyze_garch(&self, request: &AnalyzeRequest) -> Result<Value, BackendError> {
        let builder = self.client.post(&self.analyze_url).json(request);
        self.fetch_json(builder, self.analyze_timeout).await
    }

    async fn health(&self) -> Result<String, BackendError> {
        let builder = self.client.get(&self.health_url);
        let body = self.fetch_json(builder, self.health_timeout).await?;

        Ok(body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string())
    }
}

fn classify(err: &reqwest::Error, timeout: Duration) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(timeout)
    } else if err.is_builder() {
        BackendError::Client(err.to_string())
    } else if let Some(status) = err.status() {
        BackendError::Status {
            status: status.as_u16(),
        }
    } else if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Transport(err.to_string())
    }
}
