//! HTTP API tests for the strategy engine router.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tower::ServiceExt;

use strategy_engine::backtest::{
    DailyPrice, ForecastExecutor, GarchModel, InMemoryDataSource, IntradayBar,
    IntradayVolatilityStrategy, ParallelConfig, StrategySettings,
};
use strategy_engine::{AppState, create_router};

fn app(source: InMemoryDataSource) -> axum::Router {
    let executor = ForecastExecutor::new(
        ParallelConfig {
            max_threads: 1,
            track_progress: false,
            min_parallel_jobs: 4,
        },
        GarchModel::default(),
    )
    .unwrap();
    let settings = StrategySettings {
        window: 30,
        history_start: None,
        ..StrategySettings::default()
    };
    let strategy = IntradayVolatilityStrategy::new(Arc::new(source), Arc::new(executor), settings);
    create_router(AppState::new(strategy))
}

fn small_source() -> InMemoryDataSource {
    let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    let daily = (0..10)
        .map(|i| DailyPrice::new(start + Duration::days(i), 100.0 + i as f64))
        .collect();
    let intraday = (0..24)
        .map(|i| {
            let day = start + Duration::days(i / 12);
            IntradayBar::new(
                day.and_hms_opt(9, 30, 0).unwrap() + Duration::minutes(5 * (i % 12)),
                100.0 + (i % 5) as f64,
            )
        })
        .collect();
    InMemoryDataSource::new(daily, intraday)
}

async fn post_json(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze/garch")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let response = app(small_source())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_analyze_success_shape() {
    let (status, json) = post_json(
        app(small_source()),
        r#"{"start_date": "2021-01-04", "end_date": "2021-01-31"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.get("status").is_none());
    assert!(json["daily_signals"].as_array().unwrap().is_empty());
    let returns = json["strategy_returns"].as_array().unwrap();
    assert_eq!(returns.len(), 2);
    assert_eq!(returns[0]["date"], "2021-01-04");
    assert_eq!(returns[0]["daily_return"], 0.0);
    assert_eq!(json["cumulative_return"], 0.0);
    assert_eq!(json["summary"]["trading_days"], 2);
}

#[tokio::test]
async fn test_analyze_missing_field_returns_error_shape() {
    let (status, json) = post_json(app(small_source()), r#"{"start_date": "2021-01-04"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "INVALID_REQUEST");
    assert!(json["message"].as_str().unwrap().contains("required"));
    assert_eq!(json["daily_signals"], serde_json::json!([]));
    assert_eq!(json["strategy_returns"], serde_json::json!([]));
    assert_eq!(json["cumulative_return"], 0.0);
}

#[tokio::test]
async fn test_analyze_malformed_json_returns_error_shape() {
    let (status, json) = post_json(app(small_source()), "{not json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_analyze_bad_date_returns_error_shape() {
    let (_, json) = post_json(
        app(small_source()),
        r#"{"start_date": "2021-13-40", "end_date": "2021-01-31"}"#,
    )
    .await;

    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("2021-13-40"));
}

#[tokio::test]
async fn test_analyze_without_data_returns_empty_result() {
    let (status, json) = post_json(
        app(InMemoryDataSource::default()),
        r#"{"start_date": "2021-01-04", "end_date": "2021-01-31"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.get("status").is_none());
    assert_eq!(json["daily_signals"], serde_json::json!([]));
    assert_eq!(json["strategy_returns"], serde_json::json!([]));
    assert_eq!(json["cumulative_return"], 0.0);
}
