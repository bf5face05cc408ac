//! Infrastructure Layer
//!
//! Inbound adapters exposing the strategy to the outside world:
//!
//! - `http/`: REST endpoints (`GET /health`, `POST /analyze/garch`)
//!
//! Outbound price-history adapters live next to their port in
//! `backtest::data_source`.

pub mod http;
