//! HTTP/REST API adapter.
//!
//! Inbound adapter exposing strategy runs over HTTP.

mod controller;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use request::*;
pub use response::*;
