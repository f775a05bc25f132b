//! Transport layer.
//!
//! Currently provides the HTTP surface via axum.

pub mod http;

pub use http::{AppState, ServerConfig, serve};
