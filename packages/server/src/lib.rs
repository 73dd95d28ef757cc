//! HTTP surface for the Clinical Component Identifier.
//!
//! Thin over the `identifier` library: request parsing, error-to-status
//! mapping, CORS, and request tracing. All identification logic lives in
//! the core crate.

pub mod app;
pub mod config;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::Config;
