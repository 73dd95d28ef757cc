//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use identifier::IdentifyService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{health_handler, identify_handler, taxonomy_handler};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<IdentifyService>,
}

/// Build the Axum application router.
///
/// CORS is open for the API routes; the presentational client is served
/// from a separate origin.
pub fn build_app(service: Arc<IdentifyService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let state = AppState { service };

    Router::new()
        .route("/", get(health_handler))
        .route("/api/identify", post(identify_handler))
        .route("/api/taxonomy", get(taxonomy_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
