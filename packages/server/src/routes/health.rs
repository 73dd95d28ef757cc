//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    model: String,
    version: String,
}

/// Health check: reports the deployed model so operators can verify which
/// fine-tune is live.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "Clinical Component Identifier API".to_string(),
        model: state.service.model().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
