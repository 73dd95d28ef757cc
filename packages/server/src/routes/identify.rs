//! The identify endpoint.

use axum::{extract::State, Json};
use identifier::{Component, IdentifyOptions, IdentifyRequest, TokenUsage};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::routes::error::ApiError;

/// Request body for `POST /api/identify`.
#[derive(Debug, Deserialize)]
pub struct IdentifyBody {
    pub text: String,

    #[serde(default)]
    pub options: Option<IdentifyOptions>,
}

/// Success body for `POST /api/identify`.
#[derive(Debug, Serialize)]
pub struct IdentifySuccess {
    pub success: bool,
    pub components: Vec<Component>,
    pub total_components: usize,
    pub model_used: String,
    pub usage: TokenUsage,
}

/// Identify reusable components in the posted clinical text.
pub async fn identify_handler(
    State(state): State<AppState>,
    Json(body): Json<IdentifyBody>,
) -> Result<Json<IdentifySuccess>, ApiError> {
    let mut request = IdentifyRequest::new(body.text);
    if let Some(options) = body.options {
        request = request.with_options(options);
    }

    let result = state.service.identify(&request).await?;

    Ok(Json(IdentifySuccess {
        success: true,
        total_components: result.components.len(),
        components: result.components,
        model_used: result.model_used,
        usage: result.usage,
    }))
}
