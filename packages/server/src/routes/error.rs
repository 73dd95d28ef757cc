//! API error mapping.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use identifier::IdentifyError;
use serde::Serialize;

/// Wire shape of a failed API call.
#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// An API-facing error: the core taxonomy plus its HTTP status.
pub struct ApiError(pub IdentifyError);

impl ApiError {
    /// HTTP status for each error taxonomy: 4xx for caller mistakes,
    /// 502 for misbehaving upstream/model, 504 for polling budgets.
    fn status(&self) -> StatusCode {
        match &self.0 {
            IdentifyError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentifyError::Upstream { .. } | IdentifyError::Schema(_) => StatusCode::BAD_GATEWAY,
            IdentifyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            IdentifyError::Job { .. } | IdentifyError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<IdentifyError> for ApiError {
    fn from(err: IdentifyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(status = %status, error = %self.0, "Request failed");

        let body = ErrorBody {
            success: false,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(IdentifyError::Validation("empty".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(IdentifyError::Schema("unparseable".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(IdentifyError::Upstream {
                message: "rate limit".into(),
                transient: true
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
