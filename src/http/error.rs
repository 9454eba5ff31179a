use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::types::PipelineError;

/// Maps pipeline errors onto HTTP responses with a `{"detail": ...}` body
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        Self(error)
    }
}

/// A body that is not valid JSON, or whose fields have the wrong shape, is
/// answered like any other bad argument.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PipelineError::invalid_argument("body", &rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PipelineError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            PipelineError::NotFound { .. } => StatusCode::NOT_FOUND,
            PipelineError::Enqueue { .. } | PipelineError::ShuttingDown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            PipelineError::Persistence { .. } | PipelineError::InvalidTransition { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self.0 {
            PipelineError::NotFound { .. } => "Transaction not found".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
