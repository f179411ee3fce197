//! Error types for txnreview-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use txnreview_core::{CoreError, ErrorSeverity};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::RequestFailed { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Core(CoreError::InvalidModeTransition { .. }) => StatusCode::CONFLICT,
            ApiError::Core(CoreError::MutationInFlight { .. }) => StatusCode::CONFLICT,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::NotFound { .. } => serde_json::json!({
                "code": "NOT_FOUND",
                "message": self.to_string(),
            }),
            ApiError::Core(error) => serde_json::to_value(error.to_details())
                .unwrap_or_else(|_| serde_json::json!({ "message": error.to_string() })),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Core(error) if error.severity() == ErrorSeverity::Error => {
                log::error!(target: "txnreview::api", "{}", error.to_details());
            }
            _ => log::warn!(target: "txnreview::api", "{}", self),
        }
        (self.status(), Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
