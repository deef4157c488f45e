//! Maps application and admission errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use enrollhub_core::error::{AdmissionError, AdmissionErrorCategory, AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// Infrastructure or input error.
    App(AppError),
    /// Business outcome of the admission engine.
    Admission(AdmissionError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::Store(inner) => Self::App(inner),
            other => Self::Admission(other),
        }
    }
}

impl ApiError {
    /// Status code and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::App(err) => app_status(err.kind),
            Self::Admission(err) => {
                let status = match err.category() {
                    AdmissionErrorCategory::NotFound => StatusCode::NOT_FOUND,
                    AdmissionErrorCategory::Conflict => StatusCode::CONFLICT,
                    AdmissionErrorCategory::Precondition => StatusCode::BAD_REQUEST,
                    AdmissionErrorCategory::Invariant | AdmissionErrorCategory::Infrastructure => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.code())
            }
        }
    }
}

fn app_status(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::Precondition => (StatusCode::BAD_REQUEST, "PRECONDITION_FAILED"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Configuration
        | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = match &self {
            Self::App(err) if status.is_server_error() => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                "Internal server error".to_string()
            }
            Self::App(err) => err.message.clone(),
            Self::Admission(err) => {
                if status.is_server_error() {
                    tracing::error!(code = error_code, error = %err, "Admission invariant violated");
                }
                err.to_string()
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}
