use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shared::LoaderError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    PayloadTooLarge { limit: usize },
    /// Body the JSON extractor refused, with the status axum chose for it
    Rejected { status: StatusCode, message: String },
    Internal(String),
}

impl From<LoaderError> for ApiError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::InvalidName(_) => Self::Validation(err.to_string()),
            LoaderError::NotFound { .. } => Self::NotFound(err.to_string()),
            LoaderError::Io { .. } => {
                tracing::error!(error = %err, "strategy file could not be read");
                Self::Internal("failed to read strategy file".into())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("strategy code exceeds {} bytes", limit),
            ),
            Self::Rejected { status, message } => (status, message),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
