use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cqm_executor::ExecutorError;
use serde_json::json;
use thiserror::Error;

/// Failures while loading or registering measure bundles.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse bundle {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid measure bundle '{name}': {source}")]
    InvalidBundle {
        name: String,
        #[source]
        source: ExecutorError,
    },
}

/// Errors surfaced to HTTP clients.
///
/// Construction-time problems with the request (bad measure, bad value
/// sets, bad patient payload) map to 400, an unknown registered measure to
/// 404, and a failure during evaluation itself to 422.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown measure '{0}'")]
    UnknownMeasure(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

impl From<ExecutorError> for ApiError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Evaluation(inner) => Self::Evaluation(inner.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UnknownMeasure(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Evaluation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
