//! HTTP error responses.

use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::analysis::AnalysisError;
use crate::gemini::GeminiError;
use crate::research::ResearchError;

/// Error returned by route handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request is malformed or incomplete.
    #[error("{0}")]
    BadRequest(String),

    /// An uploaded file exceeds the configured limit.
    #[error("File exceeds the {limit} byte upload limit")]
    PayloadTooLarge {
        /// Limit in bytes.
        limit: usize,
    },

    /// The JSON body is missing, malformed or has the wrong shape.
    #[error("{}", .0.body_text())]
    Json(#[from] JsonRejection),

    /// The request is not a readable multipart form.
    #[error("{}", .0.body_text())]
    MultipartForm(#[from] MultipartRejection),

    /// The multipart body could not be read.
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// Failure from the pipeline, the analyzer or the research service.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Json(e) => e.status(),
            Self::MultipartForm(e) => e.status(),
            Self::Multipart(e) => e.status(),
            Self::Upstream(e) => upstream_status(e),
        }
    }
}

fn upstream_status(err: &anyhow::Error) -> StatusCode {
    if let Some(e) = err.downcast_ref::<GeminiError>() {
        return match e {
            GeminiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_GATEWAY,
        };
    }
    if let Some(e) = err.downcast_ref::<AnalysisError>() {
        return match e {
            AnalysisError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AnalysisError::EmptyDocument | AnalysisError::InvalidText => StatusCode::BAD_REQUEST,
        };
    }
    if let Some(e) = err.downcast_ref::<ResearchError>() {
        return match e {
            ResearchError::EmptyQuery => StatusCode::BAD_REQUEST,
            ResearchError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        } else {
            warn!(status = %status, error = %message, "Request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
