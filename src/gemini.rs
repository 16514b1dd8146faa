//! Google Gemini integration: client trait, REST client and handle factory.

pub mod client;
pub mod error;
pub mod factory;
#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use factory::{ClientFactory, VISION_TEMPERATURE};

/// HTTP request timeout for Gemini API calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Metadata about an AI client implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct AiClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    /// Maximum output tokens sent with every request.
    pub max_output_tokens: u32,
    /// Whether the system prompt is folded into the first user turn.
    pub system_prompt_as_user: bool,
}

/// Binary payload sent alongside a prompt, e.g. an image or a PDF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// IANA media type.
    pub mime_type: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// Trait for AI service clients.
pub trait AiClient: Send + Sync {
    /// Sends a system and user prompt and returns the plain-text completion.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Same as [`send_request`](Self::send_request), with an inline
    /// attachment in the user turn.
    fn send_request_with_attachment<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        attachment: &'a Attachment,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the AI client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Checks a Gemini HTTP response and maps failures onto [`GeminiError`].
///
/// Invalid keys come back as HTTP 400 with `API_KEY_INVALID`, so the body is
/// inspected as well as the status.
pub(crate) async fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(classify_error(status, &error_text).into())
}

fn classify_error(status: StatusCode, body: &str) -> GeminiError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map_or_else(|| body.to_string(), |e| e.error.message.clone());

    let key_rejected = body.contains("API_KEY_INVALID") || message.contains("API key not valid");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GeminiError::AuthenticationFailed(message)
        }
        StatusCode::BAD_REQUEST if key_rejected => GeminiError::AuthenticationFailed(message),
        StatusCode::TOO_MANY_REQUESTS => GeminiError::RateLimitExceeded,
        _ => {
            let detail = match parsed {
                Some(e) if !e.error.status.is_empty() => format!("{}: {message}", e.error.status),
                _ => message,
            };
            GeminiError::ApiRequestFailed(format!("HTTP {status}: {detail}"))
        }
    }
}

/// Logs successful text extraction from a Gemini response.
pub(crate) fn log_response_success(result: &Result<String>) {
    if let Ok(text) = result {
        tracing::debug!(
            response_len = text.len(),
            "Successfully extracted text content from Gemini API response"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_on_400_is_authentication_failure() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        let err = classify_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, GeminiError::AuthenticationFailed(ref m) if m.contains("API key not valid")));
    }

    #[test]
    fn plain_400_is_request_failure() {
        let body = r#"{"error":{"code":400,"message":"Invalid JSON payload","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_error(StatusCode::BAD_REQUEST, body);
        match err {
            GeminiError::ApiRequestFailed(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("INVALID_ARGUMENT: Invalid JSON payload"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn forbidden_is_authentication_failure() {
        let err = classify_error(StatusCode::FORBIDDEN, "denied");
        assert_eq!(err, GeminiError::AuthenticationFailed("denied".to_string()));
    }

    #[test]
    fn too_many_requests_is_rate_limit() {
        let err = classify_error(StatusCode::TOO_MANY_REQUESTS, "{}");
        assert_eq!(err, GeminiError::RateLimitExceeded);
    }

    #[test]
    fn non_json_body_is_kept_verbatim() {
        let err = classify_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(
            err,
            GeminiError::ApiRequestFailed("HTTP 502 Bad Gateway: upstream down".to_string())
        );
    }
}
