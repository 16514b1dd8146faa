//! Gemini-specific error handling.

use thiserror::Error;

/// Gemini API specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeminiError {
    /// The credential is empty or was rejected by the API.
    #[error("Gemini authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Gemini API request failed with error message.
    #[error("Gemini API request failed: {0}")]
    ApiRequestFailed(String),

    /// Invalid response format from Gemini API.
    #[error("Invalid response format from Gemini API: {0}")]
    InvalidResponseFormat(String),

    /// Rate limit or quota exceeded for Gemini API.
    #[error("Rate limit exceeded. Please try again later")]
    RateLimitExceeded,

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}
