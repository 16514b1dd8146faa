//! Chat endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{default_language, ApiError, AppState};
use crate::chat::ChatPipeline;
use crate::prompts::Language;

/// Request body for `/api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message.
    pub message: String,
    /// Language tag; defaults to `en`.
    #[serde(default = "default_language")]
    pub language: String,
}

/// Response body for `/api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Model reply.
    pub response: String,
    /// Language the reply was requested in.
    pub language: Language,
}

/// Chat routes.
pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat_handler))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }

    let pipeline = ChatPipeline::new(state.factory.chat_client()?);
    let response = pipeline.respond(&request.message, &request.language).await?;

    Ok(Json(ChatResponse {
        response,
        language: Language::from_tag(&request.language),
    }))
}
