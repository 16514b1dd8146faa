//! Research endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::{default_language, ApiError, AppState};
use crate::research::{ResearchResponse, ResearchService};

/// Request body for `/api/research`.
#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    /// Search query.
    pub query: String,
    /// Language tag; defaults to `en`.
    #[serde(default = "default_language")]
    pub language: String,
}

/// Research routes.
pub fn research_routes() -> Router<AppState> {
    Router::new().route("/api/research", post(research_handler))
}

async fn research_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let Json(request) = payload?;
    let service = ResearchService::new(state.tavily.clone(), state.factory.chat_client()?);
    let response = service.research(&request.query, &request.language).await?;
    Ok(Json(response))
}
