//! Service information and health endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::AppState;

/// Root and health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to MediCare AI Backend",
        "version": crate::VERSION,
        "powered_by": "Google Gemini",
        "docs": "/health",
        "status": "running"
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "medicare-ai",
        "version": crate::VERSION,
        "model": state.settings.gemini_model,
        "research_enabled": state.settings.research_enabled(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
