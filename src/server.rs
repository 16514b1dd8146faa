//! HTTP surface: router, CORS policy and server loop.

mod analysis;
mod chat;
mod error;
mod health;
mod research;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use chat::{ChatRequest, ChatResponse};
pub use error::ApiError;
pub use research::ResearchRequest;

use crate::config::Settings;
use crate::gemini::ClientFactory;
use crate::research::TavilyClient;

/// Extra body allowance for multipart framing on top of `max_file_size`.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded settings.
    pub settings: Arc<Settings>,
    /// Memoised Gemini handles.
    pub factory: Arc<ClientFactory>,
    /// Search client; `None` when no Tavily key is configured.
    pub tavily: Option<TavilyClient>,
}

impl AppState {
    /// Builds state from settings with empty client slots.
    pub fn new(settings: Settings) -> Result<Self> {
        let settings = Arc::new(settings);
        Self::with_factory(ClientFactory::new(Arc::clone(&settings)))
    }

    /// Builds state around an existing factory.
    pub fn with_factory(factory: ClientFactory) -> Result<Self> {
        let settings = factory.shared_settings();
        let tavily = settings
            .tavily_api_key
            .clone()
            .map(|key| TavilyClient::new(key, settings.tavily_api_base.clone()))
            .transpose()?;

        Ok(Self {
            settings,
            factory: Arc::new(factory),
            tavily,
        })
    }
}

pub(crate) fn default_language() -> String {
    "en".to_string()
}

/// Builds the CORS layer for the configured origins.
///
/// A literal `*` reflects the request origin so credentials stay allowed.
/// Origins that are not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Skipping invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.settings.max_file_size.saturating_add(MULTIPART_OVERHEAD);
    let cors = cors_layer(&state.settings.cors_origins_list());

    Router::new()
        .merge(health::health_routes())
        .merge(chat::chat_routes())
        .merge(analysis::analysis_routes())
        .merge(research::research_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Binds `host:port` and serves until Ctrl-C.
pub async fn start_server(settings: Settings) -> Result<()> {
    info!(
        google_api_key_present = !settings.google_api_key.is_empty(),
        research_enabled = settings.research_enabled(),
        model = %settings.gemini_model,
        temperature = settings.temperature,
        max_tokens = settings.max_tokens,
        cors_origins = ?settings.cors_origins_list(),
        "Loaded settings"
    );

    let addr = settings.bind_address();
    let app = build_router(AppState::new(settings)?);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Starting MediCare AI backend on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
