//! HTTP surface: aggregation stream, discovery, summary, and share links.

mod commits;
mod repositories;
mod snapshots;
mod summary;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::RecapConfig;
use crate::github::error::ActivityError;
use crate::github::gateway::{ActivityGateway, OctocrabActivityGateway, PersonalAccessToken};
use crate::snapshot::{MemorySnapshotStore, SnapshotStore};
use crate::summarize::{
    AnthropicConfig, AnthropicSummaryProvider, GeminiConfig, GeminiSummaryProvider, GrokConfig,
    GrokSummaryProvider, SummarizerChain, SummaryProvider,
};

/// Shared handler state: one gateway, one provider chain, one snapshot store,
/// all constructed at process start and injected.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<dyn ActivityGateway>,
    summarizer: Arc<SummarizerChain>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl AppState {
    /// Creates state from explicit collaborators.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ActivityGateway>,
        summarizer: Arc<SummarizerChain>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            gateway,
            summarizer,
            snapshots,
        }
    }

    /// Wires collaborators from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::MissingToken`] without a GitHub token and
    /// propagates gateway construction failures.
    pub fn from_config(config: &RecapConfig) -> Result<Self, ActivityError> {
        let token = PersonalAccessToken::new(config.resolve_token()?)?;
        let gateway =
            OctocrabActivityGateway::for_token(&token, &config.resolve_github_api_base())?;

        Ok(Self::new(
            Arc::new(gateway),
            Arc::new(summarizer_chain(config)),
            Arc::new(MemorySnapshotStore::new()),
        ))
    }
}

/// Builds the provider chain in fallback order from the configured keys.
#[must_use]
pub fn summarizer_chain(config: &RecapConfig) -> SummarizerChain {
    let mut providers: Vec<Box<dyn SummaryProvider>> = Vec::new();

    if let Some(api_key) = config.resolve_gemini_api_key() {
        providers.push(Box::new(GeminiSummaryProvider::new(
            GeminiConfig::with_api_key(api_key),
        )));
    }
    if let Some(api_key) = config.resolve_anthropic_api_key() {
        providers.push(Box::new(AnthropicSummaryProvider::new(
            AnthropicConfig::with_api_key(api_key),
        )));
    }
    if let Some(api_key) = config.resolve_grok_api_key() {
        providers.push(Box::new(GrokSummaryProvider::new(GrokConfig::with_api_key(
            api_key,
        ))));
    }

    SummarizerChain::new(providers)
}

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/commits", get(commits::stream_commits))
        .route("/api/repositories", get(repositories::list_repositories))
        .route("/api/summary", post(summary::stream_summary))
        .route("/api/share", post(snapshots::create_snapshot))
        .route("/api/share/{id}", get(snapshots::read_snapshot))
        .with_state(state)
}

/// Serves the router on an already-bound listener.
///
/// # Errors
///
/// Returns [`ActivityError::Io`] when the server loop fails.
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), ActivityError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }
    axum::serve(listener, router(state))
        .await
        .map_err(|error| ActivityError::Io {
            message: format!("server loop failed: {error}"),
        })
}

/// Binds the configured address and serves until shutdown.
///
/// # Errors
///
/// Returns [`ActivityError::Io`] when binding or serving fails.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ActivityError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|error| ActivityError::Io {
            message: format!("failed to bind {addr}: {error}"),
        })?;
    serve_on(listener, state).await
}

/// JSON error body with the given client-facing message.
pub(super) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Maps a pipeline error to a response status for the non-streaming routes.
pub(super) const fn error_status(error: &ActivityError) -> StatusCode {
    match error {
        ActivityError::InvalidTimestamp { .. }
        | ActivityError::InvalidWindow { .. }
        | ActivityError::MissingActor
        | ActivityError::InvalidRepository { .. }
        | ActivityError::InvalidPagination { .. } => StatusCode::BAD_REQUEST,
        ActivityError::MissingToken | ActivityError::Authentication { .. } => {
            StatusCode::UNAUTHORIZED
        }
        ActivityError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        ActivityError::Api { .. } | ActivityError::Network { .. } | ActivityError::Schema { .. } => {
            StatusCode::BAD_GATEWAY
        }
        ActivityError::Configuration { .. }
        | ActivityError::Io { .. }
        | ActivityError::SummaryUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
