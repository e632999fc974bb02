//! HTTP server.
//!
//! Routes:
//! - `POST /api/chat` - select a model and dispatch to a streaming responder
//! - `GET /api/models` - enabled models from the catalog
//! - `GET /api/user` - display name and avatar of the caller
//! - `GET /health` - liveness probe

pub mod base_url;
mod chat;
mod catalog;
mod user;

pub use chat::{is_share_page, ChatRequest};

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::auth::{AnonymousAuth, AuthProvider, TrustedHeaderAuth};
use crate::config::ServerConfig;
use crate::error::ChatError;
use crate::models::{ModelCatalog, ProviderRegistry, ToolCallType};
use crate::streaming::{EventStreamResponder, StreamResponder};

/// Shared, read-only state for all requests.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub catalog: ModelCatalog,
    pub auth: Arc<dyn AuthProvider>,
    pub native_responder: Arc<dyn StreamResponder>,
    pub manual_responder: Arc<dyn StreamResponder>,
    pub base_url: Option<Url>,
    pub trusted_proxy_headers: bool,
    pub max_duration: Duration,
}

impl AppState {
    /// State with anonymous auth and the event-stream responders.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            catalog: ModelCatalog::new(),
            auth: Arc::new(AnonymousAuth),
            native_responder: Arc::new(EventStreamResponder::native()),
            manual_responder: Arc::new(EventStreamResponder::manual()),
            base_url: None,
            trusted_proxy_headers: false,
            max_duration: ServerConfig::default().max_duration,
        }
    }

    /// State for a server configuration.
    pub fn from_config(config: &ServerConfig, registry: ProviderRegistry) -> Self {
        let mut state = Self::new(registry);
        state.base_url = config.base_url.clone();
        state.trusted_proxy_headers = config.trusted_proxy_headers;
        state.max_duration = config.max_duration;
        if config.trusted_auth_headers {
            state.auth = Arc::new(TrustedHeaderAuth);
        }
        state
    }

    /// Replace the auth collaborator.
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }

    /// Replace the native and manual streaming responders.
    pub fn with_responders(
        mut self,
        native: Arc<dyn StreamResponder>,
        manual: Arc<dyn StreamResponder>,
    ) -> Self {
        self.native_responder = native;
        self.manual_responder = manual;
        self
    }

    /// Fix the base URL instead of deriving it from request headers.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Let proxy-set headers choose the base URL.
    pub fn with_trusted_proxy_headers(mut self, trusted: bool) -> Self {
        self.trusted_proxy_headers = trusted;
        self
    }

    /// The responder for a tool-calling mode.
    pub fn responder(&self, mode: ToolCallType) -> &Arc<dyn StreamResponder> {
        match mode {
            ToolCallType::Native => &self.native_responder,
            ToolCallType::Manual => &self.manual_responder,
        }
    }
}

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    ChatError::Internal(anyhow::anyhow!("request handler panicked")).into_response()
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let max_duration = state.max_duration;

    Router::new()
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/models", get(catalog::models_handler))
        .route("/api/user", get(user::user_handler))
        .route("/health", get(health))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            max_duration,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process receives Ctrl-C.
pub async fn serve(config: ServerConfig, registry: ProviderRegistry) -> anyhow::Result<()> {
    let enabled = registry.enabled_providers().join(", ");
    if enabled.is_empty() {
        tracing::warn!("No model providers are enabled; chat requests will be rejected");
    } else {
        tracing::info!(providers = %enabled, "Enabled model providers");
    }

    let state = AppState::from_config(&config, registry);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
