//! Core library for the Prometheus API: lead capture, site content, admin tools and
//! the AI assistant, plus the HTTP layer that exposes them.

pub mod ai;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod storage;
pub mod validation;

pub use ai::{AiAssistant, AiError, ChatCompletion, Intent, OpenAiClient};
pub use auth::{AdminAccess, AuthService};
pub use config::AppConfig;
pub use content::SiteContent;
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use middleware::{RateLimiter, TransportPolicy};
pub use storage::{ContentOverridesStore, LeadsStore, Persisted, StorageError};

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::{error, info};

pub const APP_NAME: &str = "prometheus-api";

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub content: Arc<SiteContent>,
    pub leads: LeadsStore,
    pub overrides: ContentOverridesStore,
    pub auth_service: Arc<AuthService>,
    pub assistant: Arc<AiAssistant>,
    pub rate_limiter: RateLimiter,
    pub transport: TransportPolicy,
}

impl AppState {
    /// Builds the state with unloaded stores. Must run inside a Tokio runtime when
    /// storage paths are configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            app_name: APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            content: Arc::new(SiteContent::baseline()?),
            leads: LeadsStore::new(config.storage.leads_path.clone()),
            overrides: ContentOverridesStore::new(config.storage.content_overrides_path.clone()),
            auth_service: Arc::new(AuthService::new(&config.admin)),
            assistant: Arc::new(AiAssistant::from_config(&config.ai)),
            rate_limiter: RateLimiter::from_config(&config.rate_limit),
            transport: TransportPolicy {
                trust_proxy: config.server.trust_proxy,
                require_https: config.server.require_https,
            },
        })
    }

    /// Builds the state and loads both stores from disk.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let state = Self::from_config(config)?;
        state.leads.load_if_needed().await;
        state.overrides.load_if_needed().await;
        Ok(state)
    }

    pub fn with_assistant(mut self, assistant: AiAssistant) -> Self {
        self.assistant = Arc::new(assistant);
        self
    }

    pub fn with_auth(mut self, auth_service: AuthService) -> Self {
        self.auth_service = Arc::new(auth_service);
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Baseline content with the current overrides applied.
    pub async fn current_content(&self) -> SiteContent {
        let overrides = self.overrides.get().await;
        self.content.with_overrides(&overrides)
    }

    /// Lets queued writes settle. Call after the server has stopped.
    pub async fn close(&self) {
        self.leads.close().await;
        self.overrides.close().await;
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, &AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    let mut router = create_routes(state.clone())
        .layer(DefaultBodyLimit::max(config.http.json_body_limit_bytes))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ));

    if state.transport.require_https {
        router = router.layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_https_middleware,
        ));
    }

    router = router
        .layer(CompressionLayer::new())
        .layer(middleware::cors_layer_from_config(config));
    router = middleware::with_security_headers(router);
    router = middleware::with_request_tracing(router);

    router.with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
