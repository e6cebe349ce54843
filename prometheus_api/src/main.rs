//! Main entry point for the Prometheus API binary

use anyhow::Result;
use prometheus_core::{create_app_with_config, run_server, AppConfig, AppState};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("Failed to read .env file: {}", err),
    }

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", addr);
    info!(
        "Leads storage: {}",
        describe_path(config.storage.leads_path.as_ref())
    );
    info!(
        "Content overrides storage: {}",
        describe_path(config.storage.content_overrides_path.as_ref())
    );

    let state = AppState::open(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {}", e))?;

    info!("App: {} v{}", state.app_name, state.version);
    info!(
        "Admin routes: {}",
        if state.auth_service.is_enabled() { "enabled" } else { "disabled" }
    );
    info!(
        "AI assistant: {}",
        if state.assistant.is_available() { "available" } else { "unavailable" }
    );

    let app = create_app_with_config(state.clone(), &config);

    let served = run_server(app, addr).await;

    state.close().await;
    served?;

    info!("Server shutdown complete");
    Ok(())
}

fn describe_path(path: Option<&std::path::PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "memory only".to_string())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };

        format!(
            "{}={level},prometheus_core={level},tower_http={level}",
            env!("CARGO_CRATE_NAME").replace('-', "_"),
            level = default_level
        )
        .into()
    });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
