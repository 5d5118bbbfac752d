mod api;
mod bootstrap;
mod health;
mod portal;
mod refresh;

use anyhow::Result;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeFile;

use stickfit_core::config::{AppConfig, LoadOptions};

use crate::api::AppState;

fn init_logging(config: &AppConfig) {
    use stickfit_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let state = AppState {
        store: app.store.clone(),
        engine: app.engine.clone(),
        narrative: app.narrative.clone(),
        rationale_enabled: app.config.llm.enabled,
        rationale_default: app.config.llm.rationale_default,
    };

    refresh::spawn(app.store.clone(), app.config.catalog.clone());

    let router = Router::new()
        .route("/", get(portal::index))
        .route("/api/recommend", post(api::recommend))
        .route("/healthz", get(health::healthz))
        .route("/health", get(health::health))
        .route_service("/demo", ServeFile::new("crates/server/static/demo.html"))
        .layer(middleware::from_fn(api::track_latency))
        .with_state(state);

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        dataset_rows = app.store.current().len(),
        "stickfit server started"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "stickfit server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
