mod bootstrap;
mod catalog_api;
mod health;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use shelf_core::config::{AppConfig, LoadOptions};
use tracing::info;

fn init_logging(config: &AppConfig) {
    use shelf_core::config::LogFormat::*;
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
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        bind_address = %address,
        "catalog server listening"
    );

    let router = Router::new()
        .merge(health::router())
        .merge(catalog_api::router(Arc::clone(&app.store)));
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    info!(event_name = "system.server.stopped", "catalog server stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
