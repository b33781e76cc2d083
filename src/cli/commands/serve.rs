use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::database::Database;
use crate::routes;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    tracing::info!("Starting Tokkatot middleware in {:?} mode", config.environment);

    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    tracing::info!("IoT gateway at {}, AI service at {}", config.iot.gateway_url, config.ai.service_url);

    let state = AppState::build(config, db.clone())?;
    let app = routes::app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
