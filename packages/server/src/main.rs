// Main entry point for the Clinical Component Identifier API server

use std::sync::Arc;

use anyhow::{Context, Result};
use identifier::IdentifyService;
use openai_client::OpenAIClient;
use server_core::{build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,identifier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("Starting Clinical Component Identifier API");

    // Missing credential or model id is fatal here, never per-request
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(model = %config.fine_tuned_model, "Configuration loaded");

    let client = Arc::new(OpenAIClient::new(config.openai_api_key.clone()));
    let service = Arc::new(IdentifyService::new(client, config.fine_tuned_model.clone()));

    let app = build_app(service);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
