use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use vault_core::config::{environment_from_env_value, resolve_data_dir};
use vault_core::constants::{APP_NAME, APP_VERSION, DEFAULT_REST_ADDR};
use vault_core::{CoreConfig, InMemoryRecordStore, VisionEnv};
use vault_files::ImageStore;
use vault_vision::{VisionError, extractor_from_config};

/// Main entry point for the Personal Vault service
///
/// Resolves configuration from the environment (and `.env`), then serves the REST API.
///
/// # Environment Variables
/// - `VAULT_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `VAULT_DATA_DIR`: Image storage directory, created if absent (default: "vault_data")
/// - `OPENAI_API_KEY`: Vision API key, required unless `MOCK_AI=true`
/// - `VAULT_VISION_MODEL`, `VAULT_VISION_TIMEOUT_SECS`, `VAULT_VISION_MAX_RETRIES`
/// - `MOCK_AI`: Serve a fixed extraction instead of calling the vision API
/// - `ENVIRONMENT`: `production` disables the Swagger UI
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration values are invalid or the data directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vault_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("analytics=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("VAULT_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let data_dir = resolve_data_dir(std::env::var("VAULT_DATA_DIR").ok().map(PathBuf::from))?;

    let cfg = Arc::new(CoreConfig::new(
        data_dir,
        VisionEnv::from_env().resolve()?,
        environment_from_env_value(std::env::var("ENVIRONMENT").ok()),
    )?);

    for setting in cfg.missing_settings() {
        tracing::warn!("{} is not set; record extraction is unavailable", setting);
    }

    let extractor = match extractor_from_config(&cfg) {
        Ok(extractor) => {
            tracing::info!("vision extractor: {}", extractor.name());
            Some(extractor)
        }
        Err(VisionError::MissingApiKey) => None,
        Err(e) => return Err(e.into()),
    };

    let images = Arc::new(ImageStore::new(cfg.data_dir())?);
    let state = AppState::new(
        cfg.clone(),
        Arc::new(InMemoryRecordStore::new()),
        extractor,
        images,
    )?;

    tracing::info!("++ Starting {} v{} on {}", APP_NAME, APP_VERSION, rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down");
}
