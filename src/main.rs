use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use pocketbook_core::config::{cache_max_age_from_env_value, storage_from_env_value};
use pocketbook_core::{CoreConfig, StorageBackend, DEFAULT_REST_ADDR};

/// Main entry point for the PocketBook application
///
/// Resolves configuration once, opens the medication store and serves the REST API.
///
/// # Environment Variables
/// - `POCKETBOOK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDICATION_DATA_DIR`: Directory for the medication document (default: in-memory storage)
/// - `API_KEY`: API key required on write endpoints (default: writes are open)
/// - `CACHE_MAX_AGE_SECS`: `Cache-Control` max-age for single-record reads (default: 86400)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, store startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pocketbook=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("POCKETBOOK_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let storage = storage_from_env_value(std::env::var("MEDICATION_DATA_DIR").ok());
    let cache_max_age_secs = cache_max_age_from_env_value(std::env::var("CACHE_MAX_AGE_SECS").ok())?;
    let api_key = std::env::var("API_KEY")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match &storage {
        StorageBackend::Memory => {
            tracing::warn!("MEDICATION_DATA_DIR not set; medications are kept in memory only")
        }
        StorageBackend::File(dir) => tracing::info!("Medication data in {}", dir.display()),
    }
    if api_key.is_none() {
        tracing::warn!("API_KEY not set; write endpoints are open to every caller");
    }

    let cfg = CoreConfig::new(storage);
    let medications = cfg.medication_service()?;

    let app = api_rest::router(AppState::new(medications, api_key, cache_max_age_secs));

    tracing::info!("++ Starting PocketBook REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
