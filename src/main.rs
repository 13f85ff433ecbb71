use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use api_shared::HealthService;
use passometro_core::CoreConfig;
use passometro_core::config::{
    backend_url_from_env_value, data_dir_from_env_value, timeout_from_env_value,
};

/// Resolves the core configuration from environment values, read once here.
fn config_from_env() -> anyhow::Result<CoreConfig> {
    Ok(CoreConfig::new(
        data_dir_from_env_value(std::env::var("PASSOMETRO_DATA_DIR").ok()),
        backend_url_from_env_value(std::env::var("PASSOMETRO_BACKEND_URL").ok()),
        timeout_from_env_value(std::env::var("PASSOMETRO_TIMEOUT_SECS").ok())?,
    )?)
}

/// Main entry point for the passômetro application
///
/// Loads the entry board and the handoff sheet from the store (preferring the note service's
/// copy of the sheet when it has one) and serves the REST API with Swagger UI.
///
/// # Environment Variables
/// - `PASSOMETRO_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PASSOMETRO_DATA_DIR`: Directory of the JSON store (default: "passometro_data")
/// - `PASSOMETRO_BACKEND_URL`: Note service base URL, or `off` to run without one
/// - `PASSOMETRO_TIMEOUT_SECS`: Note service request timeout (default: 120)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("passometro=info".parse()?)
                .add_directive("passometro_run=info".parse()?)
                .add_directive("passometro_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("PASSOMETRO_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;
    let cfg = config_from_env()?;

    tracing::info!("++ Starting passômetro REST on {}", rest_addr);
    tracing::info!("++ Store directory {}", cfg.data_dir().display());
    match cfg.backend_url() {
        Some(url) => tracing::info!("++ Note service at {}", url),
        None => tracing::warn!("++ No note service configured, generation is disabled"),
    }
    tracing::info!("++ {}", HealthService::check_health().message);

    // Loading may fetch the remote sheet with the blocking client.
    let state = tokio::task::spawn_blocking(move || AppState::from_config(&cfg)).await??;

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, api_rest::router(state)).await?;

    Ok(())
}
