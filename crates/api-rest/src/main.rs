//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging against a scratch data directory. The workspace's main
//! `passometro-run` binary serves the same router.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use passometro_core::config::{
    backend_url_from_env_value, data_dir_from_env_value, timeout_from_env_value,
};
use passometro_core::CoreConfig;

/// Main entry point for the passômetro REST API server.
///
/// # Environment Variables
/// - `PASSOMETRO_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `PASSOMETRO_DATA_DIR`: Directory of the JSON store (default: "passometro_data")
/// - `PASSOMETRO_BACKEND_URL`: Note service base URL, or `off` to run without one
/// - `PASSOMETRO_TIMEOUT_SECS`: Note service request timeout
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the store cannot be read,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("passometro_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PASSOMETRO_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var("PASSOMETRO_DATA_DIR").ok()),
        backend_url_from_env_value(std::env::var("PASSOMETRO_BACKEND_URL").ok()),
        timeout_from_env_value(std::env::var("PASSOMETRO_TIMEOUT_SECS").ok())?,
    )?;

    tracing::info!("-- Starting passômetro REST API on {}", addr);
    match cfg.backend_url() {
        Some(url) => tracing::info!("-- Note service at {}", url),
        None => tracing::info!("-- Running without a note service"),
    }

    let state = tokio::task::spawn_blocking(move || AppState::from_config(&cfg)).await??;
    let app = api_rest::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
