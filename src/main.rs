use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use vstore_core::config::{
    allow_empty_uploads_from_env_value, max_upload_bytes_from_env_value,
    storage_root_from_env_value,
};
use vstore_core::{CoreConfig, DEFAULT_REST_ADDR, StoreService};

/// Main entry point for the vstore server
///
/// Resolves configuration from the environment once, ensures the storage root exists, then serves
/// the REST API until Ctrl+C or SIGTERM.
///
/// # Environment Variables
/// - `VSTORE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `VSTORE_STORAGE_ROOT`: Root directory for stored files (default: "uploads")
/// - `VSTORE_ALLOW_EMPTY_UPLOADS`: Whether zero-byte uploads are accepted (default: true)
/// - `VSTORE_MAX_UPLOAD_BYTES`: Upload body limit in bytes (default: 64 MiB)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is invalid,
/// - the storage root cannot be created, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vstore=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("VSTORE_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = Arc::new(CoreConfig::new(
        storage_root_from_env_value(std::env::var("VSTORE_STORAGE_ROOT").ok()),
        allow_empty_uploads_from_env_value(std::env::var("VSTORE_ALLOW_EMPTY_UPLOADS").ok())?,
        max_upload_bytes_from_env_value(std::env::var("VSTORE_MAX_UPLOAD_BYTES").ok())?,
    )?);
    let service = Arc::new(StoreService::initialise(&cfg)?);

    tracing::info!(
        storage_root = %service.storage_root().display(),
        allow_empty_uploads = cfg.allow_empty_uploads(),
        max_upload_bytes = cfg.max_upload_bytes(),
        "storage ready"
    );
    tracing::info!("++ Starting vstore REST on {}", rest_addr);

    let app = api_rest::router(AppState::new(cfg, service));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- vstore stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("received termination signal, shutting down");
}
