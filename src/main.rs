//! PyPI Cache - A cached, rate-limited PyPI metadata service
//!
//! Serves package metadata over HTTP, memoizing upstream answers.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pypi_cache::{create_router, spawn_purge_task, AppState, Config};

/// Main entry point for the PyPI cache service.
///
/// # Startup Sequence
/// 1. Load `.env` if present, then initialize tracing
/// 2. Load configuration from environment variables
/// 3. Create the shared cache, dispatcher and PyPI client
/// 4. Start the background expiry purge task
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error.
    dotenvy::dotenv().ok();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pypi_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PyPI cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_max_size={}, cache_ttl={}s, max_concurrent_requests={}, rate_limit={}/s, port={}",
        config.cache_max_size,
        config.cache_ttl,
        config.max_concurrent_requests,
        config.rate_limit,
        config.server_port
    );

    let state = AppState::from_config(&config)?;
    info!(
        upstream = %config.pypi_base_url,
        concurrency_limit = state.dispatcher.concurrency_limit(),
        min_interval_ms = state.dispatcher.min_interval().as_millis() as u64,
        "Dispatcher ready"
    );

    let purge_handle = spawn_purge_task(state.cache.clone(), config.purge_interval());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(purge_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the purge task and allows graceful shutdown.
async fn shutdown_signal(purge_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = purge_handle {
        handle.abort();
        warn!("Purge task aborted");
    }
}
