//! Boot sequence: configuration, logging, backends, then the HTTP server.
//!
//! Any failure before the listener is bound is fatal; the process exits
//! without serving.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};
use zipgate_api::{ApiServer, ApiState};
use zipgate_config::AppConfig;
use zipgate_data::{RedisManifestStore, S3ObjectFetcher};
use zipgate_telemetry::{LoggingConfig, init_logging};

use crate::error::{AppError, AppResult};

/// Build identifier reported in logs and request spans.
const BUILD_SHA: &str = match option_env!("ZIPGATE_BUILD_SHA") {
    Some(sha) => sha,
    None => env!("CARGO_PKG_VERSION"),
};

/// Entry point for the zipgate boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, logging, either backend or the
/// listener cannot be set up.
pub async fn run_app() -> AppResult<()> {
    let config =
        zipgate_config::from_env().map_err(|err| AppError::config("config.from_env", err))?;
    let logging = LoggingConfig {
        filter: &config.logging.filter,
        format: config.logging.format,
        build_sha: BUILD_SHA,
    };
    init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;
    info!(build_sha = BUILD_SHA, "zipgate bootstrap starting");

    serve(config, shutdown_signal()).await
}

/// Build both backends from `config`, verify the lookup store answers, then
/// serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`AppError::Data`] when a backend cannot be built or the lookup
/// store is unreachable, and [`AppError::ApiServer`] when the listener fails.
pub async fn serve<F>(config: AppConfig, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = RedisManifestStore::connect(&config.redis)
        .map_err(|err| AppError::data("redis.connect", err))?;
    store
        .ping()
        .await
        .map_err(|err| AppError::data("redis.ping", err))?;
    let fetcher = S3ObjectFetcher::from_config(&config.object_store)
        .map_err(|err| AppError::data("object_store.build", err))?;

    let state = ApiState::from_backends(Arc::new(store), Arc::new(fetcher), config.prefetch);
    let addr = config.server.socket_addr();
    info!(
        addr = %addr,
        prefetch = config.prefetch,
        shutdown_grace_secs = config.server.shutdown_grace.as_secs(),
        "launching api listener"
    );

    ApiServer::new(state)
        .with_shutdown_grace(config.server.shutdown_grace)
        .serve(addr, shutdown)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("api server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
