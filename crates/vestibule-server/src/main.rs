//! Vestibule server entry point.
//!
//! Bootstraps profile storage, the maintenance store, and the credential
//! store, then starts the Axum HTTP shell with graceful shutdown. A
//! background reconciliation worker polls the platform API alongside the
//! server and is cancelled on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use vestibule_core::bus::ChangeBus;
use vestibule_core::session::CredentialStore;
use vestibule_core::source::StatusSource;
use vestibule_core::store::MaintenanceStore;
use vestibule_storage::MemoryBackend;

use vestibule_server::build_router;
use vestibule_server::config::{ServerConfig, StorageBackendType};
use vestibule_server::state::AppState;
use vestibule_server::upstream::HttpStatusSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "Vestibule starting");

    // Bootstrap profile storage.
    let storage: Arc<dyn vestibule_storage::StorageBackend> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (profile will not persist)");
            Arc::new(MemoryBackend::new())
        }
        #[cfg(feature = "redb-backend")]
        StorageBackendType::Redb { path } => {
            info!(path = %path, "using redb storage");
            Arc::new(
                vestibule_storage::RedbBackend::open(path)
                    .context("failed to open redb storage")?,
            )
        }
        #[cfg(not(feature = "redb-backend"))]
        StorageBackendType::Redb { .. } => {
            anyhow::bail!("redb backend requested but feature 'redb-backend' is not enabled");
        }
    };

    // Remote reconciliation is optional; without an API base the shell
    // trusts its local profile alone.
    let source: Option<Arc<dyn StatusSource>> = match &config.api_base {
        Some(base) => {
            let upstream = HttpStatusSource::new(base)
                .context("failed to build the upstream status client")?;
            info!(url = %upstream.url(), "remote reconciliation enabled");
            Some(Arc::new(upstream))
        }
        None => {
            info!("no API base configured, running local-only");
            None
        }
    };

    let store = Arc::new(MaintenanceStore::new(
        Arc::clone(&storage),
        ChangeBus::default(),
        source,
    ));

    // The stored state must be loaded before the first request is gated,
    // otherwise early navigations see the loading shell unnecessarily.
    store.initialize().await;

    let credentials = CredentialStore::new(storage);
    let state = Arc::new(AppState::new(Arc::clone(&store), credentials));

    // Shutdown signal channel.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn the reconciliation background worker.
    let worker_handle = {
        let store = Arc::clone(&store);
        let rx = shutdown_rx.clone();
        let interval = config.reconcile_interval;
        tokio::spawn(async move {
            store.run(interval, rx).await;
        })
    };

    let app = build_router(state);

    // Bind and serve.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Vestibule listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    // Wait for the background worker to finish (with timeout).
    info!("waiting for the reconciliation worker to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), worker_handle).await;

    info!("Vestibule stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
