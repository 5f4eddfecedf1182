//! wsrelay - Entry Point
//!
//! Starts the WebSocket server and the chat broadcast service with graceful
//! shutdown support.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsrelay::api::{ApiServer, AppState};
use wsrelay::chat::ChatChannel;
use wsrelay::config::{Config, StorageBackend};
use wsrelay::database::Database;
use wsrelay::services::{BroadcastConfig, BroadcastHandle, BroadcastService};
use wsrelay::storage::{KeyValueStore, LocalStorageAdapter, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> wsrelay::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("wsrelay={},tower_http=info", config.log.level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting wsrelay");

    // Open the key/value backend
    let (store, db): (Arc<dyn KeyValueStore>, Option<Database>) = match config.storage.backend {
        StorageBackend::Memory => (Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>, None),
        StorageBackend::Postgres => {
            let db = Database::open(&config).await?;
            let store: Arc<dyn KeyValueStore> = Arc::new(PgStore::new(db.clone()));
            (store, Some(db))
        }
    };
    info!("Using {} storage backend", config.storage.backend.as_str());

    let chat = ChatChannel::new(config.chat.log_capacity);
    let storage = LocalStorageAdapter::new(store);

    // Create shutdown channel
    let (shutdown_tx, _) = watch::channel(false);

    // Start the channel-wide broadcast timer
    let (broadcast_handle, broadcast_shutdown) = BroadcastHandle::new();
    let broadcast_service = BroadcastService::new(
        chat.clone(),
        BroadcastConfig {
            interval: config.chat.broadcast_interval(),
        },
    );
    let broadcast_task = tokio::spawn(async move {
        broadcast_service.run(broadcast_shutdown).await;
    });

    // Start server
    let server = ApiServer::new(AppState::new(config.clone(), chat, storage));
    let server_shutdown = shutdown_tx.subscribe();
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(server_shutdown).await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Server started on {} (echo: /hello, chat: /chat, storage: /storage)",
        config.server_addr()
    );

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    broadcast_handle.shutdown();

    let _ = tokio::join!(server_task, broadcast_task);

    if let Some(db) = db {
        db.close().await;
    }

    info!("wsrelay stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}
