//! Server using Axum
//!
//! Hosts the WebSocket endpoints and the health/status API on one listener.

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::chat::ChatChannel;
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::storage::LocalStorageAdapter;

use super::middleware::cors_layer;
use super::routes;

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat: ChatChannel,
    pub storage: LocalStorageAdapter,
    pub started_at: DateTime<Utc>,
    pub started: Instant,
}

impl AppState {
    pub fn new(config: Config, chat: ChatChannel, storage: LocalStorageAdapter) -> Self {
        Self {
            config,
            chat,
            storage,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }
}

/// HTTP/WebSocket server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        let cors = cors_layer(&self.state.config.server.cors_origins);

        routes::create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until shutdown
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = self.state.config.server_addr().parse().map_err(|_| {
            RelayError::InvalidConfig(format!(
                "Invalid server address: {}",
                self.state.config.server_addr()
            ))
        })?;

        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let router = self.build_router();

        info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await?;

        info!("Server shut down");
        Ok(())
    }
}
