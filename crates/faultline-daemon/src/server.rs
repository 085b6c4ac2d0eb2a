//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::catalog::{CatalogStorage, InMemoryCatalog};
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Faultline daemon server
pub struct Server {
    config: DaemonConfig,
    catalog: Arc<dyn CatalogStorage>,
}

impl Server {
    /// Create a new server backed by the seeded in-memory catalog
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        Ok(Self::with_catalog(config, Arc::new(InMemoryCatalog::seeded())))
    }

    pub fn with_catalog(config: DaemonConfig, catalog: Arc<dyn CatalogStorage>) -> Self {
        Self { config, catalog }
    }

    /// Router for this server's configuration
    pub fn router(&self) -> axum::Router {
        create_router(AppState::new(self.catalog.clone(), &self.config))
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let app = self.router();

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Faultline daemon listening on {}", addr);
        if !self.config.faults.has_target() {
            tracing::warn!("No fault target URL configured; badtls and slowcall will be refused");
        }

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Faultline daemon shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
