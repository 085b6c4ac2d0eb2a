//! Application state for API handlers

use crate::catalog::CatalogStorage;
use crate::config::{DaemonConfig, FaultsConfig};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog backend
    pub catalog: Arc<dyn CatalogStorage>,

    /// Fault routine settings, shared read-only by every invocation
    pub faults: Arc<FaultsConfig>,

    /// Items on the landing page
    pub featured_limit: usize,

    /// Attach a permissive CORS layer
    pub enable_cors: bool,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(catalog: Arc<dyn CatalogStorage>, config: &DaemonConfig) -> Self {
        Self {
            catalog,
            faults: Arc::new(config.faults.clone()),
            featured_limit: config.catalog.featured_limit,
            enable_cors: config.server.enable_cors,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        format_uptime((chrono::Utc::now() - self.started_at).num_seconds())
    }
}

fn format_uptime(secs: i64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}
