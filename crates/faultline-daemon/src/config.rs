//! Configuration for faultline-daemon

use faultline_core::{
    CpuConfig, CrashConfig, MemoryConfig, SlowCallConfig, SnatConfig, ThreadConfig, TlsConfig,
};
use crate::error::{DaemonError, DaemonResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Fault routine configuration
    #[serde(default)]
    pub faults: FaultsConfig,

    /// Catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            enable_cors: true,
        }
    }
}

/// Settings for every fault routine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultsConfig {
    /// Endpoint used by the bad TLS and slow call faults
    #[serde(default)]
    pub target_url: Option<String>,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub cpu: CpuConfig,

    #[serde(default)]
    pub threads: ThreadConfig,

    #[serde(default)]
    pub snat: SnatConfig,

    #[serde(default)]
    pub tls: TlsConfig,

    #[serde(default)]
    pub slow_call: SlowCallConfig,

    #[serde(default)]
    pub crash: CrashConfig,
}

impl FaultsConfig {
    /// Whether the target URL is set to something non-blank
    pub fn has_target(&self) -> bool {
        self.target_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// Catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Items shown on the landing page
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            featured_limit: default_featured_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_featured_limit() -> usize {
    6
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file and `FAULTLINE_*`
    /// environment variables (nested keys separated by `__`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FAULTLINE")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }
}

/// Values given on the command line; `None` keeps the loaded setting
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub listen: Option<String>,
    pub target_url: Option<String>,
    pub log_level: Option<String>,
    pub json: bool,
}

impl DaemonConfig {
    /// Apply command-line values on top of the loaded layers
    pub fn apply_overrides(&mut self, overrides: CliOverrides) -> DaemonResult<()> {
        if let Some(listen) = overrides.listen {
            self.server.listen_addr = listen
                .parse()
                .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
        }
        if let Some(url) = overrides.target_url {
            self.faults.target_url = Some(url);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self.logging.json = self.logging.json || overrides.json;
        Ok(())
    }
}
