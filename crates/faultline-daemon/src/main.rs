//! Faultline daemon - fault injection service
//!
//! The daemon provides:
//! - Fault trigger endpoints under `/api/faults/{name}`
//! - A small read-only product catalog
//! - Health reporting

use clap::Parser;
use faultline_daemon::config::{CliOverrides, DaemonConfig};
use faultline_daemon::error::{DaemonError, DaemonResult};
use faultline_daemon::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Faultline daemon CLI
#[derive(Parser)]
#[command(name = "faultlined")]
#[command(about = "Faultline daemon - fault injection service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FAULTLINE_CONFIG")]
    config: Option<String>,

    /// Listen address (defaults to `server.listen_addr`, itself `0.0.0.0:5000`)
    #[arg(short, long, env = "FAULTLINE_LISTEN_ADDR")]
    listen: Option<String>,

    /// Endpoint used by the bad TLS and slow call faults
    #[arg(short, long, env = "FAULTLINE_TARGET_URL")]
    target_url: Option<String>,

    /// Log level (defaults to `logging.level`, itself `info`)
    #[arg(long, env = "FAULTLINE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "FAULTLINE_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    config.apply_overrides(CliOverrides {
        listen: cli.listen,
        target_url: cli.target_url,
        log_level: cli.log_level,
        json: cli.json,
    })?;

    // Initialize tracing
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(&config.logging.level).map_err(|e| {
            DaemonError::Config(format!("Invalid log level '{}': {}", config.logging.level, e))
        })?,
    };

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Print startup banner
    println!(
        r#"
  ___           _ _   _ _
 | __|_ _ _  _ | | |_| (_)_ _  ___
 | _/ _` | || || |  _| | | ' \/ -_)
 |_|\__,_|\_,_||_|\__|_|_|_||_\___|

  Faultline - Fault Injection Service
  Version: {}
  Listening: {}
  Fault target: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.server.listen_addr,
        if config.faults.has_target() {
            "configured"
        } else {
            "not configured"
        }
    );

    // Create and run server
    let server = Server::new(config)?;
    server.run().await
}
