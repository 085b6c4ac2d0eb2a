//! Faultline daemon library
//!
//! Components of the `faultlined` service:
//! - REST API (catalog, health, fault triggers)
//! - Fault dispatcher with per-invocation isolation
//! - Catalog storage backends
//! - Server lifecycle management

pub mod api;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod server;

pub use catalog::{CatalogStorage, InMemoryCatalog, Item};
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, StorageError};
pub use server::Server;
