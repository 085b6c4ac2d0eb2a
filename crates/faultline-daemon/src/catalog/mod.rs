//! Read-only item catalog
//!
//! Backs the landing and product listing endpoints.

mod item;
mod memory;
mod traits;

pub use item::Item;
pub use memory::InMemoryCatalog;
pub use traits::{CatalogStorage, StorageResult};
