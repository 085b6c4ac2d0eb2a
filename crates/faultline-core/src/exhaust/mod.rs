//! Resource exhausters
//!
//! Each routine consumes one resource until a natural limit, an error or a
//! timebox, then reports how far it got. All of them block the caller.

pub mod cpu;
pub mod memory;
pub mod threads;

pub use cpu::CpuConfig;
pub use memory::{AllocationLedger, BlockSource, MemoryConfig, SystemBlocks};
pub use threads::{ThreadConfig, ThreadRegistry};
