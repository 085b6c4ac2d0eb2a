//! Heap memory exhauster
//!
//! Allocates fixed-size blocks, touches one byte per stride so the pages are
//! really committed, and keeps every block alive until the routine returns.
//! There is no ceiling: the loop only ends when an allocation fails.

use crate::error::AllocationError;
use crate::result::{FaultKind, FaultResult};
use serde::{Deserialize, Serialize};

const GIB: usize = 1024 * 1024 * 1024;

/// Memory exhauster tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Size of each allocated block
    #[serde(default = "default_block_size")]
    pub block_size_bytes: usize,

    /// Distance between touched bytes inside a block
    #[serde(default = "default_touch_stride")]
    pub touch_stride_bytes: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            block_size_bytes: default_block_size(),
            touch_stride_bytes: default_touch_stride(),
        }
    }
}

fn default_block_size() -> usize {
    GIB
}

fn default_touch_stride() -> usize {
    1024
}

/// Source of memory blocks
pub trait BlockSource {
    /// Allocate a zeroed block of `size` bytes
    fn allocate(&mut self, size: usize) -> Result<Vec<u8>, AllocationError>;
}

/// Allocates from the global allocator, reporting failure instead of aborting
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBlocks;

impl BlockSource for SystemBlocks {
    fn allocate(&mut self, size: usize) -> Result<Vec<u8>, AllocationError> {
        if size > isize::MAX as usize {
            return Err(AllocationError::CapacityOverflow(size));
        }
        let mut block = Vec::new();
        block.try_reserve_exact(size)?;
        block.resize(size, 0);
        Ok(block)
    }
}

/// Blocks held by one invocation. Grows until allocation fails and is only
/// released when dropped.
#[derive(Debug, Default)]
pub struct AllocationLedger {
    blocks: Vec<Vec<u8>>,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fully committed blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total committed bytes
    pub fn committed_bytes(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    fn push(&mut self, block: Vec<u8>) {
        self.blocks.push(block);
    }
}

/// Write one byte per stride so lazily mapped pages get committed
fn touch(block: &mut [u8], stride: usize) {
    for byte in block.iter_mut().step_by(stride.max(1)) {
        *byte = 1;
    }
}

/// Run the memory exhauster against the system allocator
pub fn exhaust(config: &MemoryConfig) -> FaultResult {
    exhaust_with(config, &mut SystemBlocks)
}

/// Run the memory exhauster against an arbitrary block source
pub fn exhaust_with<S: BlockSource>(config: &MemoryConfig, source: &mut S) -> FaultResult {
    tracing::info!(
        block_size = config.block_size_bytes,
        "Starting high memory allocation"
    );

    let mut ledger = AllocationLedger::new();
    loop {
        let attempt = ledger.len() + 1;
        tracing::debug!(block = attempt, "Allocating block");

        match source.allocate(config.block_size_bytes) {
            Ok(mut block) => {
                touch(&mut block, config.touch_stride_bytes);
                ledger.push(block);
            }
            Err(e) => {
                tracing::warn!(
                    committed = ledger.len(),
                    error = %e,
                    "Memory allocation failed"
                );
                break;
            }
        }
    }

    let count = ledger.len();
    tracing::info!(
        blocks = count,
        committed_bytes = ledger.committed_bytes(),
        "High memory allocation stopped"
    );

    FaultResult::success(
        FaultKind::HighMemory,
        format!("Memory allocation stopped after {} blocks", count),
    )
    .with_metric("allocated_gb", count)
}
