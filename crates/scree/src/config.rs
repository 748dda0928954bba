//! Heap configuration parameters.

use crate::block::HEADER_SIZE;

/// Configuration for a [`Heap`](crate::Heap).
///
/// Controls the arena capacity. Validated when the heap is constructed;
/// immutable afterwards. A heap never grows past its configured capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Total arena capacity in bytes, block headers included.
    ///
    /// Default: 4096 (one page). Must be at least
    /// [`MIN_CAPACITY`](Self::MIN_CAPACITY) and below `u32::MAX`, which is
    /// reserved as the free-list terminator.
    pub capacity: u32,
}

impl HeapConfig {
    /// Default arena capacity: 4 KiB.
    pub const DEFAULT_CAPACITY: u32 = 4096;

    /// Smallest accepted capacity: one block header plus an equally sized
    /// payload. Anything smaller cannot satisfy a single allocation.
    pub const MIN_CAPACITY: u32 = 2 * HEADER_SIZE;

    /// Create a config with the given arena capacity.
    pub fn new(capacity: u32) -> Self {
        Self { capacity }
    }

    /// Payload capacity of a freshly initialised arena: everything except
    /// the spanning descriptor's own header.
    pub fn initial_free_bytes(&self) -> u32 {
        self.capacity - HEADER_SIZE
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
