//! Allocation handles.
//!
//! An [`Allocation`] stands for one live allocated block. It is the only
//! way to reach a payload or to release a block, and it is deliberately
//! neither `Copy` nor `Clone`: [`Heap::release`](crate::Heap::release)
//! consumes the handle by value, so releasing the same block twice is a
//! compile error rather than a heap corruption.

use std::fmt;

/// Handle to a live allocated block within a [`Heap`](crate::Heap).
///
/// Obtained from [`Heap::allocate`](crate::Heap::allocate) and consumed by
/// [`Heap::release`](crate::Heap::release). The handle records the granted
/// payload size, which can exceed the requested size by up to one header's
/// worth of bytes when the chosen free block was too small to split (see
/// the crate docs on whole-block grants).
///
/// A handle does not borrow the heap, so it can outlive state it describes:
/// after [`Heap::reset`](crate::Heap::reset), or against a different heap,
/// the handle is stale and any use of it panics via the header tag check.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Allocation {
    /// Byte offset of the payload (immediately after the block header).
    pub(crate) offset: u32,
    /// Granted payload length in bytes.
    pub(crate) size: u32,
}

impl Allocation {
    /// Create a new handle.
    pub(crate) fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// Byte offset of the payload within the heap's arena.
    ///
    /// Useful for diagnostics alongside
    /// [`FreeBlock::offset`](crate::FreeBlock::offset); payload access
    /// itself goes through [`Heap::payload`](crate::Heap::payload).
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Granted payload length in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Allocation(off={}, len={})", self.offset, self.size)
    }
}
