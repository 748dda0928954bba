//! The heap itself: a fixed-size arena carved into blocks by a first-fit
//! free-list allocator.
//!
//! A [`Heap`] owns its arena outright. Every operation works on explicit
//! state passed through `&self`/`&mut self`, so independent heaps never
//! interfere and a heap moves and drops like any other value.
//!
//! Allocation walks the free list for the first node whose payload can
//! hold the request, then either splits that node (leaving the tail as a
//! smaller free node) or grants it whole when the tail could not hold a
//! descriptor of its own. Release validates the block's tag, then
//! re-inserts the block in address order and merges it with any
//! physically adjacent free neighbours, so the list never carries two
//! touching nodes.

use crate::arena::Arena;
use crate::block::{BlockHeader, FreeNode, BLOCK_TAG, HEADER_SIZE};
use crate::config::HeapConfig;
use crate::error::AllocError;
use crate::free_list::{self, FreeList};
use crate::handle::Allocation;

/// Fixed-capacity heap with first-fit allocation over an embedded free
/// list.
///
/// Capacity is set at construction and never grows. Out of the configured
/// capacity, every block (free or allocated) spends [`HEADER_SIZE`] bytes
/// on its descriptor, so a fresh heap reports
/// `capacity - HEADER_SIZE` bytes available.
///
/// # Examples
///
/// ```
/// use scree::Heap;
///
/// let mut heap = Heap::with_capacity(1024);
/// let block = heap.allocate(64)?;
/// heap.payload_mut(&block)[0] = 7;
/// assert_eq!(heap.payload(&block)[0], 7);
/// heap.release(block);
/// assert_eq!(heap.free_node_count(), 1);
/// # Ok::<(), scree::AllocError>(())
/// ```
pub struct Heap {
    arena: Arena,
    /// Offset of the first free node, `None` when everything is allocated.
    head: Option<u32>,
    config: HeapConfig,
}

impl Heap {
    /// Create a heap with the default capacity of
    /// [`HeapConfig::DEFAULT_CAPACITY`] bytes.
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    /// Create a heap with an explicit capacity in bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is below [`HeapConfig::MIN_CAPACITY`] or not
    /// below `u32::MAX`.
    pub fn with_capacity(capacity: u32) -> Self {
        Self::with_config(HeapConfig::new(capacity))
    }

    /// Create a heap from a full configuration.
    ///
    /// The arena starts zeroed with a single free node spanning all of it.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is below [`HeapConfig::MIN_CAPACITY`]
    /// or not below `u32::MAX`.
    pub fn with_config(config: HeapConfig) -> Self {
        assert!(
            config.capacity >= HeapConfig::MIN_CAPACITY,
            "heap capacity {} is below the minimum of {} bytes",
            config.capacity,
            HeapConfig::MIN_CAPACITY,
        );
        assert!(
            config.capacity < u32::MAX,
            "heap capacity must be below u32::MAX",
        );
        let mut arena = Arena::new(config.capacity);
        FreeNode {
            size: config.initial_free_bytes(),
            next: None,
        }
        .write(&mut arena, 0);
        Self {
            arena,
            head: Some(0),
            config,
        }
    }

    /// The configuration this heap was built from.
    pub fn config(&self) -> HeapConfig {
        self.config
    }

    /// Allocate a block of at least `size` payload bytes.
    ///
    /// The first free node large enough is used. When the node's surplus
    /// can hold a descriptor of its own the node is split and the surplus
    /// stays free; otherwise the whole node is granted and the returned
    /// handle reports the larger size (at most `size + HEADER_SIZE - 1`
    /// bytes).
    ///
    /// A `size` of zero is legal and yields a zero-length (or
    /// whole-grant) block that must still be released.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::OutOfMemory`] when no free node can hold the
    /// request, even if the total free bytes would suffice. The heap is
    /// left unchanged in that case.
    pub fn allocate(&mut self, size: u32) -> Result<Allocation, AllocError> {
        let Some(fit) = free_list::find_fit(&self.arena, self.head, size) else {
            return Err(AllocError::OutOfMemory {
                requested: size as usize,
                available: self.available_memory(),
            });
        };
        let granted = if fit.node.size - size >= HEADER_SIZE {
            // Carve the tail of the node into a new free node. Zero-sized
            // remainders are kept; they become usable again once a
            // neighbour is released and merges with them.
            let remainder = fit.offset + HEADER_SIZE + size;
            FreeNode {
                size: fit.node.size - size - HEADER_SIZE,
                next: fit.node.next,
            }
            .write(&mut self.arena, remainder);
            self.relink(fit.prev, Some(remainder));
            size
        } else {
            // The surplus cannot hold a descriptor, so the whole node is
            // granted and the slack travels with the allocation.
            self.relink(fit.prev, fit.node.next);
            fit.node.size
        };
        BlockHeader {
            size: granted,
            tag: BLOCK_TAG,
        }
        .write(&mut self.arena, fit.offset);
        Ok(Allocation::new(fit.offset + HEADER_SIZE, granted))
    }

    /// Return a block to the heap.
    ///
    /// Consumes the handle, so a block cannot be released twice. The
    /// block's payload bytes are left untouched; only the descriptor is
    /// rewritten. Physically adjacent free neighbours on either side are
    /// merged before returning.
    ///
    /// # Panics
    ///
    /// Panics if the block's descriptor does not carry the allocated tag,
    /// which means the handle is stale (the heap was reset, or the handle
    /// belongs to another heap) or the descriptor was overwritten through
    /// the payload of a neighbouring block.
    pub fn release(&mut self, allocation: Allocation) {
        let header_offset = allocation.offset() - HEADER_SIZE;
        let header = BlockHeader::read(&self.arena, header_offset);
        assert!(
            header.is_allocated(),
            "released block at offset {} has tag {:#010x}, expected {:#010x}; \
             the handle is stale or the descriptor was overwritten",
            header_offset,
            header.tag,
            BLOCK_TAG,
        );
        let prev = free_list::insert(&mut self.arena, &mut self.head, header_offset, header.size);
        // Walking from the predecessor covers both seams of the inserted
        // node in one pass.
        free_list::coalesce(&mut self.arena, prev.unwrap_or(header_offset));
    }

    /// Read access to an allocation's payload bytes.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live block of this heap.
    pub fn payload(&self, allocation: &Allocation) -> &[u8] {
        self.check_live(allocation);
        self.arena.slice(allocation.offset(), allocation.size())
    }

    /// Write access to an allocation's payload bytes.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live block of this heap.
    pub fn payload_mut(&mut self, allocation: &Allocation) -> &mut [u8] {
        self.check_live(allocation);
        self.arena.slice_mut(allocation.offset(), allocation.size())
    }

    /// Drop every allocation and restore the fresh single-node state.
    ///
    /// The arena is re-zeroed, so handles from before the reset fail the
    /// tag check instead of silently aliasing new allocations.
    pub fn reset(&mut self) {
        self.arena = Arena::new(self.config.capacity);
        FreeNode {
            size: self.config.initial_free_bytes(),
            next: None,
        }
        .write(&mut self.arena, 0);
        self.head = Some(0);
    }

    /// Iterate the free list in address order.
    pub fn free_list(&self) -> FreeList<'_> {
        FreeList::new(&self.arena, self.head)
    }

    /// Total payload bytes across all free nodes.
    ///
    /// This is the sum of node capacities, not the largest allocatable
    /// request; fragmentation can make every individual node smaller than
    /// the total. See [`largest_free_block`](Self::largest_free_block).
    pub fn available_memory(&self) -> usize {
        self.free_list().map(|block| block.size as usize).sum()
    }

    /// Number of nodes currently on the free list.
    pub fn free_node_count(&self) -> usize {
        self.free_list().count()
    }

    /// Payload capacity of the largest free node, or zero when the list
    /// is empty.
    ///
    /// An allocation of exactly this size always succeeds; anything
    /// larger never does.
    pub fn largest_free_block(&self) -> usize {
        self.free_list()
            .map(|block| block.size as usize)
            .max()
            .unwrap_or(0)
    }

    /// Configured arena capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.config.capacity as usize
    }

    /// Bytes consumed by live allocations, descriptors included.
    ///
    /// Together with the free side this always accounts for the whole
    /// arena: `used_memory() + available_memory() + free_node_count() *
    /// HEADER_SIZE == capacity()`.
    pub fn used_memory(&self) -> usize {
        self.capacity() - self.available_memory() - self.free_node_count() * HEADER_SIZE as usize
    }

    /// Point-in-time snapshot of the heap's accounting counters.
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            capacity: self.capacity(),
            available: self.available_memory(),
            used: self.used_memory(),
            free_nodes: self.free_node_count(),
            largest_free_block: self.largest_free_block(),
        }
    }

    /// Print the free list to stdout as `Free(a)->Free(b)->...`.
    ///
    /// Convenience wrapper over the [`Display`](std::fmt::Display) impl
    /// of [`FreeList`].
    pub fn print_free_list(&self) {
        println!("{}", self.free_list());
    }

    /// Point `prev`'s link (or the list head) at `to`.
    fn relink(&mut self, prev: Option<u32>, to: Option<u32>) {
        match prev {
            Some(p) => FreeNode::set_next(&mut self.arena, p, to),
            None => self.head = to,
        }
    }

    /// Validate that `allocation` still names a live block of this heap.
    fn check_live(&self, allocation: &Allocation) {
        let header_offset = allocation.offset() - HEADER_SIZE;
        let header = BlockHeader::read(&self.arena, header_offset);
        assert!(
            header.is_allocated() && header.size == allocation.size(),
            "allocation handle does not match a live block at offset {header_offset}",
        );
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a heap's accounting counters, as returned by
/// [`Heap::stats`].
///
/// All byte quantities satisfy `capacity == used + available +
/// free_nodes * HEADER_SIZE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapStats {
    /// Configured arena capacity in bytes.
    pub capacity: usize,
    /// Total payload bytes across all free nodes.
    pub available: usize,
    /// Bytes consumed by live allocations, descriptors included.
    pub used: usize,
    /// Number of nodes on the free list.
    pub free_nodes: usize,
    /// Payload capacity of the largest free node.
    pub largest_free_block: usize,
}
