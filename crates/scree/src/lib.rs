//! First-fit free-list heap allocation over a fixed-size arena.
//!
//! A [`Heap`] owns a byte arena of fixed capacity and carves it into
//! blocks on demand. Block descriptors live inside the arena itself and
//! link free blocks into an address-ordered list; allocation takes the
//! first node large enough, release merges a returned block with any
//! physically adjacent free neighbours. The whole crate is offset-based
//! and contains no `unsafe`: descriptors are read and written through
//! bounds-checked views of the owned buffer, never through raw pointers.
//!
//! # Architecture
//!
//! ```text
//! Heap (allocate / release / payload access / diagnostics)
//! ├── Arena (owned, zero-initialised byte buffer; u32 offsets)
//! ├── free_list (first-fit search, address-ordered insert, coalesce)
//! └── block (FreeNode / BlockHeader descriptors, 8 bytes each)
//! ```
//!
//! Each block spends [`HEADER_SIZE`] bytes on its descriptor. Free
//! blocks store their payload size and the offset of the next free
//! block; allocated blocks store their payload size and the [`BLOCK_TAG`]
//! sentinel, which release validates before trusting the descriptor.
//!
//! # Handles
//!
//! [`Heap::allocate`] returns an [`Allocation`] handle rather than a
//! pointer. The handle is consumed by [`Heap::release`], so double
//! release does not compile, and payload access through
//! [`Heap::payload`]/[`Heap::payload_mut`] re-validates the handle
//! against the descriptor on every call.
//!
//! # Whole-block grants
//!
//! Splitting a free block requires the surplus to hold a descriptor of
//! its own. When it cannot (surplus below [`HEADER_SIZE`]), the whole
//! block is granted and [`Allocation::size`] reports the larger size.
//! See [`Heap::allocate`] for the exact policy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod arena;
mod block;
pub mod config;
pub mod error;
pub mod free_list;
pub mod handle;
pub mod heap;

// Public re-exports for the primary API surface.
pub use block::{BLOCK_TAG, HEADER_SIZE};
pub use config::HeapConfig;
pub use error::AllocError;
pub use free_list::{FreeBlock, FreeList};
pub use handle::Allocation;
pub use heap::{Heap, HeapStats};
