//! In-arena block encoding.
//!
//! Every block in the arena, free or allocated, starts with an 8-byte
//! header of two little-endian `u32` words:
//!
//! ```text
//! free block:       [ size | next ] payload...   (next: offset or NIL)
//! allocated block:  [ size | tag  ] payload...   (tag: BLOCK_TAG)
//! ```
//!
//! `size` counts payload bytes only; a block's physical footprint is
//! `HEADER_SIZE + size`. The two layouts overlap deliberately: releasing
//! an allocated block rewrites its header word-for-word into a free
//! descriptor, and splitting a free block rewrites its descriptor into an
//! allocated header. [`FreeNode`] and [`BlockHeader`] are decoded views;
//! the arena bytes remain the single source of truth.

use crate::arena::Arena;

/// Byte overhead of a block header, identical for free and allocated
/// blocks. Also the only alignment the allocator guarantees.
pub const HEADER_SIZE: u32 = 8;

/// Tag written into the second header word of every allocated block.
///
/// `release` and the payload accessors validate this sentinel before
/// trusting a block; a mismatch means the handle is stale (the heap was
/// reset) or belongs to a different heap, and is treated as fatal
/// corruption.
pub const BLOCK_TAG: u32 = 0x0123_4567;

/// Free-list terminator stored in a descriptor's `next` word.
///
/// `u32::MAX` can never be a block offset because heap capacities are
/// required to be strictly smaller.
const NIL: u32 = u32::MAX;

/// Decoded view of a free-block descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FreeNode {
    /// Free payload bytes following the descriptor.
    pub size: u32,
    /// Offset of the next free descriptor in list order, if any.
    pub next: Option<u32>,
}

impl FreeNode {
    /// Decode the descriptor at `offset`.
    pub(crate) fn read(arena: &Arena, offset: u32) -> Self {
        let size = arena.read_u32(offset);
        let next = match arena.read_u32(offset + 4) {
            NIL => None,
            link => Some(link),
        };
        Self { size, next }
    }

    /// Encode this descriptor at `offset`, overwriting whatever header
    /// was there.
    pub(crate) fn write(&self, arena: &mut Arena, offset: u32) {
        arena.write_u32(offset, self.size);
        arena.write_u32(offset + 4, self.next.unwrap_or(NIL));
    }

    /// Patch only the `next` link of the descriptor at `offset`.
    pub(crate) fn set_next(arena: &mut Arena, offset: u32, next: Option<u32>) {
        arena.write_u32(offset + 4, next.unwrap_or(NIL));
    }

    /// One past the last byte of this block's physical footprint.
    ///
    /// Two free blocks are physically adjacent, and therefore mergeable,
    /// exactly when one's `end` equals the other's offset.
    pub(crate) fn end(&self, offset: u32) -> u32 {
        offset + HEADER_SIZE + self.size
    }
}

/// Decoded view of an allocated-block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    /// Granted payload bytes following the header.
    pub size: u32,
    /// Sentinel word; [`BLOCK_TAG`] for a valid allocated block.
    pub tag: u32,
}

impl BlockHeader {
    /// Decode the header at `offset`.
    pub(crate) fn read(arena: &Arena, offset: u32) -> Self {
        Self {
            size: arena.read_u32(offset),
            tag: arena.read_u32(offset + 4),
        }
    }

    /// Encode this header at `offset`, overwriting the free descriptor
    /// that occupied the block.
    pub(crate) fn write(&self, arena: &mut Arena, offset: u32) {
        arena.write_u32(offset, self.size);
        arena.write_u32(offset + 4, self.tag);
    }

    /// Whether the tag word carries the allocated-block sentinel.
    pub(crate) fn is_allocated(&self) -> bool {
        self.tag == BLOCK_TAG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_node_read_back() {
        let mut arena = Arena::new(64);
        FreeNode {
            size: 24,
            next: Some(40),
        }
        .write(&mut arena, 0);
        let node = FreeNode::read(&arena, 0);
        assert_eq!(node.size, 24);
        assert_eq!(node.next, Some(40));
        assert_eq!(node.end(0), HEADER_SIZE + 24);
    }

    #[test]
    fn nil_link_decodes_to_none() {
        let mut arena = Arena::new(16);
        FreeNode {
            size: 8,
            next: None,
        }
        .write(&mut arena, 0);
        assert_eq!(arena.read_u32(4), u32::MAX);
        assert_eq!(FreeNode::read(&arena, 0).next, None);
    }

    #[test]
    fn set_next_leaves_size_untouched() {
        let mut arena = Arena::new(16);
        FreeNode {
            size: 5,
            next: None,
        }
        .write(&mut arena, 0);
        FreeNode::set_next(&mut arena, 0, Some(8));
        let node = FreeNode::read(&arena, 0);
        assert_eq!(node.size, 5);
        assert_eq!(node.next, Some(8));
    }

    #[test]
    fn header_overwrites_descriptor_in_place() {
        let mut arena = Arena::new(32);
        FreeNode {
            size: 24,
            next: None,
        }
        .write(&mut arena, 0);
        BlockHeader {
            size: 24,
            tag: BLOCK_TAG,
        }
        .write(&mut arena, 0);
        let header = BlockHeader::read(&arena, 0);
        assert!(header.is_allocated());
        assert_eq!(header.size, 24);
    }

    #[test]
    fn freed_block_never_looks_allocated() {
        // After release, the tag word holds a next link: either NIL or a
        // block offset, both of which differ from BLOCK_TAG as long as the
        // capacity stays below the tag value. The default capacities do.
        let mut arena = Arena::new(32);
        FreeNode {
            size: 24,
            next: Some(16),
        }
        .write(&mut arena, 0);
        assert!(!BlockHeader::read(&arena, 0).is_allocated());
        FreeNode::set_next(&mut arena, 0, None);
        assert!(!BlockHeader::read(&arena, 0).is_allocated());
    }
}
