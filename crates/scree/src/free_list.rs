//! Free-list bookkeeping: first-fit search, address-ordered insertion,
//! and coalescing of physically adjacent blocks.
//!
//! The list lives inside the arena itself. Each free block starts with a
//! descriptor holding its payload size and the offset of the next free
//! block, and the nodes are chained in strictly increasing address
//! order. Keeping the order tied to addresses is what
//! makes coalescing a local operation: after inserting a returned block,
//! only the insertion neighbourhood can contain adjacent pairs, and one
//! forward walk heals them all.
//!
//! Between heap operations the list holds two invariants: offsets are
//! strictly increasing along the chain, and no two nodes are physically
//! adjacent (any pair that touches is merged before the operation
//! returns).

use std::fmt;

use crate::arena::Arena;
use crate::block::{FreeNode, HEADER_SIZE};

/// Result of a successful first-fit search.
pub(crate) struct Fit {
    /// Offset of the node linking to the found one, `None` when the found
    /// node is the list head.
    pub prev: Option<u32>,
    /// Offset of the found node's descriptor.
    pub offset: u32,
    /// Decoded descriptor of the found node.
    pub node: FreeNode,
}

/// Walk the list from `head` and return the first node whose payload can
/// hold `request` bytes, along with its predecessor.
///
/// Does not mutate the arena. Returns `None` when no node is large
/// enough.
pub(crate) fn find_fit(arena: &Arena, head: Option<u32>, request: u32) -> Option<Fit> {
    let mut prev = None;
    let mut cursor = head;
    while let Some(offset) = cursor {
        let node = FreeNode::read(arena, offset);
        if node.size >= request {
            return Some(Fit { prev, offset, node });
        }
        prev = Some(offset);
        cursor = node.next;
    }
    None
}

/// Write a free node of payload `size` at `offset` and link it into the
/// list at its address-ordered position.
///
/// Returns the offset of the new node's predecessor, or `None` when the
/// node became the new head. The caller passes the returned offset to
/// [`coalesce`] so the walk also covers the predecessor-to-new-node seam.
pub(crate) fn insert(
    arena: &mut Arena,
    head: &mut Option<u32>,
    offset: u32,
    size: u32,
) -> Option<u32> {
    let mut prev = None;
    let mut cursor = *head;
    while let Some(at) = cursor {
        if at > offset {
            break;
        }
        prev = Some(at);
        cursor = FreeNode::read(arena, at).next;
    }
    FreeNode { size, next: cursor }.write(arena, offset);
    match prev {
        Some(p) => FreeNode::set_next(arena, p, Some(offset)),
        None => *head = Some(offset),
    }
    prev
}

/// Merge physically adjacent free blocks, walking forward from `from`.
///
/// When a node ends exactly where its successor's descriptor begins, the
/// successor is absorbed: the node's payload grows by the successor's
/// descriptor plus payload, and the walk stays on the grown node because
/// it may now touch the next one as well. Non-adjacent pairs advance the
/// walk. Terminates at the end of the list.
pub(crate) fn coalesce(arena: &mut Arena, from: u32) {
    let mut offset = from;
    loop {
        let node = FreeNode::read(arena, offset);
        let Some(next_offset) = node.next else { break };
        if node.end(offset) == next_offset {
            let next = FreeNode::read(arena, next_offset);
            FreeNode {
                size: node.size + HEADER_SIZE + next.size,
                next: next.next,
            }
            .write(arena, offset);
        } else {
            offset = next_offset;
        }
    }
}

/// One node of a heap's free list, as reported by [`FreeList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeBlock {
    /// Byte offset of the block's descriptor within the arena.
    pub offset: u32,
    /// Payload capacity in bytes (the descriptor itself is excluded).
    pub size: u32,
    /// Offset of the next free block's descriptor, `None` at the tail.
    pub next: Option<u32>,
}

/// Immutable walk over a heap's free list, in address order.
///
/// Obtained from [`Heap::free_list`](crate::Heap::free_list). The iterator
/// yields one [`FreeBlock`] per node. Its [`Display`](fmt::Display)
/// rendering joins the payload sizes as `Free(a)->Free(b)`, and an empty
/// list renders as the empty string.
#[derive(Clone)]
pub struct FreeList<'a> {
    arena: &'a Arena,
    cursor: Option<u32>,
}

impl<'a> FreeList<'a> {
    pub(crate) fn new(arena: &'a Arena, head: Option<u32>) -> Self {
        Self { arena, cursor: head }
    }
}

impl Iterator for FreeList<'_> {
    type Item = FreeBlock;

    fn next(&mut self) -> Option<FreeBlock> {
        let offset = self.cursor?;
        let node = FreeNode::read(self.arena, offset);
        self.cursor = node.next;
        Some(FreeBlock {
            offset,
            size: node.size,
            next: node.next,
        })
    }
}

impl fmt::Display for FreeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for block in self.clone() {
            if !first {
                f.write_str("->")?;
            }
            write!(f, "Free({})", block.size)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-build a list by writing descriptors straight into an arena.
    fn arena_with_nodes(capacity: u32, nodes: &[(u32, u32, Option<u32>)]) -> Arena {
        let mut arena = Arena::new(capacity);
        for &(offset, size, next) in nodes {
            FreeNode { size, next }.write(&mut arena, offset);
        }
        arena
    }

    #[test]
    fn first_fit_takes_the_first_node_that_is_large_enough() {
        let arena = arena_with_nodes(
            512,
            &[(0, 8, Some(100)), (100, 50, Some(200)), (200, 300, None)],
        );
        let fit = find_fit(&arena, Some(0), 40).unwrap();
        assert_eq!(fit.offset, 100);
        assert_eq!(fit.prev, Some(0));
        assert_eq!(fit.node.size, 50);
    }

    #[test]
    fn exact_size_node_fits() {
        let arena = arena_with_nodes(512, &[(0, 8, Some(100)), (100, 50, None)]);
        let fit = find_fit(&arena, Some(0), 50).unwrap();
        assert_eq!(fit.offset, 100);
    }

    #[test]
    fn head_fit_has_no_predecessor() {
        let arena = arena_with_nodes(512, &[(0, 64, None)]);
        let fit = find_fit(&arena, Some(0), 4).unwrap();
        assert_eq!(fit.offset, 0);
        assert_eq!(fit.prev, None);
    }

    #[test]
    fn search_with_no_candidate_returns_none() {
        let arena = arena_with_nodes(512, &[(0, 8, Some(100)), (100, 50, None)]);
        assert!(find_fit(&arena, Some(0), 1000).is_none());
    }

    #[test]
    fn search_of_empty_list_returns_none() {
        let arena = Arena::new(64);
        assert!(find_fit(&arena, None, 0).is_none());
    }

    #[test]
    fn insert_into_empty_list_becomes_head() {
        let mut arena = Arena::new(128);
        let mut head = None;
        let prev = insert(&mut arena, &mut head, 40, 16);
        assert_eq!(prev, None);
        assert_eq!(head, Some(40));
        assert_eq!(FreeNode::read(&arena, 40), FreeNode { size: 16, next: None });
    }

    #[test]
    fn insert_below_head_replaces_head() {
        let mut arena = arena_with_nodes(256, &[(100, 32, None)]);
        let mut head = Some(100);
        let prev = insert(&mut arena, &mut head, 40, 16);
        assert_eq!(prev, None);
        assert_eq!(head, Some(40));
        assert_eq!(FreeNode::read(&arena, 40).next, Some(100));
    }

    #[test]
    fn insert_between_nodes_keeps_address_order() {
        let mut arena = arena_with_nodes(512, &[(0, 8, Some(200)), (200, 32, None)]);
        let mut head = Some(0);
        let prev = insert(&mut arena, &mut head, 100, 16);
        assert_eq!(prev, Some(0));
        assert_eq!(head, Some(0));
        assert_eq!(FreeNode::read(&arena, 0).next, Some(100));
        assert_eq!(FreeNode::read(&arena, 100).next, Some(200));
    }

    #[test]
    fn insert_past_the_tail_links_the_last_node() {
        let mut arena = arena_with_nodes(256, &[(0, 8, None)]);
        let mut head = Some(0);
        let prev = insert(&mut arena, &mut head, 50, 16);
        assert_eq!(prev, Some(0));
        assert_eq!(FreeNode::read(&arena, 0).next, Some(50));
        assert_eq!(FreeNode::read(&arena, 50).next, None);
    }

    #[test]
    fn coalesce_merges_an_adjacent_pair() {
        // Node at 0 spans bytes 0..16, so a node at 16 touches it.
        let mut arena = arena_with_nodes(128, &[(0, 8, Some(16)), (16, 24, None)]);
        coalesce(&mut arena, 0);
        assert_eq!(
            FreeNode::read(&arena, 0),
            FreeNode { size: 8 + HEADER_SIZE + 24, next: None }
        );
    }

    #[test]
    fn coalesce_absorbs_a_chain_without_advancing() {
        // Three mutually adjacent nodes collapse into one.
        let mut arena = arena_with_nodes(
            128,
            &[(0, 8, Some(16)), (16, 8, Some(32)), (32, 40, None)],
        );
        coalesce(&mut arena, 0);
        assert_eq!(FreeNode::read(&arena, 0), FreeNode { size: 72, next: None });
    }

    #[test]
    fn coalesce_leaves_separated_nodes_alone() {
        // Bytes 16..24 belong to some allocated block, so the nodes at 0
        // and 24 must stay distinct.
        let mut arena = arena_with_nodes(128, &[(0, 8, Some(24)), (24, 16, None)]);
        coalesce(&mut arena, 0);
        assert_eq!(FreeNode::read(&arena, 0), FreeNode { size: 8, next: Some(24) });
        assert_eq!(FreeNode::read(&arena, 24), FreeNode { size: 16, next: None });
    }

    #[test]
    fn coalesce_merges_across_a_gap_later_in_the_walk() {
        // First pair is separated, second pair touches.
        let mut arena = arena_with_nodes(
            256,
            &[(0, 8, Some(100)), (100, 8, Some(116)), (116, 8, None)],
        );
        coalesce(&mut arena, 0);
        assert_eq!(FreeNode::read(&arena, 0).next, Some(100));
        assert_eq!(FreeNode::read(&arena, 100), FreeNode { size: 24, next: None });
    }

    #[test]
    fn iterator_yields_nodes_in_address_order() {
        let arena = arena_with_nodes(
            512,
            &[(0, 8, Some(100)), (100, 50, Some(200)), (200, 300, None)],
        );
        let blocks: Vec<FreeBlock> = FreeList::new(&arena, Some(0)).collect();
        assert_eq!(
            blocks,
            vec![
                FreeBlock { offset: 0, size: 8, next: Some(100) },
                FreeBlock { offset: 100, size: 50, next: Some(200) },
                FreeBlock { offset: 200, size: 300, next: None },
            ]
        );
    }

    #[test]
    fn display_joins_sizes_with_arrows() {
        let arena = arena_with_nodes(512, &[(0, 100, Some(200)), (200, 50, None)]);
        let list = FreeList::new(&arena, Some(0));
        assert_eq!(list.to_string(), "Free(100)->Free(50)");
    }

    #[test]
    fn display_of_single_node_has_no_arrow() {
        let arena = arena_with_nodes(128, &[(0, 56, None)]);
        assert_eq!(FreeList::new(&arena, Some(0)).to_string(), "Free(56)");
    }

    #[test]
    fn display_of_empty_list_is_empty() {
        let arena = Arena::new(64);
        assert_eq!(FreeList::new(&arena, None).to_string(), "");
    }
}
