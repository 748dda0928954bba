//! Benchmark workloads and utilities for the scree allocator.
//!
//! Provides deterministic workload builders shared by the criterion
//! benches:
//!
//! - [`churn`]: seeded allocate/release mix against a live set
//! - [`fragmented_heap`]: heap pre-carved into pinned-apart holes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scree::{Allocation, Heap};

/// Drive `steps` random allocate/release operations against `heap`.
///
/// Each step flips a coin: allocate a uniform request in
/// `0..max_request`, or release a random live block. Failed allocations
/// are skipped, so the workload keeps running near exhaustion. Returns
/// the handles still live at the end.
pub fn churn(heap: &mut Heap, seed: u64, steps: usize, max_request: u32) -> Vec<Allocation> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut live = Vec::new();
    for _ in 0..steps {
        if live.is_empty() || rng.random::<bool>() {
            if let Ok(block) = heap.allocate(rng.random_range(0..max_request)) {
                live.push(block);
            }
        } else {
            let slot = rng.random_range(0..live.len());
            heap.release(live.swap_remove(slot));
        }
    }
    live
}

/// Build a heap of `capacity` bytes whose free list holds `holes` gaps of
/// `hole_size` payload bytes each, plus the trailing remainder.
///
/// Gaps alternate with live allocations of the same size, so the
/// returned handles pin the gaps apart and the free list keeps exactly
/// `holes + 1` nodes. Useful for benchmarking free-list scans at a known
/// length. The capacity must be large enough for `2 * holes` blocks of
/// `hole_size` bytes.
pub fn fragmented_heap(capacity: u32, holes: usize, hole_size: u32) -> (Heap, Vec<Allocation>) {
    let mut heap = Heap::with_capacity(capacity);
    let mut gaps = Vec::with_capacity(holes);
    let mut pins = Vec::with_capacity(holes);
    for _ in 0..holes {
        gaps.push(heap.allocate(hole_size).unwrap());
        pins.push(heap.allocate(hole_size).unwrap());
    }
    for gap in gaps {
        heap.release(gap);
    }
    (heap, pins)
}
