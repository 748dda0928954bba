//! Allocator error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during heap operations.
///
/// Only allocation failure is reported through this type. Corruption
/// (a release or payload access whose block header fails the tag check)
/// is fatal and panics instead: the free-list structure may already be
/// compromised, so continuing would risk further damage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// No free block can satisfy the request. The arena is never grown;
    /// the caller may release other allocations and retry.
    OutOfMemory {
        /// Number of payload bytes requested.
        requested: usize,
        /// Total free payload bytes at the time of the request. Note this
        /// may exceed `requested` when the free memory is fragmented
        /// across blocks that are each individually too small.
        available: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                available,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, {available} bytes free"
                )
            }
        }
    }
}

impl Error for AllocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_display_names_both_sizes() {
        let err = AllocError::OutOfMemory {
            requested: 512,
            available: 96,
        };
        assert_eq!(
            err.to_string(),
            "out of memory: requested 512 bytes, 96 bytes free"
        );
    }
}
