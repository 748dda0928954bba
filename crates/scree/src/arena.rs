//! The owned byte region backing a heap.
//!
//! [`Arena`] replaces the raw `mmap`-style memory of classic free-list
//! allocators with an owned, zero-initialised buffer. All block positions
//! are byte offsets into this buffer, and every descriptor or payload
//! access goes through the bounds-checked accessors here; there is no
//! pointer arithmetic anywhere in the crate.

/// A fixed-capacity byte region.
///
/// The arena is allocated to full capacity at construction and never
/// resized. The buffer is the single source of truth for block state:
/// free descriptors and allocated headers are encoded in place at block
/// offsets (see [`block`](crate::block)).
pub(crate) struct Arena {
    /// Backing storage. Zero-initialised at creation.
    bytes: Box<[u8]>,
}

impl Arena {
    /// Allocate a zeroed arena of `capacity` bytes.
    pub(crate) fn new(capacity: u32) -> Self {
        Self {
            bytes: vec![0u8; capacity as usize].into_boxed_slice(),
        }
    }

    /// Total capacity in bytes.
    pub(crate) fn capacity(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Read a little-endian `u32` at the given byte offset.
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the arena capacity.
    pub(crate) fn read_u32(&self, offset: u32) -> u32 {
        let start = offset as usize;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[start..start + 4]);
        u32::from_le_bytes(word)
    }

    /// Write a little-endian `u32` at the given byte offset.
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the arena capacity.
    pub(crate) fn write_u32(&mut self, offset: u32, value: u32) {
        let start = offset as usize;
        self.bytes[start..start + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Get a shared slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the arena capacity.
    pub(crate) fn slice(&self, offset: u32, len: u32) -> &[u8] {
        let start = offset as usize;
        let end = start + len as usize;
        &self.bytes[start..end]
    }

    /// Get a mutable slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the arena capacity.
    pub(crate) fn slice_mut(&mut self, offset: u32, len: u32) -> &mut [u8] {
        let start = offset as usize;
        let end = start + len as usize;
        &mut self.bytes[start..end]
    }
}
