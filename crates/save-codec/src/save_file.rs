//! Memory-backed save file.

use crate::{CodecError, try_alloc};

/// A fixed-capacity file over an owned buffer.
///
/// The visible size starts at the full capacity and can be truncated or
/// grown back up to it, but never past it. `write_at` never extends the file:
/// anything past the current size is dropped. Growing the file exposes
/// whatever the backing buffer already held.
#[derive(Clone, PartialEq, Eq)]
pub struct SaveFile {
    backing: Vec<u8>,
    size: usize,
}

impl SaveFile {
    /// A file of `capacity` bytes, every byte set to `fill`.
    pub fn blank(capacity: usize, fill: u8) -> Result<Self, CodecError> {
        Ok(Self {
            backing: try_alloc(capacity, fill)?,
            size: capacity,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.backing.len()
    }

    /// Current visible size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Set the visible size, clamped to capacity.
    pub fn truncate(&mut self, size: usize) {
        self.size = size.min(self.backing.len());
    }

    /// The visible contents.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.backing[..self.size]
    }

    /// Copy bytes starting at `offset` into `dest`. Returns the count copied.
    pub fn read_at(&self, offset: usize, dest: &mut [u8]) -> usize {
        let Some(available) = self.size.checked_sub(offset) else {
            return 0;
        };
        let count = available.min(dest.len());
        dest[..count].copy_from_slice(&self.backing[offset..offset + count]);
        count
    }

    /// Overwrite bytes starting at `offset`, stopping at the visible size.
    /// Returns the count written.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> usize {
        let Some(available) = self.size.checked_sub(offset) else {
            return 0;
        };
        let count = available.min(data.len());
        self.backing[offset..offset + count].copy_from_slice(&data[..count]);
        count
    }

    /// Replace the file contents from offset 0 with a whole save image.
    ///
    /// Unlike [`write_at`](Self::write_at) this is bounded by the capacity,
    /// not the visible size, and grows the file to cover what was written.
    /// Returns the count written.
    pub fn load_image(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.backing.len());
        self.backing[..count].copy_from_slice(&data[..count]);
        self.size = self.size.max(count);
        count
    }

    /// The whole backing buffer, regardless of visible size.
    #[must_use]
    pub fn backing(&self) -> &[u8] {
        &self.backing
    }

    /// Mutable view of the whole backing buffer.
    ///
    /// Its address is stable for the file's lifetime, so it can be exported
    /// to a host that maps memory directly.
    pub fn backing_mut(&mut self) -> &mut [u8] {
        &mut self.backing
    }
}

impl std::fmt::Debug for SaveFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveFile")
            .field("capacity", &self.backing.len())
            .field("size", &self.size)
            .finish()
    }
}
