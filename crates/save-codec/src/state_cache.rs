//! One-shot snapshot cache.
//!
//! `state length` serializes the engine and parks the blob here; `save
//! state` copies it out and empties the cache. A new length query always
//! replaces whatever was parked before.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    #[error("no state prepared; query the state length first")]
    NotPrepared,
    #[error("state needs {needed} bytes but the buffer holds {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// `Empty` until a snapshot is prepared, `Ready` until it is fetched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum StateCache {
    #[default]
    Empty,
    Ready(Vec<u8>),
}

impl StateCache {
    /// Drop any parked snapshot.
    pub fn invalidate(&mut self) {
        if matches!(self, Self::Ready(_)) {
            debug!("discarding unfetched state snapshot");
        }
        *self = Self::Empty;
    }

    /// Park a freshly serialized snapshot and return its length.
    pub fn store(&mut self, blob: Vec<u8>) -> usize {
        let len = blob.len();
        *self = Self::Ready(blob);
        len
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Length of the parked snapshot, or 0 when empty.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Ready(blob) => blob.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the parked snapshot into `dest` and empty the cache.
    ///
    /// A buffer that is too small leaves the snapshot parked.
    pub fn take_into(&mut self, dest: &mut [u8]) -> Result<usize, CacheError> {
        let Self::Ready(blob) = self else {
            return Err(CacheError::NotPrepared);
        };
        if dest.len() < blob.len() {
            return Err(CacheError::BufferTooSmall {
                needed: blob.len(),
                available: dest.len(),
            });
        }
        let len = blob.len();
        dest[..len].copy_from_slice(blob);
        *self = Self::Empty;
        Ok(len)
    }
}
