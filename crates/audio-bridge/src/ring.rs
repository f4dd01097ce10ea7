//! Fixed-capacity frame collector.

use crate::{StereoFrame, frames_of, frames_of_mut};

/// Collects stereo frames up to a fixed capacity; the excess is dropped.
///
/// The backing storage is allocated once, so pushing never allocates.
#[derive(Debug, Clone)]
pub struct SampleRing {
    frames: Vec<StereoFrame>,
    capacity: usize,
}

impl SampleRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of frames held between drains.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    /// Append one frame. Returns `false` (and drops it) when full.
    pub fn push(&mut self, frame: StereoFrame) -> bool {
        if self.is_full() {
            return false;
        }
        self.frames.push(frame);
        true
    }

    /// Append interleaved samples, truncating at capacity.
    ///
    /// Returns the number of frames accepted.
    pub fn extend_interleaved(&mut self, interleaved: &[i16]) -> usize {
        let room = self.capacity - self.frames.len();
        let incoming = frames_of(interleaved);
        let accepted = incoming.len().min(room);
        self.frames.extend_from_slice(&incoming[..accepted]);
        accepted
    }

    /// Copy everything collected into `out` as interleaved samples and
    /// empty the ring.
    ///
    /// Returns the number of frames written. Frames that do not fit in
    /// `out` are discarded.
    pub fn drain_into(&mut self, out: &mut [i16]) -> usize {
        let out = frames_of_mut(out);
        let count = self.frames.len().min(out.len());
        out[..count].copy_from_slice(&self.frames[..count]);
        self.frames.clear();
        count
    }

    /// Discard everything collected.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
