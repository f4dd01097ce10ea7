//! Integer-repeat upsampling into a fixed ring.

use crate::{SampleRing, StereoFrame};

/// Repeats each native tick `output_rate / native_rate` times.
///
/// The output rate is fixed at construction; the native rate may change at
/// any time (the engine announces it) and the repeat count is recomputed.
#[derive(Debug, Clone)]
pub struct QuotientBridge {
    output_rate: u32,
    quotient: u32,
    ring: SampleRing,
}

impl QuotientBridge {
    /// `capacity` is the ring size in frames.
    #[must_use]
    pub fn new(output_rate: u32, native_rate: u32, capacity: usize) -> Self {
        let mut bridge = Self {
            output_rate,
            quotient: 0,
            ring: SampleRing::new(capacity),
        };
        bridge.rate_changed(native_rate);
        bridge
    }

    #[must_use]
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Current repeat count per native tick.
    #[must_use]
    pub fn quotient(&self) -> u32 {
        self.quotient
    }

    /// The engine switched to a new native rate.
    ///
    /// A zero rate produces no output until the next change.
    pub fn rate_changed(&mut self, native_rate: u32) {
        self.quotient = self.output_rate.checked_div(native_rate).unwrap_or(0);
    }

    /// One native tick.
    pub fn post(&mut self, left: i16, right: i16) {
        let frame = StereoFrame::new(left, right);
        for _ in 0..self.quotient {
            if !self.ring.push(frame) {
                break;
            }
        }
    }

    /// Frames collected since the last drain.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    /// Hand out everything collected as interleaved samples.
    pub fn drain_into(&mut self, out: &mut [i16]) -> usize {
        self.ring.drain_into(out)
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }
}
