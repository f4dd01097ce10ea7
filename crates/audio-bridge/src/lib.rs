//! Audio rate bridging.
//!
//! Backends emit audio at their own internal tick rate. The host wants one
//! bounded batch of interleaved stereo `i16` samples per frame, drained on
//! read. Two strategies are provided:
//!
//! - [`QuotientBridge`]: each native tick is repeated `output / native`
//!   times into a fixed ring. Once the ring is full, trailing samples are
//!   dropped without error.
//! - [`BankedResampler`]: native ticks are resampled into one bank per
//!   channel. Each read returns at most a fixed ceiling of frames and
//!   discards whatever is left over.
//!
//! Both hand out exactly the frames produced since the previous read, in
//! order, left then right.

mod banked;
mod quotient;
mod ring;

pub use banked::BankedResampler;
pub use quotient::QuotientBridge;
pub use ring::SampleRing;

use bytemuck::{Pod, Zeroable};

/// One stereo sample pair.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct StereoFrame {
    pub left: i16,
    pub right: i16,
}

impl StereoFrame {
    #[must_use]
    pub const fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }
}

/// View interleaved `i16` samples as stereo frames. A trailing odd sample
/// is ignored.
#[must_use]
pub fn frames_of(interleaved: &[i16]) -> &[StereoFrame] {
    let even = interleaved.len() & !1;
    bytemuck::cast_slice(&interleaved[..even])
}

/// Mutable counterpart of [`frames_of`].
pub fn frames_of_mut(interleaved: &mut [i16]) -> &mut [StereoFrame] {
    let even = interleaved.len() & !1;
    bytemuck::cast_slice_mut(&mut interleaved[..even])
}
