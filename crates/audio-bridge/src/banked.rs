//! Box-filter resampling into per-channel banks.

use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer};

use crate::{StereoFrame, frames_of_mut};

/// Resamples a held-value input signal into one ring per channel.
///
/// Input is described as a sequence of levels, each held for some number
/// of input clocks. Every output sample is the average level over the input
/// clocks it covers. When the output rate is higher than the input rate the
/// last value is repeated.
pub struct BankedResampler {
    left: HeapRb<i16>,
    right: HeapRb<i16>,
    input_rate: u64,
    output_rate: u64,
    /// Output-rate-scaled progress towards the next output sample.
    phase: u64,
    sum_left: i64,
    sum_right: i64,
    held: u64,
    last: StereoFrame,
}

impl BankedResampler {
    /// `capacity` is the size of each bank in samples.
    #[must_use]
    pub fn new(input_rate: u32, output_rate: u32, capacity: usize) -> Self {
        let mut resampler = Self {
            left: HeapRb::new(capacity.max(1)),
            right: HeapRb::new(capacity.max(1)),
            input_rate: 1,
            output_rate: 1,
            phase: 0,
            sum_left: 0,
            sum_right: 0,
            held: 0,
            last: StereoFrame::default(),
        };
        resampler.set_rates(input_rate, output_rate);
        resampler
    }

    /// Change both rates. Zero rates are treated as 1.
    pub fn set_rates(&mut self, input_rate: u32, output_rate: u32) {
        self.input_rate = u64::from(input_rate.max(1));
        self.output_rate = u64::from(output_rate.max(1));
        self.phase = 0;
        self.sum_left = 0;
        self.sum_right = 0;
        self.held = 0;
    }

    #[must_use]
    pub fn output_rate(&self) -> u32 {
        self.output_rate as u32
    }

    /// One input clock at the given level.
    pub fn post(&mut self, left: i16, right: i16) {
        self.post_held(StereoFrame::new(left, right), 1);
    }

    /// A level held for `clocks` input clocks.
    pub fn post_held(&mut self, frame: StereoFrame, clocks: u32) {
        let mut remaining = u64::from(clocks);
        while remaining > 0 {
            let to_edge = (self.input_rate - self.phase).div_ceil(self.output_rate);
            let take = remaining.min(to_edge);
            self.sum_left += i64::from(frame.left) * take as i64;
            self.sum_right += i64::from(frame.right) * take as i64;
            self.held += take;
            self.phase += take * self.output_rate;
            remaining -= take;

            if self.phase >= self.input_rate {
                self.phase -= self.input_rate;
                let held = self.held as i64;
                self.last = StereoFrame::new(
                    (self.sum_left / held) as i16,
                    (self.sum_right / held) as i16,
                );
                self.sum_left = 0;
                self.sum_right = 0;
                self.held = 0;
                self.emit(self.last);
                while self.phase >= self.input_rate {
                    self.phase -= self.input_rate;
                    self.emit(self.last);
                }
            }
        }
    }

    fn emit(&mut self, frame: StereoFrame) {
        // A full bank drops the newest sample on both sides.
        if self.left.is_full() || self.right.is_full() {
            return;
        }
        let left = self.left.try_push(frame.left);
        let right = self.right.try_push(frame.right);
        debug_assert!(left.is_ok() && right.is_ok(), "bank full after capacity check");
    }

    /// Output frames ready to be read.
    #[must_use]
    pub fn available(&self) -> usize {
        self.left.occupied_len().min(self.right.occupied_len())
    }

    /// Read up to `ceiling` frames into `out` as interleaved samples.
    ///
    /// Anything beyond what was read is discarded, so each read starts
    /// from an empty bank.
    pub fn read(&mut self, out: &mut [i16], ceiling: usize) -> usize {
        let out = frames_of_mut(out);
        let count = self.available().min(ceiling).min(out.len());
        for slot in &mut out[..count] {
            slot.left = self.left.try_pop().unwrap_or_default();
            slot.right = self.right.try_pop().unwrap_or_default();
        }
        self.left.clear();
        self.right.clear();
        count
    }

    /// Drop everything buffered, including partially integrated input.
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.phase = 0;
        self.sum_left = 0;
        self.sum_right = 0;
        self.held = 0;
    }
}

impl std::fmt::Debug for BankedResampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankedResampler")
            .field("input_rate", &self.input_rate)
            .field("output_rate", &self.output_rate)
            .field("available", &self.available())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsamples_by_averaging() {
        let mut rs = BankedResampler::new(4, 1, 16);
        for level in [0, 4, 8, 12] {
            rs.post(level, -level);
        }
        assert_eq!(rs.available(), 1);
        let mut out = [0i16; 4];
        assert_eq!(rs.read(&mut out, 16), 1);
        assert_eq!(&out[..2], &[6, -6]);
    }

    #[test]
    fn held_levels_match_per_clock_posts() {
        let mut a = BankedResampler::new(16_777_216, 32_768, 2048);
        let mut b = BankedResampler::new(16_777_216, 32_768, 2048);
        a.post_held(StereoFrame::new(100, 200), 512 * 3);
        for _ in 0..512 * 3 {
            b.post(100, 200);
        }
        let mut out_a = [0i16; 16];
        let mut out_b = [0i16; 16];
        assert_eq!(a.read(&mut out_a, 1024), 3);
        assert_eq!(b.read(&mut out_b, 1024), 3);
        assert_eq!(out_a, out_b);
        assert_eq!(&out_a[..6], &[100, 200, 100, 200, 100, 200]);
    }

    #[test]
    fn upsampling_repeats_last_value() {
        let mut rs = BankedResampler::new(1, 3, 16);
        rs.post(7, 8);
        assert_eq!(rs.available(), 3);
        let mut out = [0i16; 6];
        rs.read(&mut out, 16);
        assert_eq!(out, [7, 8, 7, 8, 7, 8]);
    }

    #[test]
    fn read_is_capped_and_excess_discarded() {
        let mut rs = BankedResampler::new(1, 1, 4096);
        rs.post_held(StereoFrame::new(1, 1), 1500);
        assert_eq!(rs.available(), 1500);

        let mut out = vec![0i16; 2048];
        assert_eq!(rs.read(&mut out, 1024), 1024);
        assert_eq!(rs.available(), 0);
    }

    #[test]
    fn full_bank_drops_newest() {
        let mut rs = BankedResampler::new(1, 1, 2);
        rs.post(1, 1);
        rs.post(2, 2);
        rs.post(3, 3);
        let mut out = [0i16; 8];
        assert_eq!(rs.read(&mut out, 8), 2);
        assert_eq!(&out[..4], &[1, 1, 2, 2]);
    }
}
