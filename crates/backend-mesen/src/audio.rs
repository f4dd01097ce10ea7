use audio_bridge::SampleRing;

use crate::engine::AudioProvider;

/// Stereo frames collected per frame. Anything past this is dropped.
pub const COLLECT_FRAMES: usize = 8192;

/// Mixer output rate.
pub const SAMPLE_RATE: u32 = 48_000;

/// Gathers mixed audio until the next drain.
#[derive(Debug)]
pub struct AudioCollector {
    ring: SampleRing,
}

impl AudioCollector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ring: SampleRing::new(COLLECT_FRAMES),
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    /// Copy out what was collected and start over. Returns stereo frames.
    pub fn drain_into(&mut self, out: &mut [i16]) -> usize {
        self.ring.drain_into(out)
    }
}

impl Default for AudioCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioProvider for AudioCollector {
    fn mix_audio(&mut self, samples: &[i16], _sample_rate: u32) {
        self.ring.extend_interleaved(samples);
    }
}
