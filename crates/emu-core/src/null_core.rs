//! Placeholder core used when no ROM is loaded.

use color_lut::ColorLut;
use mem_export::MemoryRegion;

use crate::{
    AudioConfig, Buttons, CoreError, CoreOptions, EmuCore, FrameOutput, MasterClock, StateError,
    VideoConfig,
};

const NULL_RATE: u32 = 48_000;
const NULL_FRAMES: usize = (NULL_RATE / 60) as usize;

/// Emits silence and no video. Every save operation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCore;

impl EmuCore for NullCore {
    const NAME: &'static str = "null";
    const BIOS_LEN: usize = 0;

    fn create(_rom: &[u8], _bios: &[u8], _options: &CoreOptions) -> Result<Self, CoreError> {
        Ok(Self)
    }

    fn video_config(&self) -> VideoConfig {
        VideoConfig {
            width: 0,
            height: 0,
        }
    }

    fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: NULL_RATE,
            max_frames: NULL_FRAMES,
        }
    }

    fn clock(&self) -> MasterClock {
        MasterClock::new(NULL_RATE)
    }

    fn advance(&mut self, _buttons: Buttons, _video: &mut [u32], audio: &mut [i16]) -> FrameOutput {
        let samples = NULL_FRAMES.min(audio.len() / 2);
        audio[..samples * 2].fill(0);
        FrameOutput {
            samples,
            cpu_cycles: NULL_FRAMES as u32,
        }
    }

    fn reset(&mut self) {}

    fn set_color_lut(&mut self, _lut: &ColorLut) {}

    fn save_data_len(&mut self) -> usize {
        0
    }

    fn save_data(&mut self, _dest: &mut [u8]) -> usize {
        0
    }

    fn load_save_data(&mut self, _data: &[u8], _rtc_fallback: i64) {}

    fn save_state_len(&mut self) -> usize {
        0
    }

    fn prepared_state_len(&self) -> usize {
        0
    }

    fn save_state(&mut self, _dest: &mut [u8]) -> Result<usize, StateError> {
        Err(StateError::Unsupported)
    }

    fn load_state(&mut self, _data: &[u8], _rtc_fallback: i64) -> Result<(), StateError> {
        Err(StateError::Unsupported)
    }

    fn rtc_time(&self) -> i64 {
        0
    }

    fn memory_block(&mut self, _region: MemoryRegion) -> Option<&mut [u8]> {
        None
    }
}
