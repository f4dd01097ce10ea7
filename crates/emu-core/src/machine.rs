//! The contract every backend core implements.
//!
//! A host drives a core exclusively through [`EmuCore`]: one [`advance`]
//! per frame, plus the save data, save state and memory queries. Backends
//! are interchangeable behind it, but their blobs are not; a state taken
//! from one core type is never loadable by another.
//!
//! [`advance`]: EmuCore::advance

use color_lut::ColorLut;
use mem_export::MemoryRegion;

use crate::{Buttons, CoreError, CoreOptions, MasterClock, StateError};

/// Video output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl VideoConfig {
    /// GBA LCD.
    pub const GBA: Self = Self {
        width: 240,
        height: 160,
    };

    /// Pixels in one frame.
    #[must_use]
    pub const fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Audio output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Most stereo frames a single `advance` can return.
    pub max_frames: usize,
}

impl AudioConfig {
    /// Interleaved `i16` slots the audio buffer must hold.
    #[must_use]
    pub const fn buffer_len(&self) -> usize {
        self.max_frames * 2
    }
}

/// What one call to [`EmuCore::advance`] produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutput {
    /// Stereo frames written to the audio buffer.
    pub samples: usize,
    /// Master clock cycles the frame took.
    pub cpu_cycles: u32,
}

/// A frame-stepped emulation core.
///
/// Length queries and fetches follow a two-call protocol: query, allocate
/// exactly that much, fetch.
pub trait EmuCore: Sized {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Bytes a BIOS image must have.
    const BIOS_LEN: usize = 0x4000;

    /// Build a core with ROM and BIOS loaded and a blank save.
    ///
    /// Per-title hardware overrides are applied before this returns.
    fn create(rom: &[u8], bios: &[u8], options: &CoreOptions) -> Result<Self, CoreError>;

    fn video_config(&self) -> VideoConfig;

    fn audio_config(&self) -> AudioConfig;

    /// Clock that `cpu_cycles` and the RTC are measured in.
    fn clock(&self) -> MasterClock;

    /// Run exactly one frame.
    ///
    /// `video` must hold [`VideoConfig::pixels`] entries and `audio`
    /// [`AudioConfig::buffer_len`] samples. Audio produced this frame is
    /// handed out in full and nothing carries over to the next call.
    fn advance(&mut self, buttons: Buttons, video: &mut [u32], audio: &mut [i16]) -> FrameOutput;

    /// Power-cycle, keeping ROM, BIOS and save data.
    fn reset(&mut self);

    /// Replace the colour table used for video output.
    fn set_color_lut(&mut self, lut: &ColorLut);

    /// Bytes [`save_data`](Self::save_data) will write. 0 means nothing to save.
    fn save_data_len(&mut self) -> usize;

    /// Write battery storage (bulk bytes, then any RTC buffer) into `dest`.
    ///
    /// Returns the number of bytes written.
    fn save_data(&mut self, dest: &mut [u8]) -> usize;

    /// Inject battery storage. `rtc_fallback` is the unix time the clock
    /// restarts from.
    fn load_save_data(&mut self, data: &[u8], rtc_fallback: i64);

    /// Serialize the whole core and cache the result. 0 means failure.
    ///
    /// Any previously cached state is discarded first.
    fn save_state_len(&mut self) -> usize;

    /// Length of the cached state, or 0 if none is prepared.
    fn prepared_state_len(&self) -> usize;

    /// Copy out the cached state and drop it.
    fn save_state(&mut self, dest: &mut [u8]) -> Result<usize, StateError>;

    /// Replace the core's state. After a failure the core must be discarded.
    ///
    /// If the state carries no valid RTC record the clock restarts from
    /// `rtc_fallback`.
    fn load_state(&mut self, data: &[u8], rtc_fallback: i64) -> Result<(), StateError>;

    /// Current RTC reading in unix seconds.
    fn rtc_time(&self) -> i64;

    /// Live view of one memory region, if the core has it.
    fn memory_block(&mut self, region: MemoryRegion) -> Option<&mut [u8]>;
}

/// Fail unless `bios` has exactly `expected` bytes.
pub fn check_bios_len(bios: &[u8], expected: usize) -> Result<(), CoreError> {
    if bios.len() == expected {
        Ok(())
    } else {
        Err(CoreError::BiosLength {
            expected,
            actual: bios.len(),
        })
    }
}
