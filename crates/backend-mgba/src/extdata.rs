//! mGBA core with a virtual RTC carried in state extdata.
//!
//! The RTC is a [`VirtualRtc`] lent to the engine as its RTC source, so RTC
//! time follows emulated cycles and is saved with states. Audio is taken
//! from the engine's AV stream at its native rate and repeated up to the
//! engine's maximum rate of `frequency / 64`.

use audio_bridge::QuotientBridge;
use color_lut::ColorLut;
use emu_core::{
    AudioConfig, Buttons, CoreError, CoreOptions, EmuCore, FrameOutput, MasterClock,
    MemoryRegion, StateError, VideoConfig,
};
use save_codec::{SaveFile, StateCache};
use tracing::debug;
use virtual_rtc::VirtualRtc;

use crate::engine::{
    AvStream, CartridgeOverride, EngineConfig, Hardware, Hooks, IdleOptimization, MgbaEngine,
    SaveType, StateFlags,
};
use crate::png_state::{is_png, unwrap_png_state};
use crate::setup::{bring_up, region_block};

/// Stereo frames the audio ring holds per frame.
pub const AUDIO_RING_FRAMES: usize = 0x2000;

/// What save states carry.
pub const STATE_FLAGS: StateFlags = StateFlags::SAVEDATA.union(StateFlags::RTC);

const ENGINE_CONFIG: EngineConfig = EngineConfig {
    idle_optimization: IdleOptimization::Ignore,
    // The BIOS is always supplied, so VBA quirks never matter.
    vba_bug_compat: false,
    volume: 0x100,
    audio_buffer_size: 8192,
};

/// Maximum native rate the engine can produce for a given clock.
#[must_use]
pub const fn max_audio_rate(frequency: u32) -> u32 {
    frequency / (0x200 >> 3)
}

impl AvStream for QuotientBridge {
    fn audio_rate_changed(&mut self, rate: u32) {
        self.rate_changed(rate);
    }

    fn post_audio_frame(&mut self, left: i16, right: i16) {
        self.post(left, right);
    }
}

/// mGBA GBA core with extdata RTC.
pub struct MgbaCore<E: MgbaEngine> {
    engine: E,
    rtc: VirtualRtc,
    audio: QuotientBridge,
    lut: ColorLut,
    state: StateCache,
}

impl<E: MgbaEngine> MgbaCore<E> {
    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn rtc(&self) -> &VirtualRtc {
        &self.rtc
    }

    fn hooks(&mut self) -> (&mut E, Hooks<'_>) {
        (
            &mut self.engine,
            Hooks::new(Some(&mut self.rtc), Some(&mut self.audio)),
        )
    }

    fn engine_reset(&mut self) {
        let (engine, hooks) = self.hooks();
        engine.reset(hooks);
    }

    /// Apply the per-title override, or strip hardware if RTC is forced off.
    fn apply_overrides(&mut self, force_disable_rtc: bool) {
        let id = self.engine.game_code();
        let cart = match self.engine.find_override(id) {
            Some(mut cart) => {
                if force_disable_rtc {
                    cart.hardware.remove(Hardware::RTC);
                }
                cart.idle_loop = None;
                cart
            }
            None if force_disable_rtc => CartridgeOverride {
                id,
                save_type: SaveType::Autodetect,
                hardware: Hardware::empty(),
                idle_loop: None,
            },
            None => return,
        };
        debug!(code = ?id, hardware = ?cart.hardware, "applying cartridge override");
        self.engine.set_override(&cart);
        self.engine_reset();
    }

    fn save_file(&self) -> Option<&SaveFile> {
        self.engine.save_file()
    }
}

impl<E: MgbaEngine> EmuCore for MgbaCore<E> {
    const NAME: &'static str = "mgba";

    fn create(rom: &[u8], bios: &[u8], options: &CoreOptions) -> Result<Self, CoreError> {
        let engine: E = bring_up(rom, bios, &ENGINE_CONFIG, true)?;

        let frequency = engine.frequency();
        let audio = QuotientBridge::new(
            max_audio_rate(frequency),
            engine.audio_sample_rate(),
            AUDIO_RING_FRAMES,
        );
        let mut core = Self {
            rtc: VirtualRtc::new(options.rtc_start_time, frequency),
            engine,
            audio,
            lut: ColorLut::default(),
            state: StateCache::default(),
        };

        // Default overrides only take effect on reset.
        core.engine_reset();
        core.apply_overrides(options.force_disable_rtc);
        Ok(core)
    }

    fn video_config(&self) -> VideoConfig {
        VideoConfig::GBA
    }

    fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: self.audio.output_rate(),
            max_frames: AUDIO_RING_FRAMES,
        }
    }

    fn clock(&self) -> MasterClock {
        MasterClock::new(self.engine.frequency())
    }

    fn advance(&mut self, buttons: Buttons, video: &mut [u32], audio: &mut [i16]) -> FrameOutput {
        let start = self.engine.current_time();
        self.engine.set_keys(buttons.bits());
        let (engine, hooks) = self.hooks();
        engine.run_frame(hooks);

        self.lut.apply(self.engine.video_buffer(), video);
        let samples = self.audio.drain_into(audio);
        let cpu_cycles = self.engine.current_time().wrapping_sub(start);
        self.rtc.tick(cpu_cycles);

        FrameOutput {
            samples,
            cpu_cycles,
        }
    }

    fn reset(&mut self) {
        self.engine_reset();
    }

    fn set_color_lut(&mut self, lut: &ColorLut) {
        self.lut.copy_from(lut);
    }

    fn save_data_len(&mut self) -> usize {
        self.save_file().map_or(0, SaveFile::len)
    }

    fn save_data(&mut self, dest: &mut [u8]) -> usize {
        self.save_file().map_or(0, |file| file.read_at(0, dest))
    }

    fn load_save_data(&mut self, data: &[u8], rtc_fallback: i64) {
        if let Some(file) = self.engine.save_file_mut() {
            // The engine may not have sized the file yet.
            let written = file.load_image(data);
            if written < data.len() {
                debug!(written, offered = data.len(), "save data clamped to save capacity");
            }
        }
        self.rtc.reset_to(rtc_fallback);
    }

    fn save_state_len(&mut self) -> usize {
        self.state.invalidate();
        let (engine, hooks) = self.hooks();
        match engine.save_state(STATE_FLAGS, hooks) {
            Some(blob) => self.state.store(blob),
            None => 0,
        }
    }

    fn prepared_state_len(&self) -> usize {
        self.state.len()
    }

    fn save_state(&mut self, dest: &mut [u8]) -> Result<usize, StateError> {
        Ok(self.state.take_into(dest)?)
    }

    fn load_state(&mut self, data: &[u8], rtc_fallback: i64) -> Result<(), StateError> {
        let unwrapped;
        let state = if is_png(data) {
            unwrapped = unwrap_png_state(data).map_err(|err| StateError::Corrupt(err.to_string()))?;
            unwrapped.as_slice()
        } else {
            data
        };

        self.rtc.begin_restore();
        let (engine, hooks) = self.hooks();
        let loaded = engine.load_state(state, STATE_FLAGS, hooks);
        if self.rtc.finish_restore(rtc_fallback) {
            debug!(rtc_fallback, "state carried no usable RTC record, using fallback time");
        }

        if loaded {
            Ok(())
        } else {
            Err(StateError::Corrupt("engine rejected state".into()))
        }
    }

    fn rtc_time(&self) -> i64 {
        self.rtc.unix_time()
    }

    fn memory_block(&mut self, region: MemoryRegion) -> Option<&mut [u8]> {
        region_block(&mut self.engine, region)
    }
}

impl<E: MgbaEngine> std::fmt::Debug for MgbaCore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MgbaCore")
            .field("rtc", &self.rtc)
            .field("audio", &self.audio)
            .field("state", &self.state.len())
            .finish_non_exhaustive()
    }
}
