//! mGBA core with banked audio and RTC kept in save data.
//!
//! There is no virtual RTC here: cartridge RTC state lives in a 16-byte
//! tail after the save chip contents. Audio is resampled from the master
//! clock down to 32768 Hz into one bank per channel, and each frame reads
//! back at most 1024 stereo frames.

use audio_bridge::{BankedResampler, StereoFrame};
use color_lut::{ColorCurve, ColorLut};
use emu_core::{
    AudioConfig, Buttons, CoreError, CoreOptions, EmuCore, FrameOutput, MasterClock,
    MemoryRegion, StateError, VideoConfig,
};
use save_codec::{SPLIT_ALIGN, SaveFile, StateCache, split_save_data};
use tracing::debug;

use crate::engine::{AvStream, EngineConfig, Hardware, Hooks, IdleOptimization, MgbaEngine, StateFlags};
use crate::setup::{RTC_BUFFER_LEN, bring_up, region_block};

/// Output sample rate.
pub const OUTPUT_RATE: u32 = 32_768;

/// Most stereo frames handed out per frame.
pub const FRAME_CEILING: usize = 1024;

/// What save states carry.
pub const STATE_FLAGS: StateFlags = StateFlags::SAVEDATA;

// Room for a few frames of backlog before the banks start dropping.
const BANK_CAPACITY: usize = FRAME_CEILING * 4;

const ENGINE_CONFIG: EngineConfig = EngineConfig {
    idle_optimization: IdleOptimization::Ignore,
    vba_bug_compat: false,
    volume: 0x100,
    audio_buffer_size: FRAME_CEILING,
};

/// Feeds native-rate samples into the banks as levels held on the master
/// clock.
#[derive(Debug)]
struct BlipStream {
    banks: BankedResampler,
    frequency: u32,
    clocks_per_sample: u32,
}

impl BlipStream {
    fn new(frequency: u32, native_rate: u32) -> Self {
        let mut stream = Self {
            banks: BankedResampler::new(frequency, OUTPUT_RATE, BANK_CAPACITY),
            frequency,
            clocks_per_sample: 1,
        };
        stream.audio_rate_changed(native_rate);
        stream
    }
}

impl AvStream for BlipStream {
    fn audio_rate_changed(&mut self, rate: u32) {
        self.clocks_per_sample = self.frequency.checked_div(rate).unwrap_or(1).max(1);
    }

    fn post_audio_frame(&mut self, left: i16, right: i16) {
        self.banks
            .post_held(StereoFrame::new(left, right), self.clocks_per_sample);
    }
}

/// mGBA GBA core with banked audio.
pub struct MgbaBlipCore<E: MgbaEngine> {
    engine: E,
    audio: BlipStream,
    lut: ColorLut,
    state: StateCache,
    force_disable_rtc: bool,
    /// A save data load happened since the last reset.
    save_loaded: bool,
}

impl<E: MgbaEngine> MgbaBlipCore<E> {
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn has_rtc(&self) -> bool {
        self.engine.hardware().contains(Hardware::RTC)
    }

    /// Engine reset plus the board tweaks every reset needs.
    fn engine_reset(&mut self) {
        self.engine.reset(Hooks::stream(&mut self.audio));
        self.engine.set_idle_optimization(IdleOptimization::Ignore);
        if self.force_disable_rtc {
            let hardware = self.engine.hardware() - Hardware::RTC;
            self.engine.set_hardware(hardware);
        }
    }

    /// Re-initialise RTC hardware, as a 0xFF-filled save buffer leaves its
    /// registers in a garbage state.
    fn reinit_rtc(&mut self) {
        if self.has_rtc() {
            self.engine.init_rtc_hardware();
        }
    }

    fn save_file(&self) -> Option<&SaveFile> {
        self.engine.save_file()
    }
}

impl<E: MgbaEngine> EmuCore for MgbaBlipCore<E> {
    const NAME: &'static str = "mgba-blip";

    fn create(rom: &[u8], bios: &[u8], options: &CoreOptions) -> Result<Self, CoreError> {
        let engine: E = bring_up(rom, bios, &ENGINE_CONFIG, false)?;
        let audio = BlipStream::new(engine.frequency(), engine.audio_sample_rate());
        let mut core = Self {
            engine,
            audio,
            lut: ColorLut::generate(ColorCurve::Agb),
            state: StateCache::default(),
            force_disable_rtc: options.force_disable_rtc,
            save_loaded: false,
        };
        core.engine_reset();
        core.reinit_rtc();
        Ok(core)
    }

    fn video_config(&self) -> VideoConfig {
        VideoConfig::GBA
    }

    fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: OUTPUT_RATE,
            max_frames: FRAME_CEILING,
        }
    }

    fn clock(&self) -> MasterClock {
        MasterClock::new(self.engine.frequency())
    }

    fn advance(&mut self, buttons: Buttons, video: &mut [u32], audio: &mut [i16]) -> FrameOutput {
        let start = self.engine.current_time();
        self.engine.set_keys(buttons.bits());
        self.engine.run_frame(Hooks::stream(&mut self.audio));

        self.lut.apply(self.engine.video_buffer(), video);
        let samples = self.audio.banks.read(audio, FRAME_CEILING);

        FrameOutput {
            samples,
            cpu_cycles: self.engine.current_time().wrapping_sub(start),
        }
    }

    fn reset(&mut self) {
        self.engine_reset();
        if std::mem::take(&mut self.save_loaded) {
            self.reinit_rtc();
        }
    }

    fn set_color_lut(&mut self, lut: &ColorLut) {
        self.lut.copy_from(lut);
    }

    fn save_data_len(&mut self) -> usize {
        let size = self.engine.savedata_size();
        if size % SPLIT_ALIGN == 0 && self.has_rtc() {
            size + RTC_BUFFER_LEN
        } else {
            size
        }
    }

    fn save_data(&mut self, dest: &mut [u8]) -> usize {
        let len = self.save_data_len().min(dest.len());
        self.save_file().map_or(0, |file| file.read_at(0, &mut dest[..len]))
    }

    fn load_save_data(&mut self, data: &[u8], _rtc_fallback: i64) {
        let size = self.engine.savedata_size();
        let rtc_slot = size % SPLIT_ALIGN == 0 && self.has_rtc();
        let split = split_save_data(data, RTC_BUFFER_LEN);

        let Some(file) = self.engine.save_file_mut() else {
            return;
        };
        let bulk = &split.bulk[..split.bulk.len().min(size)];
        file.write_at(0, bulk);
        match split.rtc {
            Some(rtc) if rtc_slot => {
                file.write_at(size, rtc);
            }
            Some(_) => debug!("cartridge has no RTC slot, ignoring RTC tail"),
            None => {}
        }
        self.save_loaded = true;
    }

    fn save_state_len(&mut self) -> usize {
        self.state.invalidate();
        match self
            .engine
            .save_state(STATE_FLAGS, Hooks::stream(&mut self.audio))
        {
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

    fn load_state(&mut self, data: &[u8], _rtc_fallback: i64) -> Result<(), StateError> {
        if self
            .engine
            .load_state(data, STATE_FLAGS, Hooks::stream(&mut self.audio))
        {
            Ok(())
        } else {
            Err(StateError::Corrupt("engine rejected state".into()))
        }
    }

    /// No virtual RTC is installed, so there is no time to report.
    fn rtc_time(&self) -> i64 {
        0
    }

    fn memory_block(&mut self, region: MemoryRegion) -> Option<&mut [u8]> {
        region_block(&mut self.engine, region)
    }
}

impl<E: MgbaEngine> std::fmt::Debug for MgbaBlipCore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MgbaBlipCore")
            .field("audio", &self.audio)
            .field("force_disable_rtc", &self.force_disable_rtc)
            .field("save_loaded", &self.save_loaded)
            .finish_non_exhaustive()
    }
}
