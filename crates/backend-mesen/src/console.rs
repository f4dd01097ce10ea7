//! Mesen GBA core.
//!
//! The console models the cartridge RTC itself, starting from the
//! `custom_date` setting, so no virtual RTC is involved. Settings are part
//! of every save state and bring the RTC start date with them.

use color_lut::ColorLut;
use emu_core::{
    AudioConfig, Buttons, CoreError, CoreOptions, EmuCore, FrameOutput, GBA_CLOCK, MasterClock,
    MemoryRegion, StateError, VideoConfig, check_bios_len,
};
use save_codec::{StateCache, try_alloc};
use tracing::debug;

use crate::audio::{AudioCollector, COLLECT_FRAMES, SAMPLE_RATE};
use crate::battery::BatteryStore;
use crate::engine::{
    AudioSettings, ControllerType, GbaSettings, MemoryType, MesenEngine, RamState, RtcType,
    Settings,
};

/// GBA BIOS size.
pub const BIOS_LEN: usize = 0x4000;

/// Settings a new console is created with.
#[must_use]
pub fn creation_settings(options: &CoreOptions) -> Settings {
    Settings {
        audio: AudioSettings {
            sample_rate: SAMPLE_RATE,
            disable_dynamic_sample_rate: true,
        },
        gba: GbaSettings {
            controller: ControllerType::GbaController,
            skip_boot_screen: false,
            disable_frame_skipping: true,
            ram_power_on_state: RamState::AllOnes,
            rtc_type: if options.force_disable_rtc {
                RtcType::Disabled
            } else {
                RtcType::AutoDetect
            },
            custom_date: options.rtc_start_time,
        },
    }
}

/// Copy `rom` into a buffer padded with 0xFF up to the next power of two.
pub fn pad_rom(rom: &[u8]) -> Result<Vec<u8>, CoreError> {
    let padded_len = rom
        .len()
        .max(1)
        .checked_next_power_of_two()
        .ok_or_else(|| CoreError::OutOfMemory(format!("{} byte ROM cannot be padded", rom.len())))?;
    let mut padded = try_alloc(padded_len, 0xFF)?;
    padded[..rom.len()].copy_from_slice(rom);
    Ok(padded)
}

const fn memory_type(region: MemoryRegion) -> MemoryType {
    match region {
        MemoryRegion::Iwram => MemoryType::GbaIntWorkRam,
        MemoryRegion::Ewram => MemoryType::GbaExtWorkRam,
        MemoryRegion::Sram => MemoryType::GbaSaveRam,
    }
}

/// Mesen GBA core.
pub struct MesenCore<E: MesenEngine> {
    engine: E,
    audio: AudioCollector,
    battery: BatteryStore,
    lut: ColorLut,
    state: StateCache,
}

impl<E: MesenEngine> MesenCore<E> {
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn battery(&self) -> &BatteryStore {
        &self.battery
    }

    fn flush_battery(&mut self) {
        self.engine.save_battery(&mut self.battery);
    }
}

impl<E: MesenEngine> EmuCore for MesenCore<E> {
    const NAME: &'static str = "mesen";

    fn create(rom: &[u8], bios: &[u8], options: &CoreOptions) -> Result<Self, CoreError> {
        check_bios_len(bios, BIOS_LEN)?;

        let mut engine = E::create(&creation_settings(options)).ok_or(CoreError::EngineUnavailable)?;
        let battery = BatteryStore::default();
        if !engine.load_rom(pad_rom(rom)?, &battery) {
            return Err(CoreError::RomRejected);
        }

        // The boot ROM is written directly into console memory.
        match engine.memory(MemoryType::GbaBootRom) {
            Some(boot) if boot.len() == BIOS_LEN => boot.copy_from_slice(bios),
            _ => return Err(CoreError::EngineInit("boot ROM is not mapped".into())),
        }
        // Puts the CPU pipeline in its post-BIOS-load state.
        engine.reset();

        debug!(rom_len = rom.len(), "Mesen console loaded");
        Ok(Self {
            engine,
            audio: AudioCollector::new(),
            battery,
            lut: ColorLut::default(),
            state: StateCache::default(),
        })
    }

    fn video_config(&self) -> VideoConfig {
        VideoConfig::GBA
    }

    fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: SAMPLE_RATE,
            max_frames: COLLECT_FRAMES,
        }
    }

    fn clock(&self) -> MasterClock {
        GBA_CLOCK
    }

    fn advance(&mut self, buttons: Buttons, video: &mut [u32], audio: &mut [i16]) -> FrameOutput {
        let start = self.engine.master_clock();
        self.engine.set_keys(buttons.bits());
        self.engine.process_end_of_frame();
        self.engine.run_frame(&mut self.audio);

        self.lut.apply(self.engine.screen_buffer(), video);
        let samples = self.audio.drain_into(audio);

        FrameOutput {
            samples,
            cpu_cycles: self.engine.master_clock().wrapping_sub(start) as u32,
        }
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    fn set_color_lut(&mut self, lut: &ColorLut) {
        self.lut.copy_from(lut);
    }

    fn save_data_len(&mut self) -> usize {
        self.flush_battery();
        self.battery.len()
    }

    fn save_data(&mut self, dest: &mut [u8]) -> usize {
        self.flush_battery();
        self.battery.write_joined(dest)
    }

    fn load_save_data(&mut self, data: &[u8], rtc_fallback: i64) {
        // Segment sizes come from the console's own battery layout.
        self.flush_battery();
        self.battery.inject(data);
        self.engine.settings_mut().gba.custom_date = rtc_fallback;
        self.engine.load_battery(&self.battery);
    }

    fn save_state_len(&mut self) -> usize {
        self.state.invalidate();
        match self.engine.serialize() {
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

    /// The RTC start date is restored from the state's settings.
    fn load_state(&mut self, data: &[u8], _rtc_fallback: i64) -> Result<(), StateError> {
        if self.engine.deserialize(data) {
            Ok(())
        } else {
            Err(StateError::Corrupt("console rejected state".into()))
        }
    }

    fn rtc_time(&self) -> i64 {
        self.engine.settings().gba.custom_date
    }

    fn memory_block(&mut self, region: MemoryRegion) -> Option<&mut [u8]> {
        self.engine.memory(memory_type(region))
    }
}

impl<E: MesenEngine> std::fmt::Debug for MesenCore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MesenCore")
            .field("audio", &self.audio)
            .field("battery", &self.battery.len())
            .field("state", &self.state.len())
            .finish_non_exhaustive()
    }
}
