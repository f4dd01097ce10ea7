//! Deterministic stand-in for an mGBA engine.
//!
//! The fake keeps just enough board state to behave like a real core from
//! the adapter's point of view: ROM header checks, save type detection,
//! cartridge overrides, a free-running clock, native-rate audio and
//! extdata hooks in save states.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use backend_mgba::{
    CartridgeOverride, EngineConfig, Hardware, Hooks, IdleOptimization, LogLevel, LogSink,
    MgbaEngine, SaveType, StateFlags,
};
use emu_core::{GBA_CYCLES_PER_FRAME, VideoConfig};
use save_codec::SaveFile;

pub const FREQUENCY: u32 = 16_777_216;
pub const NATIVE_RATE: u32 = 32_768;
pub const IWRAM_LEN: usize = 0x8000;
pub const EWRAM_LEN: usize = 0x40000;

const STATE_MAGIC: &[u8; 8] = b"FAKEMGBA";

pub static LIVE: AtomicUsize = AtomicUsize::new(0);
pub static LOGGER_INSTALLS: AtomicUsize = AtomicUsize::new(0);
pub static FAIL_CREATE: AtomicBool = AtomicBool::new(false);

/// A ROM with a valid header, game `code` and `marker` at 0xC0.
pub fn rom(code: &[u8; 4], marker: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x400];
    rom[0xAC..0xB0].copy_from_slice(code);
    rom[0xB2] = 0x96;
    rom[0xC0..0xC0 + marker.len()].copy_from_slice(marker);
    rom
}

pub fn bios() -> Vec<u8> {
    vec![0; 0x4000]
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub struct FakeMgba {
    pub config: Option<EngineConfig>,
    rom: Vec<u8>,
    save: Option<SaveFile>,
    pub hardware: Hardware,
    pub cart_override: Option<CartridgeOverride>,
    pub idle: Option<IdleOptimization>,
    pub resets: u32,
    pub rtc_inits: u32,
    savedata_size: usize,
    time: u32,
    frame: u32,
    keys: u16,
    lfsr: u32,
    audio_phase: u32,
    native_rate: u32,
    iwram: Vec<u8>,
    ewram: Vec<u8>,
    video: Vec<u16>,
}

impl FakeMgba {
    fn clocks_per_sample(&self) -> u32 {
        FREQUENCY / self.native_rate
    }

    fn detect_savedata(&self) -> usize {
        let save_type = self
            .cart_override
            .map_or(SaveType::Autodetect, |cart| cart.save_type);
        match save_type {
            SaveType::Flash1M => 0x20000,
            SaveType::Flash512 => 0x10000,
            SaveType::Sram => 0x8000,
            SaveType::Autodetect if contains(&self.rom, b"FLASH1M_V") => 0x20000,
            SaveType::Autodetect if contains(&self.rom, b"SRAM_V") => 0x8000,
            SaveType::Autodetect if contains(&self.rom, b"EEPROM_V") => 0x2010,
            _ => 0,
        }
    }

    fn step_lfsr(&mut self) -> u32 {
        let bit = (self.lfsr ^ (self.lfsr >> 2) ^ (self.lfsr >> 3) ^ (self.lfsr >> 5)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << 31);
        self.lfsr
    }
}

impl Drop for FakeMgba {
    fn drop(&mut self) {
        LIVE.fetch_sub(1, Ordering::SeqCst);
    }
}

fn put(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn take<'a>(data: &mut &'a [u8]) -> Option<&'a [u8]> {
    let len = u32::from_le_bytes(data.get(..4)?.try_into().ok()?) as usize;
    let body = data.get(4..4 + len)?;
    *data = &data[4 + len..];
    Some(body)
}

fn take_u32(data: &mut &[u8]) -> Option<u32> {
    Some(u32::from_le_bytes(take(data)?.try_into().ok()?))
}

impl MgbaEngine for FakeMgba {
    fn create() -> Option<Self> {
        if FAIL_CREATE.load(Ordering::SeqCst) {
            return None;
        }
        LIVE.fetch_add(1, Ordering::SeqCst);
        Some(Self {
            config: None,
            rom: Vec::new(),
            save: None,
            hardware: Hardware::empty(),
            cart_override: None,
            idle: None,
            resets: 0,
            rtc_inits: 0,
            savedata_size: 0,
            time: 0,
            frame: 0,
            keys: 0,
            lfsr: 1,
            audio_phase: 0,
            native_rate: NATIVE_RATE,
            iwram: vec![0; IWRAM_LEN],
            ewram: vec![0; EWRAM_LEN],
            video: vec![0; VideoConfig::GBA.pixels()],
        })
    }

    fn set_default_logger(sink: LogSink) {
        LOGGER_INSTALLS.fetch_add(1, Ordering::SeqCst);
        sink(LogLevel::Info, "GBA", "default logger installed");
    }

    fn load_config(&mut self, config: &EngineConfig) {
        self.config = Some(*config);
    }

    fn load_rom(&mut self, rom: Vec<u8>) -> bool {
        if rom.len() < 0xC0 || rom[0xB2] != 0x96 {
            return false;
        }
        self.rom = rom;
        true
    }

    fn load_bios(&mut self, bios: &[u8]) -> bool {
        bios.len() == 0x4000
    }

    fn load_save(&mut self, file: SaveFile) {
        self.save = Some(file);
    }

    fn save_file(&self) -> Option<&SaveFile> {
        self.save.as_ref()
    }

    fn save_file_mut(&mut self) -> Option<&mut SaveFile> {
        self.save.as_mut()
    }

    fn frequency(&self) -> u32 {
        FREQUENCY
    }

    fn audio_sample_rate(&self) -> u32 {
        self.native_rate
    }

    fn reset(&mut self, hooks: Hooks<'_>) {
        self.resets += 1;
        self.frame = 0;
        self.keys = 0;
        self.audio_phase = 0;
        self.lfsr = self.rom.iter().fold(1u32, |acc, &b| acc.rotate_left(5) ^ u32::from(b)) | 1;
        self.iwram.fill(0);
        self.ewram.fill(0);

        self.hardware = match self.cart_override {
            Some(cart) => cart.hardware,
            None if &self.game_code() == b"RTCE" => Hardware::RTC,
            None => Hardware::empty(),
        };
        self.savedata_size = self.detect_savedata();
        if let Some(file) = self.save.as_mut() {
            if file.len() < self.savedata_size {
                let rtc = if self.hardware.contains(Hardware::RTC) { 16 } else { 0 };
                file.truncate(self.savedata_size + rtc);
            }
        }
        if let Some(stream) = hooks.stream {
            stream.audio_rate_changed(self.native_rate);
        }
    }

    fn game_code(&self) -> [u8; 4] {
        let mut code = [0; 4];
        code.copy_from_slice(&self.rom[0xAC..0xB0]);
        code
    }

    fn find_override(&self, id: [u8; 4]) -> Option<CartridgeOverride> {
        (&id == b"RTCE").then_some(CartridgeOverride {
            id,
            save_type: SaveType::Flash1M,
            hardware: Hardware::RTC,
            idle_loop: Some(0x0800_0400),
        })
    }

    fn set_override(&mut self, cart: &CartridgeOverride) {
        self.cart_override = Some(*cart);
    }

    fn hardware(&self) -> Hardware {
        self.hardware
    }

    fn set_hardware(&mut self, hardware: Hardware) {
        self.hardware = hardware;
    }

    fn set_idle_optimization(&mut self, mode: IdleOptimization) {
        self.idle = Some(mode);
    }

    fn init_rtc_hardware(&mut self) {
        self.rtc_inits += 1;
    }

    fn savedata_size(&self) -> usize {
        self.savedata_size
    }

    fn current_time(&self) -> u32 {
        self.time
    }

    fn set_keys(&mut self, keys: u16) {
        self.keys = keys;
    }

    fn run_frame(&mut self, mut hooks: Hooks<'_>) {
        self.frame += 1;
        self.time = self.time.wrapping_add(GBA_CYCLES_PER_FRAME);
        let mix = self.step_lfsr() ^ u32::from(self.keys);

        for (i, px) in self.video.iter_mut().enumerate() {
            let value = (i as u32).wrapping_mul(7) ^ mix ^ self.frame;
            *px = (value & 0xFFFF) as u16;
        }

        self.iwram[self.frame as usize % IWRAM_LEN] = mix as u8;
        self.ewram[(mix as usize) % EWRAM_LEN] = self.keys as u8;
        if self.hardware.contains(Hardware::RTC) {
            if let Some(rtc) = hooks.rtc.as_mut() {
                self.iwram[..8].copy_from_slice(&rtc.unix_time().to_le_bytes());
            }
        }

        if self.keys & 1 != 0 && self.savedata_size > 0 {
            let offset = self.frame as usize % self.savedata_size;
            if let Some(file) = self.save.as_mut() {
                file.write_at(offset, &[mix as u8]);
            }
        }

        let step = self.clocks_per_sample();
        self.audio_phase += GBA_CYCLES_PER_FRAME;
        while self.audio_phase >= step {
            self.audio_phase -= step;
            let level = self.step_lfsr();
            if let Some(stream) = hooks.stream.as_mut() {
                stream.post_audio_frame(level as i16, (level >> 16) as i16);
            }
        }
    }

    fn video_buffer(&self) -> &[u16] {
        &self.video
    }

    fn save_state(&mut self, flags: StateFlags, hooks: Hooks<'_>) -> Option<Vec<u8>> {
        let mut blob = STATE_MAGIC.to_vec();
        for value in [
            self.frame,
            self.time,
            self.lfsr,
            u32::from(self.keys),
            self.audio_phase,
            self.hardware.bits(),
            self.savedata_size as u32,
        ] {
            put(&mut blob, &value.to_le_bytes());
        }
        put(&mut blob, &self.iwram);
        put(&mut blob, &self.ewram);
        if flags.contains(StateFlags::SAVEDATA) {
            put(&mut blob, self.save.as_ref().map_or(&[][..], SaveFile::contents));
        }
        if flags.contains(StateFlags::RTC) {
            let record = hooks.rtc.map(|rtc| rtc.serialize()).unwrap_or_default();
            put(&mut blob, &record);
        }
        Some(blob)
    }

    fn load_state(&mut self, state: &[u8], flags: StateFlags, hooks: Hooks<'_>) -> bool {
        let Some(mut rest) = state.strip_prefix(STATE_MAGIC.as_slice()) else {
            return false;
        };
        let mut fields = [0u32; 7];
        for field in &mut fields {
            let Some(value) = take_u32(&mut rest) else {
                return false;
            };
            *field = value;
        }
        let (Some(iwram), Some(ewram)) = (take(&mut rest), take(&mut rest)) else {
            return false;
        };
        if iwram.len() != IWRAM_LEN || ewram.len() != EWRAM_LEN {
            return false;
        }

        let [frame, time, lfsr, keys, audio_phase, hardware, savedata_size] = fields;
        self.frame = frame;
        self.time = time;
        self.lfsr = lfsr;
        self.keys = keys as u16;
        self.audio_phase = audio_phase;
        self.hardware = Hardware::from_bits_truncate(hardware);
        self.savedata_size = savedata_size as usize;
        self.iwram.copy_from_slice(iwram);
        self.ewram.copy_from_slice(ewram);

        if flags.contains(StateFlags::SAVEDATA) {
            let Some(savedata) = take(&mut rest) else {
                return false;
            };
            if let Some(file) = self.save.as_mut() {
                file.truncate(savedata.len());
                file.write_at(0, savedata);
            }
        }
        if flags.contains(StateFlags::RTC) {
            if let (Some(record), Some(rtc)) = (take(&mut rest), hooks.rtc) {
                rtc.deserialize(record);
            }
        }
        true
    }

    fn memory_block(&mut self, base: u32) -> Option<&mut [u8]> {
        match base {
            0x0300_0000 => Some(&mut self.iwram),
            0x0200_0000 => Some(&mut self.ewram),
            _ => None,
        }
    }
}
