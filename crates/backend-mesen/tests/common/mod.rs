//! Deterministic stand-in for a Mesen GBA console.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use backend_mesen::{
    AudioProvider, BatteryProvider, MemoryType, MesenEngine, RTC_EXTENSION, RamState, RtcType,
    SAV_EXTENSION, Settings,
};
use emu_core::{GBA_CLOCK, GBA_CYCLES_PER_FRAME, VideoConfig};

pub const IWRAM_LEN: usize = 0x8000;
pub const EWRAM_LEN: usize = 0x40000;
pub const RTC_LEN: usize = 12;

const STATE_MAGIC: &[u8; 8] = b"FAKEMSEN";

pub static LIVE: AtomicUsize = AtomicUsize::new(0);

/// A ROM with a valid header, game `code` and `marker` at 0xC0.
pub fn rom(code: &[u8; 4], marker: &[u8], len: usize) -> Vec<u8> {
    let mut rom = vec![0u8; len];
    rom[0xAC..0xB0].copy_from_slice(code);
    rom[0xB2] = 0x96;
    rom[0xC0..0xC0 + marker.len()].copy_from_slice(marker);
    rom
}

/// BIOS image with a recognisable pattern.
pub fn bios() -> Vec<u8> {
    (0..0x4000u32).map(|i| (i * 3) as u8).collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub struct FakeMesen {
    settings: Settings,
    pub rom: Vec<u8>,
    pub boot_rom: Vec<u8>,
    pub resets: u32,
    pub battery_loads: u32,
    sav: Vec<u8>,
    rtc: Vec<u8>,
    clock: u64,
    frame: u32,
    pending_keys: u16,
    keys: u16,
    lfsr: u32,
    audio_phase: u64,
    iwram: Vec<u8>,
    ewram: Vec<u8>,
    screen: Vec<u16>,
}

impl FakeMesen {
    fn step_lfsr(&mut self) -> u32 {
        let bit = (self.lfsr ^ (self.lfsr >> 1) ^ (self.lfsr >> 21) ^ (self.lfsr >> 31)) & 1;
        self.lfsr = (self.lfsr << 1) | bit;
        self.lfsr
    }
}

impl Drop for FakeMesen {
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

fn take_u64(data: &mut &[u8]) -> Option<u64> {
    Some(u64::from_le_bytes(take(data)?.try_into().ok()?))
}

impl MesenEngine for FakeMesen {
    fn create(settings: &Settings) -> Option<Self> {
        LIVE.fetch_add(1, Ordering::SeqCst);
        let fill = match settings.gba.ram_power_on_state {
            RamState::AllOnes => 0xFF,
            RamState::AllZeros | RamState::Random => 0,
        };
        Some(Self {
            settings: *settings,
            rom: Vec::new(),
            boot_rom: vec![0; 0x4000],
            resets: 0,
            battery_loads: 0,
            sav: Vec::new(),
            rtc: Vec::new(),
            clock: 0,
            frame: 0,
            pending_keys: 0,
            keys: 0,
            lfsr: 0xACE1,
            audio_phase: 0,
            iwram: vec![fill; IWRAM_LEN],
            ewram: vec![fill; EWRAM_LEN],
            screen: vec![0; VideoConfig::GBA.pixels()],
        })
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    fn load_rom(&mut self, rom: Vec<u8>, battery: &dyn BatteryProvider) -> bool {
        if !rom.len().is_power_of_two() || rom.len() < 0xC0 || rom[0xB2] != 0x96 {
            return false;
        }
        let sav_len = if contains(&rom, b"FLASH1M_V") {
            0x20000
        } else if contains(&rom, b"SRAM_V") {
            0x8000
        } else {
            0
        };
        let has_rtc = match self.settings.gba.rtc_type {
            RtcType::Disabled => false,
            RtcType::Enabled => true,
            RtcType::AutoDetect => &rom[0xAC..0xB0] == b"RTCE",
        };
        self.sav = vec![0xFF; sav_len];
        self.rtc = vec![0; if has_rtc { RTC_LEN } else { 0 }];
        self.rom = rom;
        self.load_battery(battery);
        self.battery_loads = 0;
        true
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.frame = 0;
        self.keys = 0;
        self.pending_keys = 0;
        self.audio_phase = 0;
        self.lfsr = self
            .boot_rom
            .iter()
            .chain(&self.rom)
            .fold(0xACE1u32, |acc, &b| acc.rotate_left(3) ^ u32::from(b))
            | 1;
    }

    fn set_keys(&mut self, keys: u16) {
        self.pending_keys = keys;
    }

    fn process_end_of_frame(&mut self) {
        self.keys = self.pending_keys;
    }

    fn run_frame(&mut self, audio: &mut dyn AudioProvider) {
        self.frame += 1;
        self.clock += u64::from(GBA_CYCLES_PER_FRAME);
        let mix = self.step_lfsr() ^ u32::from(self.keys);

        for (i, px) in self.screen.iter_mut().enumerate() {
            *px = ((i as u32).wrapping_mul(13) ^ mix ^ (self.frame << 4)) as u16;
        }
        self.iwram[self.frame as usize % IWRAM_LEN] = mix as u8;
        self.ewram[mix as usize % EWRAM_LEN] = self.keys as u8;
        if self.keys & 1 != 0 && !self.sav.is_empty() {
            let offset = self.frame as usize % self.sav.len();
            self.sav[offset] = mix as u8;
        }
        if let Some(ticks) = self.rtc.get_mut(8..RTC_LEN) {
            let count = u32::from_le_bytes([ticks[0], ticks[1], ticks[2], ticks[3]]);
            ticks.copy_from_slice(&count.wrapping_add(1).to_le_bytes());
        }

        let rate = u64::from(self.settings.audio.sample_rate);
        self.audio_phase += u64::from(GBA_CYCLES_PER_FRAME) * rate;
        let mut samples = Vec::new();
        while self.audio_phase >= u64::from(GBA_CLOCK.frequency_hz) {
            self.audio_phase -= u64::from(GBA_CLOCK.frequency_hz);
            let level = self.step_lfsr();
            samples.push(level as i16);
            samples.push((level >> 16) as i16);
        }
        audio.mix_audio(&samples, self.settings.audio.sample_rate);
    }

    fn master_clock(&self) -> u64 {
        self.clock
    }

    fn screen_buffer(&self) -> &[u16] {
        &self.screen
    }

    fn save_battery(&mut self, battery: &mut dyn BatteryProvider) {
        if !self.sav.is_empty() {
            battery.save_battery(SAV_EXTENSION, &self.sav);
        }
        if !self.rtc.is_empty() {
            battery.save_battery(RTC_EXTENSION, &self.rtc);
        }
    }

    fn load_battery(&mut self, battery: &dyn BatteryProvider) {
        self.battery_loads += 1;
        let sav = battery.load_battery(SAV_EXTENSION);
        if sav.len() == self.sav.len() {
            self.sav = sav;
        }
        let rtc = battery.load_battery(RTC_EXTENSION);
        if rtc.len() == self.rtc.len() {
            self.rtc = rtc;
        }
    }

    fn serialize(&mut self) -> Option<Vec<u8>> {
        let mut blob = STATE_MAGIC.to_vec();
        for value in [
            self.settings.gba.custom_date as u64,
            self.clock,
            u64::from(self.frame),
            u64::from(self.lfsr),
            u64::from(self.keys),
            self.audio_phase,
        ] {
            put(&mut blob, &value.to_le_bytes());
        }
        put(&mut blob, &self.iwram);
        put(&mut blob, &self.ewram);
        put(&mut blob, &self.sav);
        put(&mut blob, &self.rtc);
        Some(blob)
    }

    fn deserialize(&mut self, state: &[u8]) -> bool {
        let Some(mut rest) = state.strip_prefix(STATE_MAGIC.as_slice()) else {
            return false;
        };
        let mut fields = [0u64; 6];
        for field in &mut fields {
            let Some(value) = take_u64(&mut rest) else {
                return false;
            };
            *field = value;
        }
        let (Some(iwram), Some(ewram), Some(sav), Some(rtc)) = (
            take(&mut rest),
            take(&mut rest),
            take(&mut rest),
            take(&mut rest),
        ) else {
            return false;
        };
        if iwram.len() != IWRAM_LEN || ewram.len() != EWRAM_LEN {
            return false;
        }

        let [custom_date, clock, frame, lfsr, keys, audio_phase] = fields;
        self.settings.gba.custom_date = custom_date as i64;
        self.clock = clock;
        self.frame = frame as u32;
        self.lfsr = lfsr as u32;
        self.keys = keys as u16;
        self.audio_phase = audio_phase;
        self.iwram.copy_from_slice(iwram);
        self.ewram.copy_from_slice(ewram);
        self.sav = sav.to_vec();
        self.rtc = rtc.to_vec();
        true
    }

    fn memory(&mut self, kind: MemoryType) -> Option<&mut [u8]> {
        match kind {
            MemoryType::GbaBootRom => Some(&mut self.boot_rom),
            MemoryType::GbaIntWorkRam => Some(&mut self.iwram),
            MemoryType::GbaExtWorkRam => Some(&mut self.ewram),
            MemoryType::GbaSaveRam if self.sav.is_empty() => None,
            MemoryType::GbaSaveRam => Some(&mut self.sav),
        }
    }
}
