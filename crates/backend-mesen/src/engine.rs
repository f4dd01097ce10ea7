//! The seam between the adapter and a Mesen GBA console.
//!
//! Mesen pulls audio and battery data through provider objects. Here they
//! are passed per call as trait objects, so the adapter keeps ownership of
//! both.

/// Controller plugged into the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    None,
    GbaController,
}

/// Work RAM contents at power on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamState {
    AllZeros,
    AllOnes,
    Random,
}

/// Whether the cartridge RTC is emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcType {
    AutoDetect,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub disable_dynamic_sample_rate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GbaSettings {
    pub controller: ControllerType,
    pub skip_boot_screen: bool,
    pub disable_frame_skipping: bool,
    pub ram_power_on_state: RamState,
    pub rtc_type: RtcType,
    /// RTC start date in unix seconds. Travels with save states.
    pub custom_date: i64,
}

/// Emulator settings. Serialized into every save state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub audio: AudioSettings,
    pub gba: GbaSettings,
}

/// Memory areas the console exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryType {
    GbaBootRom,
    GbaIntWorkRam,
    GbaExtWorkRam,
    GbaSaveRam,
}

/// Receives mixed audio (`IAudioProvider`).
pub trait AudioProvider {
    /// Interleaved stereo samples at `sample_rate`.
    fn mix_audio(&mut self, samples: &[i16], sample_rate: u32);
}

/// Battery file storage keyed by extension (`IBatteryProvider`).
pub trait BatteryProvider {
    fn save_battery(&mut self, extension: &str, data: &[u8]);

    fn load_battery(&self, extension: &str) -> Vec<u8>;
}

/// A Mesen emulator instance with a GBA console attached.
pub trait MesenEngine: Sized {
    /// Build an emulator with `settings` applied. `None` on failure.
    fn create(settings: &Settings) -> Option<Self>;

    fn settings(&self) -> &Settings;

    fn settings_mut(&mut self) -> &mut Settings;

    /// Load a ROM image; battery files are read from `battery`.
    fn load_rom(&mut self, rom: Vec<u8>, battery: &dyn BatteryProvider) -> bool;

    fn reset(&mut self);

    /// Latch controller state for the next frame.
    fn set_keys(&mut self, keys: u16);

    /// Poll input devices, as done between frames.
    fn process_end_of_frame(&mut self);

    fn run_frame(&mut self, audio: &mut dyn AudioProvider);

    /// Master clock counter.
    fn master_clock(&self) -> u64;

    /// Current screen contents, one 15-bit pixel per entry.
    fn screen_buffer(&self) -> &[u16];

    /// Write battery-backed memory out through `battery`.
    fn save_battery(&mut self, battery: &mut dyn BatteryProvider);

    /// Reload battery-backed memory from `battery`.
    fn load_battery(&mut self, battery: &dyn BatteryProvider);

    /// Serialize settings and console. `None` on failure.
    fn serialize(&mut self) -> Option<Vec<u8>>;

    /// Restore settings and console. `false` on any error.
    fn deserialize(&mut self, state: &[u8]) -> bool;

    fn memory(&mut self, kind: MemoryType) -> Option<&mut [u8]>;
}
