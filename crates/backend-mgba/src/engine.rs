//! The seam between the adapters and an mGBA engine.
//!
//! [`MgbaEngine`] is the subset of mGBA's `mCore` interface (plus the few
//! GBA board fields the adapters poke) that the cores need. Engine
//! callbacks, the RTC source and the AV stream, are not registered as
//! stored pointers; they are lent to the engine for the duration of each
//! call that may invoke them, through [`Hooks`].

use bitflags::bitflags;
use save_codec::SaveFile;

bitflags! {
    /// Cartridge hardware devices (`HW_*`).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Hardware: u32 {
        const RTC = 1 << 0;
        const RUMBLE = 1 << 1;
        const LIGHT_SENSOR = 1 << 2;
        const GYRO = 1 << 3;
        const TILT = 1 << 4;
        const GB_PLAYER = 1 << 5;
        const GB_PLAYER_DETECTION = 1 << 6;
        const E_READER = 1 << 7;
    }
}

bitflags! {
    /// What a save state carries besides the core itself (`SAVESTATE_*`).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateFlags: u32 {
        const SCREENSHOT = 1 << 0;
        const SAVEDATA = 1 << 1;
        const CHEATS = 1 << 2;
        const RTC = 1 << 3;
        const METADATA = 1 << 4;
    }
}

/// Cartridge save chip type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SaveType {
    #[default]
    Autodetect,
    None,
    Sram,
    Flash512,
    Flash1M,
    Eeprom,
    Eeprom512,
    Sram512,
}

/// How the engine treats detected idle loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOptimization {
    Ignore,
    Remove,
    Detect,
}

impl IdleOptimization {
    /// Config file spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Remove => "remove",
            Self::Detect => "detect",
        }
    }
}

/// Per-title hardware description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartridgeOverride {
    /// Four-character game code from the ROM header.
    pub id: [u8; 4],
    pub save_type: SaveType,
    pub hardware: Hardware,
    /// Idle loop address, `None` to disable idle loop handling.
    pub idle_loop: Option<u32>,
}

/// Settings applied through the engine's config layer at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub idle_optimization: IdleOptimization,
    pub vba_bug_compat: bool,
    /// Master volume, 0x100 is unity.
    pub volume: u16,
    /// Native audio buffer size in samples.
    pub audio_buffer_size: usize,
}

/// Engine log severity (`mLOG_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Stub,
    GameError,
}

/// Process-wide engine log sink.
pub type LogSink = fn(level: LogLevel, category: &str, message: &str);

/// RTC provider consulted by cartridge RTC hardware (`mRTCSource`).
pub trait RtcSource {
    /// Current time in unix seconds.
    fn unix_time(&mut self) -> i64;

    /// State record embedded in save states.
    fn serialize(&self) -> Vec<u8>;

    /// Restore from an embedded record. Returns `false` if it was rejected.
    fn deserialize(&mut self, record: &[u8]) -> bool;
}

/// Audio sink fed by the engine (`mAVStream`).
pub trait AvStream {
    /// The engine changed its native sample rate.
    fn audio_rate_changed(&mut self, rate: u32);

    /// One stereo sample at the native rate.
    fn post_audio_frame(&mut self, left: i16, right: i16);
}

/// Callbacks lent to the engine for one call.
#[derive(Default)]
pub struct Hooks<'a> {
    pub rtc: Option<&'a mut dyn RtcSource>,
    pub stream: Option<&'a mut dyn AvStream>,
}

impl<'a> Hooks<'a> {
    #[must_use]
    pub fn new(rtc: Option<&'a mut dyn RtcSource>, stream: Option<&'a mut dyn AvStream>) -> Self {
        Self { rtc, stream }
    }

    /// Hooks with only an AV stream.
    #[must_use]
    pub fn stream(stream: &'a mut dyn AvStream) -> Self {
        Self {
            rtc: None,
            stream: Some(stream),
        }
    }
}

/// An mGBA GBA core instance.
///
/// Every method maps onto one `mCore` call or board field access.
pub trait MgbaEngine: Sized {
    /// Allocate and initialise a GBA core. `None` if either step fails.
    fn create() -> Option<Self>;

    /// Replace the process-wide default logger.
    fn set_default_logger(sink: LogSink);

    fn load_config(&mut self, config: &EngineConfig);

    /// Take ownership of a ROM image. `false` if the engine rejects it.
    fn load_rom(&mut self, rom: Vec<u8>) -> bool;

    /// Load a BIOS image. `false` if the engine rejects it.
    fn load_bios(&mut self, bios: &[u8]) -> bool;

    /// Attach battery storage. The engine owns the file from here on.
    fn load_save(&mut self, file: SaveFile);

    fn save_file(&self) -> Option<&SaveFile>;

    fn save_file_mut(&mut self) -> Option<&mut SaveFile>;

    /// Master clock frequency in Hz.
    fn frequency(&self) -> u32;

    /// Native audio sample rate in Hz.
    fn audio_sample_rate(&self) -> u32;

    fn reset(&mut self, hooks: Hooks<'_>);

    /// Game code from the loaded ROM header.
    fn game_code(&self) -> [u8; 4];

    /// Built-in override table lookup.
    fn find_override(&self, id: [u8; 4]) -> Option<CartridgeOverride>;

    fn set_override(&mut self, cart: &CartridgeOverride);

    /// Hardware devices currently attached.
    fn hardware(&self) -> Hardware;

    fn set_hardware(&mut self, hardware: Hardware);

    fn set_idle_optimization(&mut self, mode: IdleOptimization);

    /// Re-run the RTC chip's power-on initialisation.
    fn init_rtc_hardware(&mut self);

    /// Bytes of save storage the detected save chip uses.
    fn savedata_size(&self) -> usize;

    /// Free-running master clock counter.
    fn current_time(&self) -> u32;

    fn set_keys(&mut self, keys: u16);

    fn run_frame(&mut self, hooks: Hooks<'_>);

    /// Last complete frame, one 15-bit pixel per entry.
    fn video_buffer(&self) -> &[u16];

    /// Serialize the core. `None` on failure.
    fn save_state(&mut self, flags: StateFlags, hooks: Hooks<'_>) -> Option<Vec<u8>>;

    fn load_state(&mut self, state: &[u8], flags: StateFlags, hooks: Hooks<'_>) -> bool;

    /// Memory block mapped at bus address `base`.
    fn memory_block(&mut self, base: u32) -> Option<&mut [u8]>;
}
