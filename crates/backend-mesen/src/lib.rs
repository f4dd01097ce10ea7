//! Mesen GBA core.
//!
//! [`MesenCore`] drives any [`MesenEngine`] through the unified
//! [`EmuCore`](emu_core::EmuCore) contract: 48 kHz audio collected per
//! frame, battery files joined into one save blob and save states carrying
//! engine settings alongside the console.

mod audio;
pub mod battery;
mod console;
pub mod engine;

pub use audio::{AudioCollector, COLLECT_FRAMES, SAMPLE_RATE};
pub use battery::{BatteryStore, RTC_EXTENSION, SAV_EXTENSION};
pub use console::{BIOS_LEN, MesenCore, creation_settings, pad_rom};
pub use engine::{
    AudioProvider, AudioSettings, BatteryProvider, ControllerType, GbaSettings, MemoryType,
    MesenEngine, RamState, RtcType, Settings,
};
