//! Unified contract for frame-stepped emulation cores.
//!
//! Backends wrap very different emulation engines. This crate defines the
//! one surface a host sees: the [`EmuCore`] trait, its option, button and
//! error types, and the [`abi`] module that turns any core into a flat set
//! of `extern "C"` entry points.

pub mod abi;
mod buttons;
mod clock;
mod error;
mod machine;
mod null_core;
mod options;

pub use buttons::Buttons;
pub use clock::{GBA_CLOCK, GBA_CYCLES_PER_FRAME, MasterClock};
pub use error::{CoreError, StateError};
pub use machine::{AudioConfig, EmuCore, FrameOutput, VideoConfig, check_bios_len};
pub use null_core::NullCore;
pub use options::CoreOptions;

pub use color_lut::{ColorCurve, ColorLut};
pub use mem_export::{MemExport, MemoryRegion, MemoryView};
