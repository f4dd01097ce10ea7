//! mGBA-family GBA cores.
//!
//! Two targets share one engine seam ([`MgbaEngine`]):
//!
//! - [`MgbaCore`]: virtual RTC saved as state extdata, integer-repeat audio
//!   at the engine's maximum rate, upstream PNG states accepted on load.
//! - [`MgbaBlipCore`]: RTC hardware state in a save data tail, banked audio
//!   at 32768 Hz, AGB colour correction by default.
//!
//! The engine itself is supplied by the embedder as an [`MgbaEngine`]
//! implementation.

mod blip;
pub mod engine;
mod extdata;
pub mod log;
pub mod png_state;
mod rtc;
pub mod setup;

pub use blip::{FRAME_CEILING, MgbaBlipCore, OUTPUT_RATE};
pub use engine::{
    AvStream, CartridgeOverride, EngineConfig, Hardware, Hooks, IdleOptimization, LogLevel,
    LogSink, MgbaEngine, RtcSource, SaveType, StateFlags,
};
pub use extdata::{AUDIO_RING_FRAMES, MgbaCore, max_audio_rate};
pub use png_state::PngStateError;
pub use setup::{BIOS_LEN, RTC_BUFFER_LEN, SAVE_CAPACITY};
