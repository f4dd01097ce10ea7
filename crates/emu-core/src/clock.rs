//! Master clock configuration.

/// Master clock of an emulated system.
///
/// Cycle counts reported by `advance` and consumed by the virtual RTC are
/// ticks of this clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Crystal frequency in Hz (`16_777_216` for the GBA).
    pub frequency_hz: u32,
}

/// GBA system clock, 2^24 Hz.
pub const GBA_CLOCK: MasterClock = MasterClock::new(16_777_216);

/// Cycles in one GBA video frame (228 lines of 1232 cycles).
pub const GBA_CYCLES_PER_FRAME: u32 = 280_896;

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u32) -> Self {
        Self { frequency_hz }
    }
}

