//! Per-instance creation options.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options passed to [`EmuCore::create`](crate::EmuCore::create).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreOptions {
    /// Remove cartridge RTC hardware even if the title has it.
    pub force_disable_rtc: bool,
    /// Unix time the RTC starts from.
    pub rtc_start_time: i64,
}

impl CoreOptions {
    #[must_use]
    pub const fn new(force_disable_rtc: bool, rtc_start_time: i64) -> Self {
        Self {
            force_disable_rtc,
            rtc_start_time,
        }
    }
}
