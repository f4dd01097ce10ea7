//! Adapter-owned battery files.

use save_codec::{join_save_data, joined_len, split_save_data};
use tracing::debug;

use crate::engine::BatteryProvider;

/// Save memory file extension.
pub const SAV_EXTENSION: &str = ".sav";

/// RTC register file extension.
pub const RTC_EXTENSION: &str = ".rtc";

/// The `.sav` and `.rtc` segments of one cartridge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatteryStore {
    sav: Vec<u8>,
    rtc: Vec<u8>,
}

impl BatteryStore {
    #[must_use]
    pub fn sav(&self) -> &[u8] {
        &self.sav
    }

    #[must_use]
    pub fn rtc(&self) -> &[u8] {
        &self.rtc
    }

    /// Length of the joined save data.
    #[must_use]
    pub fn len(&self) -> usize {
        joined_len(&self.sav, &self.rtc)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `.sav ++ .rtc` into `dest`. Returns the bytes written.
    pub fn write_joined(&self, dest: &mut [u8]) -> usize {
        join_save_data(&self.sav, &self.rtc, dest)
    }

    /// Overwrite the segments in place from a joined blob.
    ///
    /// Segment sizes never change. The bulk part fills at most the `.sav`
    /// segment and the tail replaces `.rtc` only on an exact size match.
    pub fn inject(&mut self, data: &[u8]) {
        let split = split_save_data(data, self.rtc.len());
        let bulk = split.bulk.len().min(self.sav.len());
        self.sav[..bulk].copy_from_slice(&split.bulk[..bulk]);
        match split.rtc {
            Some(rtc) => self.rtc.copy_from_slice(rtc),
            None if !self.rtc.is_empty() => {
                debug!(len = data.len(), "save data carries no matching RTC tail");
            }
            None => {}
        }
    }
}

impl BatteryProvider for BatteryStore {
    fn save_battery(&mut self, extension: &str, data: &[u8]) {
        let segment = match extension {
            SAV_EXTENSION => &mut self.sav,
            RTC_EXTENSION => &mut self.rtc,
            _ => return,
        };
        segment.clear();
        segment.extend_from_slice(data);
    }

    fn load_battery(&self, extension: &str) -> Vec<u8> {
        match extension {
            SAV_EXTENSION => self.sav.clone(),
            RTC_EXTENSION => self.rtc.clone(),
            _ => Vec::new(),
        }
    }
}
