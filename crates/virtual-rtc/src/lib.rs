//! Virtual real-time clock.
//!
//! Wall-clock seconds are derived from emulated cycles, never from the host
//! clock, so a replayed cycle-exact session reads back the same times. The
//! clock is a unix timestamp plus a sub-second cycle accumulator that always
//! stays below the backend's cycle frequency.
//!
//! State is persisted as a fixed 24-byte little-endian record:
//!
//! | offset | size | field                             |
//! |--------|------|-----------------------------------|
//! | 0      | 8    | magic `"GSERTCST"`                |
//! | 8      | 8    | unix time (i64)                   |
//! | 16     | 4    | cycle accumulator (u32)           |
//! | 20     | 4    | zero padding                      |

use tracing::debug;

/// Record tag: the bytes `GSERTCST` read as a little-endian u64.
pub const RTC_MAGIC: u64 = u64::from_le_bytes(*b"GSERTCST");

/// Size of a serialized state record.
pub const STATE_LEN: usize = 24;

/// Why a state record was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Payload length was not exactly [`STATE_LEN`].
    Length(usize),
    /// Magic tag did not match [`RTC_MAGIC`].
    Magic(u64),
}

/// Outcome of [`VirtualRtc::deserialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// State was taken from the record.
    Restored,
    /// Record was ignored; the clock is unchanged.
    Rejected(Rejection),
}

/// Cycle-driven calendar clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualRtc {
    unix_time: i64,
    cycles: u32,
    frequency: u32,
    restored: bool,
}

impl VirtualRtc {
    /// Start a clock at `start_time` for a backend clocked at `frequency` Hz.
    ///
    /// A zero frequency is treated as 1 Hz.
    #[must_use]
    pub fn new(start_time: i64, frequency: u32) -> Self {
        Self {
            unix_time: start_time,
            cycles: 0,
            frequency: frequency.max(1),
            restored: false,
        }
    }

    /// Current time in whole seconds since the unix epoch.
    #[must_use]
    pub fn unix_time(&self) -> i64 {
        self.unix_time
    }

    /// Cycles accumulated towards the next second.
    #[must_use]
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Backend cycles per second.
    #[must_use]
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Account for `elapsed` emulated cycles, carrying whole seconds.
    pub fn tick(&mut self, elapsed: u32) {
        let frequency = u64::from(self.frequency);
        let total = u64::from(self.cycles) + u64::from(elapsed);
        self.unix_time += (total / frequency) as i64;
        self.cycles = (total % frequency) as u32;
    }

    /// Restart the clock at `start_time` with an empty accumulator.
    pub fn reset_to(&mut self, start_time: i64) {
        self.unix_time = start_time;
        self.cycles = 0;
    }

    /// Encode the clock as a state record.
    #[must_use]
    pub fn serialize(&self) -> [u8; STATE_LEN] {
        let mut record = [0u8; STATE_LEN];
        record[0..8].copy_from_slice(&RTC_MAGIC.to_le_bytes());
        record[8..16].copy_from_slice(&self.unix_time.to_le_bytes());
        record[16..20].copy_from_slice(&self.cycles.to_le_bytes());
        record
    }

    /// Decode a state record.
    ///
    /// On acceptance the accumulator is reduced modulo the current frequency
    /// and the clock is marked restored. On rejection nothing changes.
    pub fn deserialize(&mut self, record: &[u8]) -> Restore {
        let Ok(record) = <&[u8; STATE_LEN]>::try_from(record) else {
            debug!(len = record.len(), "ignoring RTC record with wrong length");
            return Restore::Rejected(Rejection::Length(record.len()));
        };

        let magic = u64::from_le_bytes(field(record, 0));
        if magic != RTC_MAGIC {
            debug!("ignoring RTC record with bad magic {magic:#018X}");
            return Restore::Rejected(Rejection::Magic(magic));
        }

        self.unix_time = i64::from_le_bytes(field(record, 8));
        self.cycles = u32::from_le_bytes(field(record, 16)) % self.frequency;
        self.restored = true;
        Restore::Restored
    }

    /// Clear the restored mark ahead of a load that may carry a record.
    pub fn begin_restore(&mut self) {
        self.restored = false;
    }

    /// After a load: fall back to `start_time` unless a record was accepted.
    ///
    /// Returns `true` if the fallback was applied.
    pub fn finish_restore(&mut self, start_time: i64) -> bool {
        if self.restored {
            return false;
        }
        self.reset_to(start_time);
        true
    }
}

fn field<const N: usize>(record: &[u8; STATE_LEN], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&record[offset..offset + N]);
    out
}
