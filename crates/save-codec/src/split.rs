//! Save data layout: bulk bytes, then an optional fixed-size RTC tail.
//!
//! Bulk save storage always comes in multiples of [`SPLIT_ALIGN`] bytes;
//! RTC buffers are smaller than that. So the remainder `len % SPLIT_ALIGN`
//! of an incoming blob is taken as the RTC tail only when it has exactly
//! the expected size. Any other remainder is ignored and the existing RTC
//! state is left alone.

/// Granularity of bulk save storage.
pub const SPLIT_ALIGN: usize = 0x100;

/// An incoming save data blob divided into its segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSplit<'a> {
    /// Everything up to the last [`SPLIT_ALIGN`] boundary.
    pub bulk: &'a [u8],
    /// The trailing RTC buffer, present only on an exact size match.
    pub rtc: Option<&'a [u8]>,
}

/// Divide `data` into bulk bytes and an RTC tail of `rtc_len` bytes.
///
/// A zero `rtc_len` never yields a tail.
#[must_use]
pub fn split_save_data(data: &[u8], rtc_len: usize) -> SaveSplit<'_> {
    let tail = data.len() % SPLIT_ALIGN;
    let (bulk, rest) = data.split_at(data.len() - tail);
    let rtc = (rtc_len != 0 && tail == rtc_len).then_some(rest);
    SaveSplit { bulk, rtc }
}

/// Total length of `bulk ++ rtc`.
#[must_use]
pub fn joined_len(bulk: &[u8], rtc: &[u8]) -> usize {
    bulk.len() + rtc.len()
}

/// Write `bulk` then `rtc` into `dest`, truncating at its end.
///
/// Returns the number of bytes written.
pub fn join_save_data(bulk: &[u8], rtc: &[u8], dest: &mut [u8]) -> usize {
    let head = bulk.len().min(dest.len());
    dest[..head].copy_from_slice(&bulk[..head]);
    let rest = &mut dest[head..];
    let tail = rtc.len().min(rest.len());
    rest[..tail].copy_from_slice(&rtc[..tail]);
    head + tail
}
