//! Persistent data handling shared by every backend.
//!
//! Save data and save states both cross the host boundary through a
//! two-call protocol: ask for a length, allocate exactly that much, then
//! fetch. The types here hold the backend side of that protocol.
//!
//! - [`SaveFile`]: a fixed-capacity, memory-backed file an engine writes its
//!   battery storage into.
//! - [`split_save_data`] / [`join_save_data`]: the bulk-plus-RTC-tail layout
//!   of a save data blob.
//! - [`StateCache`]: the one-shot snapshot cache behind `state length` /
//!   `save state`.

mod save_file;
mod split;
mod state_cache;

pub use save_file::SaveFile;
pub use split::{SPLIT_ALIGN, SaveSplit, join_save_data, joined_len, split_save_data};
pub use state_cache::{CacheError, StateCache};

use thiserror::Error;

/// Storage could not be set up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("failed to allocate {requested} bytes of save storage")]
    OutOfMemory { requested: usize },
}

/// Allocate a `fill`-initialised buffer, reporting failure instead of aborting.
pub fn try_alloc(len: usize, fill: u8) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| CodecError::OutOfMemory { requested: len })?;
    buf.resize(len, fill);
    Ok(buf)
}
