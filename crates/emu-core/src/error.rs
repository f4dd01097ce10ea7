//! Error types shared by every core.

use save_codec::{CacheError, CodecError};
use thiserror::Error;

/// Why a core could not be created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("BIOS is {actual} bytes, expected {expected}")]
    BiosLength { expected: usize, actual: usize },
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("emulation engine could not be instantiated")]
    EngineUnavailable,
    #[error("emulation engine failed to initialise: {0}")]
    EngineInit(String),
    #[error("ROM rejected by the engine")]
    RomRejected,
    #[error("BIOS rejected by the engine")]
    BiosRejected,
}

impl From<CodecError> for CoreError {
    fn from(err: CodecError) -> Self {
        Self::OutOfMemory(err.to_string())
    }
}

/// Why a save state operation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("no state prepared; query the state length first")]
    NotPrepared,
    #[error("state needs {needed} bytes but the buffer holds {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("state payload is corrupt: {0}")]
    Corrupt(String),
    #[error("this core does not support save states")]
    Unsupported,
}

impl From<CacheError> for StateError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotPrepared => Self::NotPrepared,
            CacheError::BufferTooSmall { needed, available } => {
                Self::BufferTooSmall { needed, available }
            }
        }
    }
}
