//! Engine log forwarding.

use once_cell::sync::OnceCell;
use tracing::{debug, error, info, trace, warn};

use crate::engine::{LogLevel, MgbaEngine};

static DEFAULT_LOGGER: OnceCell<()> = OnceCell::new();

/// Route engine log lines into `tracing` under the `mgba` target.
pub fn forward_engine_log(level: LogLevel, category: &str, message: &str) {
    match level {
        LogLevel::Fatal | LogLevel::Error => error!(target: "mgba", category, "{message}"),
        LogLevel::Warn | LogLevel::GameError => warn!(target: "mgba", category, "{message}"),
        LogLevel::Info => info!(target: "mgba", category, "{message}"),
        LogLevel::Debug => debug!(target: "mgba", category, "{message}"),
        LogLevel::Stub => trace!(target: "mgba", category, "{message}"),
    }
}

/// Install [`forward_engine_log`] as the engine's default logger.
///
/// Only the first call in a process does anything.
pub fn install_default_logger<E: MgbaEngine>() {
    DEFAULT_LOGGER.get_or_init(|| {
        E::set_default_logger(forward_engine_log);
        debug!("installed mGBA default logger");
    });
}

/// True once a default logger has been installed in this process.
#[must_use]
pub fn default_logger_installed() -> bool {
    DEFAULT_LOGGER.get().is_some()
}
