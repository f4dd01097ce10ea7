//! Creation steps and accessors shared by both mGBA targets.

use emu_core::{CoreError, MemoryRegion, check_bios_len};
use save_codec::{SaveFile, try_alloc};
use tracing::debug;

use crate::engine::{EngineConfig, MgbaEngine};
use crate::log::install_default_logger;

/// GBA BIOS size.
pub const BIOS_LEN: usize = 0x4000;

/// Size of the RTC buffer mGBA appends to save storage.
pub const RTC_BUFFER_LEN: usize = 16;

/// Save file backing: the largest save chip (1 Mbit flash) plus the RTC
/// buffer.
pub const SAVE_CAPACITY: usize = 0x20000 + RTC_BUFFER_LEN;

/// Save file fill before any data is loaded.
pub const SAVE_FILL: u8 = 0xFF;

/// Create an engine with config, ROM, BIOS and a blank save loaded.
///
/// `truncate_save` empties the save file before it is attached, so the
/// engine grows it to whatever the cartridge needs.
pub fn bring_up<E: MgbaEngine>(
    rom: &[u8],
    bios: &[u8],
    config: &EngineConfig,
    truncate_save: bool,
) -> Result<E, CoreError> {
    install_default_logger::<E>();
    check_bios_len(bios, BIOS_LEN)?;

    let mut engine = E::create().ok_or(CoreError::EngineUnavailable)?;
    engine.load_config(config);

    let mut rom_copy = try_alloc(rom.len(), 0)?;
    rom_copy.copy_from_slice(rom);
    if !engine.load_rom(rom_copy) {
        return Err(CoreError::RomRejected);
    }
    if !engine.load_bios(bios) {
        return Err(CoreError::BiosRejected);
    }

    let mut save = SaveFile::blank(SAVE_CAPACITY, SAVE_FILL)?;
    if truncate_save {
        save.truncate(0);
    }
    engine.load_save(save);

    debug!(rom_len = rom.len(), code = ?engine.game_code(), "mGBA engine loaded");
    Ok(engine)
}

/// Live view of one region. SRAM is the whole save file backing.
pub fn region_block<E: MgbaEngine>(engine: &mut E, region: MemoryRegion) -> Option<&mut [u8]> {
    match region.base_address() {
        Some(base) => engine.memory_block(base),
        None => engine.save_file_mut().map(SaveFile::backing_mut),
    }
}
