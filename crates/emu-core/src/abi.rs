//! C ABI glue.
//!
//! Hosts hold a core as an opaque handle and call a flat set of
//! `extern "C"` functions on it. The generic functions here implement those
//! entry points for any [`EmuCore`]; [`export_core_abi!`] stamps out the
//! unmangled symbols for one concrete core type.
//!
//! Failures are collapsed to the C conventions: a null handle from create,
//! `false` from state operations and 0 from length queries. The underlying
//! error is logged.
//!
//! [`export_core_abi!`]: crate::export_core_abi

#![allow(unsafe_code)]

use std::ffi::c_void;

use color_lut::{ColorLut, LUT_LEN};
use mem_export::{MemoryRegion, MemoryView, retract_within};
use tracing::{debug, warn};

use crate::{Buttons, CoreOptions, EmuCore};

/// Borrow `len` bytes at `ptr`, treating null as empty.
///
/// # Safety
///
/// A non-null `ptr` must be valid for reads of `len` bytes for `'a`.
unsafe fn bytes<'a>(ptr: *const u8, len: u32) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    unsafe { std::slice::from_raw_parts(ptr, len as usize) }
}

/// Mutably borrow `len` items at `ptr`, treating null as empty.
///
/// # Safety
///
/// A non-null `ptr` must be valid for writes of `len` items for `'a`.
unsafe fn buffer<'a, T>(ptr: *mut T, len: usize) -> &'a mut [T] {
    if ptr.is_null() || len == 0 {
        return &mut [];
    }
    unsafe { std::slice::from_raw_parts_mut(ptr, len) }
}

/// # Safety
///
/// `ctx` must be null or a live handle returned by [`create`] for `T`.
unsafe fn handle<'a, T: EmuCore>(ctx: *mut c_void) -> Option<&'a mut T> {
    unsafe { ctx.cast::<T>().as_mut() }
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(0)
}

/// Create a core. Returns null on any failure, with nothing left allocated.
///
/// # Safety
///
/// `rom` and `bios` must be null or valid for their lengths.
pub unsafe fn create<T: EmuCore>(
    rom: *const u8,
    rom_len: u32,
    bios: *const u8,
    bios_len: u32,
    force_disable_rtc: bool,
    rtc_start_time: i64,
) -> *mut c_void {
    let (rom, bios) = unsafe { (bytes(rom, rom_len), bytes(bios, bios_len)) };
    let options = CoreOptions::new(force_disable_rtc, rtc_start_time);
    match T::create(rom, bios, &options) {
        Ok(core) => {
            debug!(core = T::NAME, rom_len, "core created");
            Box::into_raw(Box::new(core)).cast()
        }
        Err(err) => {
            warn!(core = T::NAME, %err, "core creation failed");
            std::ptr::null_mut()
        }
    }
}

/// Destroy a core and clear any process-scope exports pointing into it.
///
/// # Safety
///
/// `ctx` must be null or a live handle for `T`; it is invalid afterwards.
pub unsafe fn destroy<T: EmuCore>(ctx: *mut c_void) {
    if ctx.is_null() {
        return;
    }
    let mut core = unsafe { Box::from_raw(ctx.cast::<T>()) };
    for region in MemoryRegion::ALL {
        if let Some(block) = core.memory_block(region) {
            retract_within(block.as_ptr(), block.len());
        }
    }
    drop(core);
    debug!(core = T::NAME, "core destroyed");
}

/// # Safety
///
/// `ctx` must be a live handle for `T`; `lut` must be null or hold
/// [`LUT_LEN`] entries.
pub unsafe fn set_color_lut<T: EmuCore>(ctx: *mut c_void, lut: *const u32) {
    let Some(core) = (unsafe { handle::<T>(ctx) }) else {
        return;
    };
    if lut.is_null() {
        return;
    }
    let entries = unsafe { std::slice::from_raw_parts(lut, LUT_LEN) };
    match ColorLut::from_slice(entries) {
        Ok(table) => core.set_color_lut(&table),
        Err(err) => warn!(core = T::NAME, %err, "ignoring colour table"),
    }
}

/// # Safety
///
/// `ctx` must be a live handle for `T`. `video` and `sound` must be null or
/// sized per the core's video and audio configuration; `samples` and
/// `cpu_cycles` must be null or writable.
pub unsafe fn advance<T: EmuCore>(
    ctx: *mut c_void,
    buttons: u16,
    video: *mut u32,
    sound: *mut i16,
    samples: *mut u32,
    cpu_cycles: *mut u32,
) {
    let Some(core) = (unsafe { handle::<T>(ctx) }) else {
        return;
    };
    let video = unsafe { buffer(video, core.video_config().pixels()) };
    let sound = unsafe { buffer(sound, core.audio_config().buffer_len()) };
    let out = core.advance(Buttons::from_raw(buttons), video, sound);
    unsafe {
        if let Some(samples) = samples.as_mut() {
            *samples = len_u32(out.samples);
        }
        if let Some(cycles) = cpu_cycles.as_mut() {
            *cycles = out.cpu_cycles;
        }
    }
}

/// # Safety
///
/// `ctx` must be a live handle for `T`.
pub unsafe fn reset<T: EmuCore>(ctx: *mut c_void) {
    if let Some(core) = unsafe { handle::<T>(ctx) } {
        core.reset();
    }
}

/// # Safety
///
/// `ctx` must be a live handle for `T`.
pub unsafe fn save_data_len<T: EmuCore>(ctx: *mut c_void) -> u32 {
    unsafe { handle::<T>(ctx) }.map_or(0, |core| len_u32(core.save_data_len()))
}

/// Write save data to `dest`, which must hold [`save_data_len`] bytes.
///
/// # Safety
///
/// `ctx` must be a live handle for `T`; `dest` must be null or writable
/// for the current save data length.
pub unsafe fn save_data<T: EmuCore>(ctx: *mut c_void, dest: *mut u8) -> u32 {
    let Some(core) = (unsafe { handle::<T>(ctx) }) else {
        return 0;
    };
    let len = core.save_data_len();
    let dest = unsafe { buffer(dest, len) };
    len_u32(core.save_data(dest))
}

/// # Safety
///
/// `ctx` must be a live handle for `T`; `data` must be null or valid for
/// `len` bytes.
pub unsafe fn load_save_data<T: EmuCore>(
    ctx: *mut c_void,
    data: *const u8,
    len: u32,
    rtc_fallback: i64,
) {
    if let Some(core) = unsafe { handle::<T>(ctx) } {
        let data = unsafe { bytes(data, len) };
        core.load_save_data(data, rtc_fallback);
    }
}

/// # Safety
///
/// `ctx` must be a live handle for `T`.
pub unsafe fn rtc_time<T: EmuCore>(ctx: *mut c_void) -> i64 {
    unsafe { handle::<T>(ctx) }.map_or(0, |core| core.rtc_time())
}

/// # Safety
///
/// `ctx` must be a live handle for `T`.
pub unsafe fn save_state_len<T: EmuCore>(ctx: *mut c_void) -> u32 {
    let Some(core) = (unsafe { handle::<T>(ctx) }) else {
        return 0;
    };
    let len = core.save_state_len();
    if len == 0 {
        debug!(core = T::NAME, "state serialization failed");
    }
    len_u32(len)
}

/// Copy the state prepared by [`save_state_len`] into `dest`.
///
/// # Safety
///
/// `ctx` must be a live handle for `T`; `dest` must be null or writable for
/// the length last returned by [`save_state_len`].
pub unsafe fn save_state<T: EmuCore>(ctx: *mut c_void, dest: *mut u8) -> bool {
    let Some(core) = (unsafe { handle::<T>(ctx) }) else {
        return false;
    };
    let dest = unsafe { buffer(dest, core.prepared_state_len()) };
    match core.save_state(dest) {
        Ok(_) => true,
        Err(err) => {
            warn!(core = T::NAME, %err, "save state failed");
            false
        }
    }
}

/// # Safety
///
/// `ctx` must be a live handle for `T`; `data` must be null or valid for
/// `len` bytes.
pub unsafe fn load_state<T: EmuCore>(
    ctx: *mut c_void,
    data: *const u8,
    len: u32,
    rtc_fallback: i64,
) -> bool {
    let Some(core) = (unsafe { handle::<T>(ctx) }) else {
        return false;
    };
    let data = unsafe { bytes(data, len) };
    match core.load_state(data, rtc_fallback) {
        Ok(()) => true,
        Err(err) => {
            warn!(core = T::NAME, %err, "load state failed");
            false
        }
    }
}

/// Report one memory region. Unknown selectors and missing regions yield
/// a null pointer and zero length.
///
/// # Safety
///
/// `ctx` must be a live handle for `T`; `ptr` and `len` must be null or
/// writable.
pub unsafe fn memory_block<T: EmuCore>(
    ctx: *mut c_void,
    which: u32,
    ptr: *mut *mut c_void,
    len: *mut usize,
) {
    let view = match (unsafe { handle::<T>(ctx) }, MemoryRegion::from_raw(which)) {
        (Some(core), Some(region)) => MemoryView::from(core.memory_block(region)),
        _ => MemoryView::NULL,
    };
    unsafe {
        if let Some(ptr) = ptr.as_mut() {
            *ptr = view.as_ptr().cast();
        }
        if let Some(len) = len.as_mut() {
            *len = view.len();
        }
    }
}

/// Export the full C ABI for one core type under the given symbol names.
///
/// ```ignore
/// emu_core::export_core_abi!(MyCore {
///     create: my_create,
///     destroy: my_destroy,
///     set_color_lut: my_setcolorlut,
///     advance: my_advance,
///     reset: my_reset,
///     save_data_len: my_getsavedatalength,
///     save_data: my_savesavedata,
///     load_save_data: my_loadsavedata,
///     rtc_time: my_getrtctime,
///     save_state_len: my_getsavestatelength,
///     save_state: my_savestate,
///     load_state: my_loadstate,
///     memory_block: my_getmemoryblock,
/// });
/// ```
#[macro_export]
macro_rules! export_core_abi {
    ($core:ty {
        create: $create:ident,
        destroy: $destroy:ident,
        set_color_lut: $set_color_lut:ident,
        advance: $advance:ident,
        reset: $reset:ident,
        save_data_len: $save_data_len:ident,
        save_data: $save_data:ident,
        load_save_data: $load_save_data:ident,
        rtc_time: $rtc_time:ident,
        save_state_len: $save_state_len:ident,
        save_state: $save_state:ident,
        load_state: $load_state:ident,
        memory_block: $memory_block:ident $(,)?
    }) => {
        /// # Safety
        ///
        /// See [`emu_core::abi::create`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $create(
            rom: *const u8,
            rom_len: u32,
            bios: *const u8,
            bios_len: u32,
            force_disable_rtc: bool,
            rtc_start_time: i64,
        ) -> *mut ::std::ffi::c_void {
            unsafe {
                $crate::abi::create::<$core>(
                    rom,
                    rom_len,
                    bios,
                    bios_len,
                    force_disable_rtc,
                    rtc_start_time,
                )
            }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::destroy`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $destroy(ctx: *mut ::std::ffi::c_void) {
            unsafe { $crate::abi::destroy::<$core>(ctx) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::set_color_lut`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_color_lut(ctx: *mut ::std::ffi::c_void, lut: *const u32) {
            unsafe { $crate::abi::set_color_lut::<$core>(ctx, lut) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::advance`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $advance(
            ctx: *mut ::std::ffi::c_void,
            buttons: u16,
            video: *mut u32,
            sound: *mut i16,
            samples: *mut u32,
            cpu_cycles: *mut u32,
        ) {
            unsafe { $crate::abi::advance::<$core>(ctx, buttons, video, sound, samples, cpu_cycles) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::reset`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $reset(ctx: *mut ::std::ffi::c_void) {
            unsafe { $crate::abi::reset::<$core>(ctx) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::save_data_len`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $save_data_len(ctx: *mut ::std::ffi::c_void) -> u32 {
            unsafe { $crate::abi::save_data_len::<$core>(ctx) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::save_data`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $save_data(ctx: *mut ::std::ffi::c_void, dest: *mut u8) -> u32 {
            unsafe { $crate::abi::save_data::<$core>(ctx, dest) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::load_save_data`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $load_save_data(
            ctx: *mut ::std::ffi::c_void,
            data: *const u8,
            len: u32,
            rtc_fallback: i64,
        ) {
            unsafe { $crate::abi::load_save_data::<$core>(ctx, data, len, rtc_fallback) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::rtc_time`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $rtc_time(ctx: *mut ::std::ffi::c_void) -> i64 {
            unsafe { $crate::abi::rtc_time::<$core>(ctx) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::save_state_len`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $save_state_len(ctx: *mut ::std::ffi::c_void) -> u32 {
            unsafe { $crate::abi::save_state_len::<$core>(ctx) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::save_state`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $save_state(ctx: *mut ::std::ffi::c_void, dest: *mut u8) -> bool {
            unsafe { $crate::abi::save_state::<$core>(ctx, dest) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::load_state`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $load_state(
            ctx: *mut ::std::ffi::c_void,
            data: *const u8,
            len: u32,
            rtc_fallback: i64,
        ) -> bool {
            unsafe { $crate::abi::load_state::<$core>(ctx, data, len, rtc_fallback) }
        }

        /// # Safety
        ///
        /// See [`emu_core::abi::memory_block`].
        #[allow(unsafe_code)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $memory_block(
            ctx: *mut ::std::ffi::c_void,
            which: u32,
            ptr: *mut *mut ::std::ffi::c_void,
            len: *mut usize,
        ) {
            unsafe { $crate::abi::memory_block::<$core>(ctx, which, ptr, len) }
        }
    };
}
