//! Process-scope export slots.
//!
//! Each slot is a pair of unmangled statics a host can resolve by name.
//! Atomics share the layout of the plain pointer and `usize` they wrap.

use std::ffi::c_void;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use tracing::debug;

use crate::MemoryView;

macro_rules! export_slots {
    ($($variant:ident => $ptr:ident, $len:ident;)+) => {
        /// Process-scope export slot identifiers.
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MemExport {
            $($variant,)+
        }

        $(
            #[unsafe(no_mangle)]
            #[used]
            pub static $ptr: AtomicPtr<u8> = AtomicPtr::new(std::ptr::null_mut());
            #[unsafe(no_mangle)]
            #[used]
            pub static $len: AtomicUsize = AtomicUsize::new(0);
        )+

        impl MemExport {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            #[must_use]
            pub fn from_raw(raw: u32) -> Option<Self> {
                Self::ALL.get(raw as usize).copied()
            }

            fn slot(self) -> (&'static AtomicPtr<u8>, &'static AtomicUsize) {
                match self {
                    $(Self::$variant => (&$ptr, &$len),)+
                }
            }
        }
    };
}

export_slots! {
    GbWram => GSE_GB_WRAM_PTR, GSE_GB_WRAM_LEN;
    GbSram => GSE_GB_SRAM_PTR, GSE_GB_SRAM_LEN;
    GbHram => GSE_GB_HRAM_PTR, GSE_GB_HRAM_LEN;
    GbaIwram => GSE_GBA_IWRAM_PTR, GSE_GBA_IWRAM_LEN;
    GbaEwram => GSE_GBA_EWRAM_PTR, GSE_GBA_EWRAM_LEN;
    GbaSram => GSE_GBA_SRAM_PTR, GSE_GBA_SRAM_LEN;
}

/// Publish `view` in slot `which`.
///
/// The pointer is nulled while the length changes, so a reader never pairs
/// a new pointer with a stale length.
pub fn set_mem_export(which: MemExport, view: MemoryView) {
    let (ptr, len) = which.slot();
    ptr.store(std::ptr::null_mut(), Ordering::Release);
    len.store(view.len(), Ordering::Release);
    ptr.store(view.as_ptr(), Ordering::Release);
}

/// Read slot `which`.
#[must_use]
pub fn mem_export(which: MemExport) -> MemoryView {
    let (ptr, len) = which.slot();
    let base = ptr.load(Ordering::Acquire);
    MemoryView::from_raw_parts(base, len.load(Ordering::Acquire))
}

pub fn clear_mem_export(which: MemExport) {
    set_mem_export(which, MemoryView::NULL);
}

/// Clear every slot whose pointer lies inside `[base, base + len)`.
///
/// Returns the number of slots cleared.
pub fn retract_within(base: *const u8, len: usize) -> usize {
    let mut cleared = 0;
    for &which in MemExport::ALL {
        if mem_export(which).starts_within(base, len) {
            clear_mem_export(which);
            debug!(?which, "retracted memory export");
            cleared += 1;
        }
    }
    cleared
}

/// C entry point: publish `(ptr, len)` in slot `which`. Unknown slots are ignored.
#[unsafe(no_mangle)]
pub extern "C" fn export_helper_set_mem_export(which: u32, ptr: *mut c_void, len: usize) {
    if let Some(which) = MemExport::from_raw(which) {
        set_mem_export(which, MemoryView::from_raw_parts(ptr.cast(), len));
    }
}
