//! Memory export table.
//!
//! A core exposes a few regions of live emulated memory to the host without
//! copying. [`MemoryRegion`] is the per-core selector used by
//! `getMemoryBlock`; [`MemExport`] names the process-scope slots a host can
//! read directly as exported symbols (`GSE_<REGION>_PTR` / `GSE_<REGION>_LEN`).
//!
//! Every view aliases memory owned by one core instance and is valid only
//! while that instance is alive. Cores retract their exports on drop with
//! [`retract_within`].

// The exported statics need unmangled symbol names.
#![allow(unsafe_code)]

mod exports;

pub use exports::{
    MemExport, clear_mem_export, export_helper_set_mem_export, mem_export, retract_within,
    set_mem_export,
};

/// Region selector accepted by `getMemoryBlock`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// Internal work RAM (32 KiB at `0x0300_0000`).
    Iwram = 0,
    /// External work RAM (256 KiB at `0x0200_0000`).
    Ewram = 1,
    /// Cartridge save RAM. Reported at capacity, not occupied size.
    Sram = 2,
}

impl MemoryRegion {
    pub const ALL: [Self; 3] = [Self::Iwram, Self::Ewram, Self::Sram];

    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Iwram),
            1 => Some(Self::Ewram),
            2 => Some(Self::Sram),
            _ => None,
        }
    }

    /// Bus address the region is mapped at.
    #[must_use]
    pub const fn base_address(self) -> Option<u32> {
        match self {
            Self::Iwram => Some(0x0300_0000),
            Self::Ewram => Some(0x0200_0000),
            Self::Sram => None,
        }
    }
}

/// A borrowed (pointer, length) descriptor for one region.
///
/// Holds no lifetime: the owner guarantees validity for as long as the
/// view is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryView {
    ptr: *mut u8,
    len: usize,
}

impl MemoryView {
    /// The null view: no region.
    pub const NULL: Self = Self {
        ptr: std::ptr::null_mut(),
        len: 0,
    };

    #[must_use]
    pub fn of(block: &mut [u8]) -> Self {
        Self {
            ptr: block.as_mut_ptr(),
            len: block.len(),
        }
    }

    #[must_use]
    pub const fn from_raw_parts(ptr: *mut u8, len: usize) -> Self {
        Self { ptr, len }
    }

    #[must_use]
    pub const fn as_ptr(self) -> *mut u8 {
        self.ptr
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.ptr.is_null() || self.len == 0
    }

    /// True if this view starts inside `[base, base + len)`.
    #[must_use]
    pub fn starts_within(self, base: *const u8, len: usize) -> bool {
        let start = base as usize;
        let ptr = self.ptr as usize;
        !self.ptr.is_null() && ptr >= start && ptr - start < len
    }
}

impl From<Option<&mut [u8]>> for MemoryView {
    fn from(block: Option<&mut [u8]>) -> Self {
        block.map_or(Self::NULL, Self::of)
    }
}
