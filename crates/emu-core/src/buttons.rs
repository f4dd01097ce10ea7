//! GBA key mask.

use bitflags::bitflags;

bitflags! {
    /// Pressed keys, in KEYINPUT bit order (1 = pressed).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        const A = 1 << 0;
        const B = 1 << 1;
        const SELECT = 1 << 2;
        const START = 1 << 3;
        const RIGHT = 1 << 4;
        const LEFT = 1 << 5;
        const UP = 1 << 6;
        const DOWN = 1 << 7;
        const R = 1 << 8;
        const L = 1 << 9;
    }
}

impl Buttons {
    /// Key mask from a raw host value. Bits above `L` are dropped.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self::from_bits_truncate(raw)
    }
}
