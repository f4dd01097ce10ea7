//! Colour lookup tables for 15-bit handheld pixels.
//!
//! Backends hand us pixels as `0bBBBBBGGGGGRRRRR` (bit 15 is ignored). A
//! [`ColorLut`] maps every one of the 32,768 possible values to a final,
//! fully opaque ARGB32 colour, so producing a video frame is one table index
//! per pixel and nothing else.
//!
//! Tables can be supplied by the host or generated from one of the
//! [`ColorCurve`]s, which follow SameBoy's colour correction formulas.

use thiserror::Error;

/// Number of entries in a colour table (one per 15-bit colour).
pub const LUT_LEN: usize = 0x8000;

/// Mask selecting the 15 colour bits of a native pixel.
pub const COLOR_MASK: u16 = 0x7FFF;

const OPAQUE: u32 = 0xFF00_0000;

const GAMMA: f64 = 2.2;

const CGB_CURVE: [u8; 32] = [
    0, 6, 12, 20, 28, 36, 45, 56, 66, 76, 88, 100, 113, 125, 137, 149, 161, 172, 182, 192, 202,
    210, 218, 225, 232, 238, 243, 247, 250, 252, 254, 255,
];

const AGB_CURVE: [u8; 32] = [
    0, 3, 8, 14, 20, 26, 33, 40, 47, 54, 62, 70, 78, 86, 94, 103, 112, 120, 129, 138, 147, 157,
    166, 176, 185, 195, 205, 215, 225, 235, 245, 255,
];

const SGB_CURVE: [u8; 32] = [
    0, 2, 5, 9, 15, 20, 27, 34, 42, 50, 58, 67, 76, 85, 94, 104, 114, 123, 133, 143, 153, 163,
    173, 182, 192, 202, 211, 220, 229, 238, 247, 255,
];

/// Errors from building a table out of host-supplied data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LutError {
    #[error("colour table has {0} entries, expected {LUT_LEN}")]
    WrongLength(usize),
}

/// Colour correction curve used to generate a table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ColorCurve {
    /// Linear 5-bit to 8-bit expansion, no correction.
    #[default]
    TrueColor,
    /// Game Boy Color LCD.
    Cgb,
    /// Game Boy Advance LCD ("modern balanced").
    Agb,
    /// Super Game Boy on a CRT.
    Sgb,
}

impl ColorCurve {
    /// Map one set of 5-bit channels to an opaque ARGB32 colour.
    #[must_use]
    pub fn map(self, r: u8, g: u8, b: u8) -> u32 {
        let (r, g, b) = match self {
            Self::TrueColor => (expand(r), expand(g), expand(b)),
            Self::Cgb => curve_with_green_mix(&CGB_CURVE, r, g, b, 3.0),
            Self::Agb => curve_with_green_mix(&AGB_CURVE, r, g, b, 5.0),
            Self::Sgb => (
                SGB_CURVE[r as usize],
                SGB_CURVE[g as usize],
                SGB_CURVE[b as usize],
            ),
        };
        pack(r, g, b)
    }
}

fn expand(c: u8) -> u8 {
    ((u32::from(c) * 0xFF + 0xF) / 0x1F) as u8
}

/// Apply a channel curve, then blend green towards blue in linear light.
///
/// `weight` is how many parts green to one part blue.
fn curve_with_green_mix(curve: &[u8; 32], r: u8, g: u8, b: u8, weight: f64) -> (u8, u8, u8) {
    let r = curve[r as usize];
    let mut g = curve[g as usize];
    let b = curve[b as usize];

    if g != b {
        let lin_g = (f64::from(g) / 255.0).powf(GAMMA);
        let lin_b = (f64::from(b) / 255.0).powf(GAMMA);
        let mixed = ((lin_g * weight + lin_b) / (weight + 1.0)).powf(1.0 / GAMMA);
        g = (mixed * 255.0).round() as u8;
    }

    (r, g, b)
}

fn pack(r: u8, g: u8, b: u8) -> u32 {
    OPAQUE | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)
}

/// A 32,768-entry colour table.
#[derive(Clone, PartialEq, Eq)]
pub struct ColorLut {
    table: Box<[u32; LUT_LEN]>,
}

impl ColorLut {
    /// Generate a table from a colour curve.
    #[must_use]
    pub fn generate(curve: ColorCurve) -> Self {
        let mut table = Box::new([0u32; LUT_LEN]);
        for (i, entry) in table.iter_mut().enumerate() {
            let r = (i & 0x1F) as u8;
            let g = ((i >> 5) & 0x1F) as u8;
            let b = ((i >> 10) & 0x1F) as u8;
            *entry = curve.map(r, g, b);
        }
        Self { table }
    }

    /// Build a table from host-supplied entries.
    ///
    /// Entry `r | g << 5 | b << 10` is the output for that colour.
    pub fn from_slice(entries: &[u32]) -> Result<Self, LutError> {
        let table: Box<[u32; LUT_LEN]> = entries
            .to_vec()
            .into_boxed_slice()
            .try_into()
            .map_err(|_| LutError::WrongLength(entries.len()))?;
        Ok(Self { table })
    }

    /// Replace every entry with the given table.
    pub fn copy_from(&mut self, other: &ColorLut) {
        self.table.copy_from_slice(other.table.as_slice());
    }

    /// Look up the output colour for a native pixel. Bit 15 is ignored.
    #[must_use]
    pub fn lookup(&self, pixel: u16) -> u32 {
        self.table[(pixel & COLOR_MASK) as usize]
    }

    /// Translate a whole frame. Stops at the shorter of the two buffers.
    pub fn apply(&self, src: &[u16], dst: &mut [u32]) {
        for (out, &px) in dst.iter_mut().zip(src) {
            *out = self.lookup(px);
        }
    }

    /// Raw table entries.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        self.table.as_slice()
    }
}

impl Default for ColorLut {
    fn default() -> Self {
        Self::generate(ColorCurve::TrueColor)
    }
}

impl std::fmt::Debug for ColorLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorLut")
            .field("black", &format_args!("{:#010X}", self.table[0]))
            .field("white", &format_args!("{:#010X}", self.table[LUT_LEN - 1]))
            .finish()
    }
}
