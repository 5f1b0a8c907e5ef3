//! Color conversion and compositing on premultiplied ARGB words.
//!
//! The multiply-shift approximations here are part of the pixel format
//! contract: `c * (a + 1) >> 8` for premultiplying and `* 0x8081 >> 23` in
//! place of `/ 255` when compositing. Consumers compare against these exact
//! roundings, so never swap them for true division.

use serde::{Deserialize, Serialize};

use crate::error::{check_opacity, Result};

// ============================================================================
// Blend Mode
// ============================================================================

/// How a primitive combines its color with the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Overwrite the destination unconditionally
    None,
    /// Source-over compositing on premultiplied colors
    #[default]
    Alpha,
}

// ============================================================================
// Color
// ============================================================================

/// Straight (non-premultiplied) ARGB color, the external representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::from_argb(0, 0, 0, 0);
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Fully opaque color
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }

    /// Premultiply and pack into a single ARGB word.
    /// A zero alpha always packs to exactly 0.
    #[inline]
    pub const fn to_packed(self) -> u32 {
        if self.a == 0 {
            return 0;
        }
        let a = self.a as u32;
        let ai = a + 1;
        (a << 24)
            | (((self.r as u32 * ai) >> 8) << 16)
            | (((self.g as u32 * ai) >> 8) << 8)
            | ((self.b as u32 * ai) >> 8)
    }

    /// Scale alpha by `opacity` before premultiplying.
    ///
    /// Fails with [`RasterError::OutOfRange`](crate::RasterError::OutOfRange)
    /// when `opacity` is outside `[0, 1]`.
    pub fn to_packed_with_opacity(self, opacity: f64) -> Result<u32> {
        Ok(self.with_opacity(opacity)?.to_packed())
    }

    /// Copy of this color with alpha pre-scaled by `opacity`
    pub fn with_opacity(self, opacity: f64) -> Result<Self> {
        let opacity = check_opacity(opacity)?;
        Ok(Self {
            a: (f64::from(self.a) * opacity) as u8,
            ..self
        })
    }

    /// Recover a straight color from a packed premultiplied word.
    ///
    /// Inverse alpha is scaled by 256 so the division becomes a multiply
    /// and shift; alpha 0 divides by 1 instead.
    #[inline]
    pub const fn from_packed(packed: u32) -> Self {
        let a = (packed >> 24) & 0xFF;
        let ai = if a == 0 { 1 } else { a };
        let inv = (255 << 8) / ai;
        Self {
            a: a as u8,
            r: ((((packed >> 16) & 0xFF) * inv) >> 8) as u8,
            g: ((((packed >> 8) & 0xFF) * inv) >> 8) as u8,
            b: (((packed & 0xFF) * inv) >> 8) as u8,
        }
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

// ============================================================================
// Compositing
// ============================================================================

/// `(d * (255 - sa)) / 255` via the 0x8081 fixed-point reciprocal
#[inline]
const fn scale_inverse(d: u32, sa: u32) -> u32 {
    (d * (255 - sa) * 0x8081) >> 23
}

/// Source-over composite of a premultiplied source onto a packed destination.
///
/// `sa`, `sr`, `sg`, `sb` are the premultiplied source channels (0..=255).
#[inline]
pub const fn alpha_blend(sa: u32, sr: u32, sg: u32, sb: u32, dest: u32) -> u32 {
    let da = (dest >> 24) & 0xFF;
    let dr = (dest >> 16) & 0xFF;
    let dg = (dest >> 8) & 0xFF;
    let db = dest & 0xFF;

    ((sa + scale_inverse(da, sa)) << 24)
        | ((sr + scale_inverse(dr, sa)) << 16)
        | ((sg + scale_inverse(dg, sa)) << 8)
        | (sb + scale_inverse(db, sa))
}

/// Composite two packed words (`src` over `dest`)
#[inline]
pub const fn alpha_blend_packed(src: u32, dest: u32) -> u32 {
    let sa = (src >> 24) & 0xFF;
    if sa == 255 {
        return src;
    }
    alpha_blend(sa, (src >> 16) & 0xFF, (src >> 8) & 0xFF, src & 0xFF, dest)
}

/// Coverage blend used by the Gupta-Sproull line.
///
/// Alpha composites with the exact 0x8081 formula; color channels lerp
/// from the destination towards `rgb` by `coverage / 256` (one-off
/// rounding is accepted for speed). Coverage is clamped to 0..=255.
#[inline]
pub fn blend_coverage(coverage: i32, rgb: u32, dest: u32) -> u32 {
    let sa = coverage.clamp(0, 255);
    let lerp = |shift: u32| -> u32 {
        let s = ((rgb >> shift) & 0xFF) as i32;
        let d = ((dest >> shift) & 0xFF) as i32;
        ((((s - d) * sa) >> 8) + d) as u32
    };
    let da = (dest >> 24) & 0xFF;
    let a = sa as u32 + scale_inverse(da, sa as u32);
    (a << 24) | (lerp(16) << 16) | (lerp(8) << 8) | lerp(0)
}

// ============================================================================
// Paint
// ============================================================================

/// A color resolved against a blend mode, ready to be written many times.
///
/// Every primitive converts its color once into a `Paint` and calls
/// [`Paint::apply`] per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    packed: u32,
    a: u32,
    r: u32,
    g: u32,
    b: u32,
    direct: bool,
}

impl Paint {
    pub fn new(color: Color, mode: BlendMode) -> Self {
        Self::from_packed(color.to_packed(), mode)
    }

    pub fn from_packed(packed: u32, mode: BlendMode) -> Self {
        let a = (packed >> 24) & 0xFF;
        Self {
            packed,
            a,
            r: (packed >> 16) & 0xFF,
            g: (packed >> 8) & 0xFF,
            b: packed & 0xFF,
            direct: mode == BlendMode::None || a == 255,
        }
    }

    #[inline]
    pub fn packed(&self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn alpha(&self) -> u32 {
        self.a
    }

    /// True when pixels are written without reading the destination
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.direct
    }

    /// Resulting pixel when this paint lands on `dest`
    #[inline]
    pub fn apply(&self, dest: u32) -> u32 {
        if self.direct {
            self.packed
        } else {
            alpha_blend(self.a, self.r, self.g, self.b, dest)
        }
    }

    /// Premultiplied channels scaled by an 8-bit intensity weight.
    /// The result always blends, whatever the original mode.
    #[inline]
    pub fn weighted(&self, weight: u32) -> Self {
        let a = (self.a * weight) >> 8;
        let r = (self.r * weight) >> 8;
        let g = (self.g * weight) >> 8;
        let b = (self.b * weight) >> 8;
        Self {
            packed: (a << 24) | (r << 16) | (g << 8) | b,
            a,
            r,
            g,
            b,
            direct: false,
        }
    }

    /// Packed R, G and B without alpha, as the coverage blend expects
    #[inline]
    pub fn rgb(&self) -> u32 {
        self.packed & 0x00FF_FFFF
    }
}
