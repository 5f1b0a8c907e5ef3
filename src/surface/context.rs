use log::debug;

use super::{AccessMode, LockRegistry, Surface};
use crate::color::{Color, Paint};

/// Scoped access to a surface.
///
/// The first scope on a surface locks it; nested scopes share that lock.
/// When the last scope drops the surface is unlocked and, if the outermost
/// scope was read-write, invalidated exactly once. All drawing operations
/// are methods on this type.
pub struct BitmapContext<'a> {
    surface: &'a mut dyn Surface,
    registry: &'a LockRegistry,
    mode: AccessMode,
    width: i32,
    height: i32,
    stride: i32,
}

impl<'a> BitmapContext<'a> {
    pub fn acquire(
        surface: &'a mut dyn Surface,
        registry: &'a LockRegistry,
        mode: AccessMode,
    ) -> Self {
        let acquisition = registry.acquire(surface.id(), mode);
        if acquisition.first {
            debug!("lock {:?} ({:?})", surface.id(), acquisition.mode);
            surface.lock();
        }
        let width = surface.width() as i32;
        let height = surface.height() as i32;
        let stride = surface.stride() as i32;
        Self {
            surface,
            registry,
            mode: acquisition.mode,
            width,
            height,
            stride,
        }
    }

    /// Open a nested scope on the same surface.
    /// The requested mode is ignored; the outermost scope's mode applies.
    pub fn nested(&mut self, mode: AccessMode) -> BitmapContext<'_> {
        BitmapContext::acquire(&mut *self.surface, self.registry, mode)
    }

    /// Effective access mode (that of the outermost scope)
    #[inline]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Words per row
    #[inline]
    pub fn stride(&self) -> i32 {
        self.stride
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        self.surface.pixels()
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        self.surface.pixels_mut()
    }

    /// Number of addressable pixels (`stride * height`)
    #[inline]
    pub(crate) fn pixel_count(&self) -> usize {
        (self.stride * self.height) as usize
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Word index of pixel (x, y); caller guarantees bounds
    #[inline]
    pub(crate) fn index(&self, x: i32, y: i32) -> usize {
        (y * self.stride + x) as usize
    }

    /// Read a packed premultiplied pixel (bounds checked)
    #[inline]
    pub fn get_pixel_packed(&self, x: i32, y: i32) -> Option<u32> {
        if self.in_bounds(x, y) {
            Some(self.pixels()[self.index(x, y)])
        } else {
            None
        }
    }

    /// Read a pixel as a straight-alpha color (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.get_pixel_packed(x, y).map(Color::from_packed)
    }

    /// Overwrite a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.set_pixel_packed(x, y, color.to_packed());
    }

    #[inline]
    pub fn set_pixel_packed(&mut self, x: i32, y: i32, packed: u32) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.pixels_mut()[idx] = packed;
        }
    }

    /// Apply a paint at (x, y); out-of-bounds pixels are skipped
    #[inline]
    pub(crate) fn plot(&mut self, x: i32, y: i32, paint: &Paint) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.plot_index(idx, paint);
        }
    }

    /// Apply a paint at a word index that is known to be in range
    #[inline]
    pub(crate) fn plot_index(&mut self, idx: usize, paint: &Paint) {
        let pixels = self.pixels_mut();
        pixels[idx] = paint.apply(pixels[idx]);
    }

    /// Apply a paint over `[start, end)` of the word array
    #[inline]
    pub(crate) fn plot_span(&mut self, start: usize, end: usize, paint: &Paint) {
        let span = &mut self.pixels_mut()[start..end];
        if paint.is_direct() {
            span.fill(paint.packed());
        } else {
            for px in span {
                *px = paint.apply(*px);
            }
        }
    }
}

impl Drop for BitmapContext<'_> {
    fn drop(&mut self) {
        let id = self.surface.id();
        if let Some(mode) = self.registry.release(id) {
            debug!("unlock {:?} ({:?})", id, mode);
            self.surface.unlock(mode);
            if mode == AccessMode::ReadWrite {
                self.surface.invalidate();
            }
        }
    }
}
