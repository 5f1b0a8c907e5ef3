use log::debug;

use super::{AccessMode, BitmapContext, LockRegistry, Surface, SurfaceId};
use crate::color::Color;

// ============================================================================
// Backing Store
// ============================================================================

/// Where the pixels of a [`PixelBuffer`] live between scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// The word array is the storage; lock/unlock are bookkeeping only
    Direct,
    /// A front byte store (A,R,G,B per pixel) is copied into the word
    /// array when a scope opens and flushed back when a writing scope closes
    Staged,
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// Premultiplied ARGB32 pixel buffer.
/// Dimensions are fixed at creation; anything below 1 is clamped to 1.
pub struct PixelBuffer {
    id: SurfaceId,
    words: Vec<u32>,
    front: Option<Vec<u8>>,
    width: usize,
    height: usize,
    locked: bool,
    invalidations: u32,
}

impl PixelBuffer {
    /// Create a direct-mapped buffer cleared to transparent black
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_backing(width, height, Backing::Direct)
    }

    /// Create a buffer with the chosen backing strategy
    pub fn with_backing(width: usize, height: usize, backing: Backing) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let count = width * height;
        Self {
            id: SurfaceId::next(),
            words: vec![0; count],
            front: match backing {
                Backing::Direct => None,
                Backing::Staged => Some(vec![0; count * 4]),
            },
            width,
            height,
            locked: false,
            invalidations: 0,
        }
    }

    /// Create a staged buffer whose front store starts as `bytes`
    /// (A,R,G,B per pixel). Missing bytes are zero, extra bytes are ignored.
    pub fn from_argb_bytes(width: usize, height: usize, bytes: &[u8]) -> Self {
        let mut buffer = Self::with_backing(width, height, Backing::Staged);
        if let Some(front) = buffer.front.as_mut() {
            let n = front.len().min(bytes.len());
            front[..n].copy_from_slice(&bytes[..n]);
        }
        buffer
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn backing(&self) -> Backing {
        if self.front.is_some() {
            Backing::Staged
        } else {
            Backing::Direct
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// How many times the full surface has been marked dirty
    pub fn invalidation_count(&self) -> u32 {
        self.invalidations
    }

    /// Front byte store of a staged buffer
    pub fn front_bytes(&self) -> Option<&[u8]> {
        self.front.as_deref()
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    /// Read a pixel as a straight color without opening a scope.
    /// Staged buffers report the word store, which is current after the
    /// last scope closed.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            Some(Color::from_packed(self.words[y as usize * self.width + x as usize]))
        } else {
            None
        }
    }

    /// Open a scope using the process-wide registry
    pub fn context(&mut self, mode: AccessMode) -> BitmapContext<'_> {
        BitmapContext::acquire(self, LockRegistry::shared(), mode)
    }

    /// Open a scope tracked by an explicit registry
    pub fn context_in<'a>(
        &'a mut self,
        registry: &'a LockRegistry,
        mode: AccessMode,
    ) -> BitmapContext<'a> {
        BitmapContext::acquire(self, registry, mode)
    }
}

impl Surface for PixelBuffer {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn stride(&self) -> usize {
        self.width
    }

    fn pixels(&self) -> &[u32] {
        &self.words
    }

    fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.words
    }

    fn lock(&mut self) {
        self.locked = true;
        if let Some(front) = self.front.as_ref() {
            for (word, argb) in self.words.iter_mut().zip(front.chunks_exact(4)) {
                *word = u32::from_be_bytes([argb[0], argb[1], argb[2], argb[3]]);
            }
        }
    }

    fn unlock(&mut self, mode: AccessMode) {
        self.locked = false;
        if mode == AccessMode::ReadWrite {
            if let Some(front) = self.front.as_mut() {
                for (argb, word) in front.chunks_exact_mut(4).zip(&self.words) {
                    argb.copy_from_slice(&word.to_be_bytes());
                }
            }
        }
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
        debug!(
            "surface {:?} invalidated ({}x{})",
            self.id, self.width, self.height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_clamped_to_one() {
        let buffer = PixelBuffer::new(0, 0);
        assert_eq!(buffer.width(), 1);
        assert_eq!(buffer.height(), 1);
        assert_eq!(buffer.pixels().len(), 1);
    }

    #[test]
    fn test_new_buffer_is_transparent() {
        let buffer = PixelBuffer::new(4, 3);
        assert_eq!(buffer.get_pixel(3, 2), Some(Color::TRANSPARENT));
        assert_eq!(buffer.get_pixel(4, 0), None);
        assert_eq!(buffer.get_pixel(0, -1), None);
    }

    #[test]
    fn test_staged_buffer_round_trips_through_lock() {
        let bytes = [255, 10, 20, 30, 255, 40, 50, 60];
        let mut buffer = PixelBuffer::from_argb_bytes(2, 1, &bytes);
        assert_eq!(buffer.backing(), Backing::Staged);

        buffer.lock();
        assert_eq!(buffer.pixels()[0], 0xFF0A_141E);
        buffer.pixels_mut()[1] = 0xFF01_0203;
        buffer.unlock(AccessMode::ReadWrite);

        assert_eq!(buffer.front_bytes().unwrap(), &[255, 10, 20, 30, 255, 1, 2, 3]);
    }

    #[test]
    fn test_staged_read_only_does_not_flush() {
        let mut buffer = PixelBuffer::with_backing(1, 1, Backing::Staged);
        buffer.lock();
        buffer.pixels_mut()[0] = 0xFFFF_FFFF;
        buffer.unlock(AccessMode::ReadOnly);
        assert_eq!(buffer.front_bytes().unwrap(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = PixelBuffer::new(1, 1);
        let b = PixelBuffer::new(1, 1);
        assert_ne!(a.id(), b.id());
    }
}
