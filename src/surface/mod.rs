//! Pixel surfaces and scoped, reference-counted access to them.

mod context;
mod pixel_buffer;
mod registry;

use std::sync::atomic::{AtomicU64, Ordering};

pub use context::BitmapContext;
pub use pixel_buffer::{Backing, PixelBuffer};
pub use registry::{Acquisition, LockRegistry};

/// Identity of a surface in a [`LockRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Access mode of a scope; fixed by the outermost acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// Handle contract for a lockable 32-bit pixel store.
///
/// `pixels()` must expose at least `stride * height` words, with the
/// pixel at `(x, y)` stored at `y * stride + x`. Words are premultiplied
/// ARGB with alpha in the high byte.
pub trait Surface {
    fn id(&self) -> SurfaceId;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stride(&self) -> usize;

    fn pixels(&self) -> &[u32];
    fn pixels_mut(&mut self) -> &mut [u32];

    /// Called once when the outermost scope opens
    fn lock(&mut self);

    /// Called once when the outermost scope closes
    fn unlock(&mut self, mode: AccessMode);

    /// Mark the whole surface as changed
    fn invalidate(&mut self);
}
