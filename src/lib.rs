//! rasterbits - software rasterization on premultiplied ARGB buffers.
//!
//! A [`PixelBuffer`] (or any [`Surface`]) is drawn through a
//! [`BitmapContext`], a scoped lock that invalidates the surface once
//! when the outermost read-write scope closes:
//!
//! ```
//! use rasterbits::{AccessMode, BlendMode, Color, PixelBuffer};
//!
//! let mut buffer = PixelBuffer::new(64, 64);
//! {
//!     let mut ctx = buffer.context(AccessMode::ReadWrite);
//!     ctx.draw_line(0, 0, 63, 63, Color::from_rgb(255, 0, 0), BlendMode::Alpha);
//! }
//! assert_eq!(buffer.get_pixel(32, 32), Some(Color::from_rgb(255, 0, 0)));
//! assert_eq!(buffer.invalidation_count(), 1);
//! ```

pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod surface;
pub mod tga;

pub use color::{alpha_blend, alpha_blend_packed, BlendMode, Color, Paint};
pub use config::RasterConfig;
pub use draw::{ClipRect, LineAlgorithm};
pub use error::{RasterError, Result};
pub use surface::{AccessMode, Backing, BitmapContext, LockRegistry, PixelBuffer, Surface, SurfaceId};
pub use tga::{encode_tga, write_tga};
