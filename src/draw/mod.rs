//! Drawing primitives.
//!
//! Everything here is implemented as methods on
//! [`BitmapContext`](crate::surface::BitmapContext); the clipper and the
//! curve tessellators are also usable on their own.

mod bulk;
pub mod clip;
pub mod curve;
mod line;
mod line_aa;
mod polygon;
mod shapes;

pub use clip::{clip_line, clip_line_i32, ClipRect};
pub use curve::{
    bezier_points, beziers_points, cardinal_segment_points, curve_closed_points, curve_points,
    DEFAULT_STEP_FACTOR,
};
pub use line::LineAlgorithm;
