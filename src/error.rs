//! Error type shared by the whole crate.
//!
//! Drawing itself never fails: degenerate geometry is a no-op and
//! out-of-bounds coordinates are clamped or skipped. The only validated
//! drawing input is opacity; everything else here comes from I/O and
//! configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    /// A numeric argument fell outside its accepted range.
    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RasterError>;

/// Validate an opacity factor (inclusive `[0, 1]`, NaN rejected).
pub(crate) fn check_opacity(opacity: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(opacity)
    } else {
        Err(RasterError::OutOfRange {
            name: "opacity",
            value: opacity,
            min: 0.0,
            max: 1.0,
        })
    }
}
