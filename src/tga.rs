//! Uncompressed 32-bit TGA export.

use std::io::Write;

use log::debug;

use crate::error::{RasterError, Result};
use crate::surface::BitmapContext;

const HEADER_LEN: usize = 18;
/// Uncompressed true-color image
const IMAGE_TYPE_TRUECOLOR: u8 = 2;
const BITS_PER_PIXEL: u8 = 32;

fn dimension(name: &'static str, value: i32) -> Result<u16> {
    u16::try_from(value).map_err(|_| RasterError::OutOfRange {
        name,
        value: f64::from(value),
        min: 0.0,
        max: f64::from(u16::MAX),
    })
}

fn header(width: u16, height: u16) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[2] = IMAGE_TYPE_TRUECOLOR;
    header[12..14].copy_from_slice(&width.to_le_bytes());
    header[14..16].copy_from_slice(&height.to_le_bytes());
    header[16] = BITS_PER_PIXEL;
    header
}

/// Write the surface as a TGA image.
///
/// Rows are emitted bottom-up and each pixel as B, G, R, A of the stored
/// premultiplied word.
pub fn write_tga<W: Write>(ctx: &BitmapContext<'_>, writer: &mut W) -> Result<()> {
    let width = dimension("width", ctx.width())?;
    let height = dimension("height", ctx.height())?;
    writer.write_all(&header(width, height))?;

    let pixels = ctx.pixels();
    let stride = ctx.stride() as usize;
    let mut row_bytes = Vec::with_capacity(usize::from(width) * 4);
    for y in (0..usize::from(height)).rev() {
        row_bytes.clear();
        let start = y * stride;
        for word in &pixels[start..start + usize::from(width)] {
            let [a, r, g, b] = word.to_be_bytes();
            row_bytes.extend_from_slice(&[b, g, r, a]);
        }
        writer.write_all(&row_bytes)?;
    }
    debug!("wrote {}x{} tga", width, height);
    Ok(())
}

/// Encode the surface as TGA bytes in memory
pub fn encode_tga(ctx: &BitmapContext<'_>) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + ctx.pixel_count() * 4);
    write_tga(ctx, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::surface::{AccessMode, PixelBuffer};

    #[test]
    fn test_header_layout() {
        let mut buffer = PixelBuffer::new(300, 2);
        let ctx = buffer.context(AccessMode::ReadOnly);
        let bytes = encode_tga(&ctx).unwrap();
        assert_eq!(bytes.len(), 18 + 300 * 2 * 4);
        let mut expected = [0u8; 18];
        expected[2] = 2;
        expected[12] = 44; // 300 = 0x012C
        expected[13] = 1;
        expected[14] = 2;
        expected[16] = 32;
        assert_eq!(&bytes[..18], &expected);
    }

    #[test]
    fn test_rows_bottom_up_bgra() {
        let mut buffer = PixelBuffer::new(1, 2);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.set_pixel(0, 0, Color::from_rgb(1, 2, 3));
        ctx.set_pixel(0, 1, Color::from_argb(128, 255, 0, 0));
        let bytes = encode_tga(&ctx).unwrap();
        // bottom row first, premultiplied red at alpha 128
        assert_eq!(&bytes[18..22], &[0, 0, 128, 128]);
        assert_eq!(&bytes[22..26], &[3, 2, 1, 255]);
    }

    #[test]
    fn test_write_errors_propagate() {
        struct Failing;
        impl Write for Failing {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut buffer = PixelBuffer::new(2, 2);
        let ctx = buffer.context(AccessMode::ReadOnly);
        let err = write_tga(&ctx, &mut Failing).unwrap_err();
        assert!(matches!(err, RasterError::Io(_)));
    }
}
