//! Clears, block copies, byte interchange and the column blit.

use log::trace;

use crate::color::{BlendMode, Color, Paint};
use crate::error::Result;
use crate::surface::BitmapContext;

/// Clamp `count` so `offset..offset + count` stays inside `len`
#[inline]
fn clamp_count(offset: usize, count: usize, len: usize) -> usize {
    count.min(len.saturating_sub(offset))
}

impl BitmapContext<'_> {
    /// Set every word to 0 (transparent black)
    pub fn clear(&mut self) {
        let n = self.pixel_count();
        self.pixels_mut()[..n].fill(0);
    }

    /// Overwrite every pixel with `color`
    pub fn clear_color(&mut self, color: Color) {
        let n = self.pixel_count();
        self.pixels_mut()[..n].fill(color.to_packed());
    }

    /// Copy `count` words from `src` at `src_offset` to this surface at
    /// `dest_offset`. The count is clamped to both surfaces; returns the
    /// number of words copied.
    pub fn block_copy(
        &mut self,
        src: &BitmapContext<'_>,
        src_offset: usize,
        dest_offset: usize,
        count: usize,
    ) -> usize {
        let count = clamp_count(src_offset, count, src.pixel_count());
        let count = clamp_count(dest_offset, count, self.pixel_count());
        if count == 0 {
            return 0;
        }
        self.pixels_mut()[dest_offset..dest_offset + count]
            .copy_from_slice(&src.pixels()[src_offset..src_offset + count]);
        count
    }

    /// Write packed words into the surface starting at word `dest_offset`
    pub fn copy_from_words(&mut self, words: &[u32], dest_offset: usize) -> usize {
        let count = clamp_count(dest_offset, words.len(), self.pixel_count());
        self.pixels_mut()[dest_offset..dest_offset + count].copy_from_slice(&words[..count]);
        count
    }

    /// Read packed words starting at word `src_offset` into `out`
    pub fn copy_to_words(&self, src_offset: usize, out: &mut [u32]) -> usize {
        let count = clamp_count(src_offset, out.len(), self.pixel_count());
        out[..count].copy_from_slice(&self.pixels()[src_offset..src_offset + count]);
        count
    }

    /// `count` pixels from word `offset` as bytes, 4 per pixel in
    /// A, R, G, B order (premultiplied, as stored)
    pub fn to_byte_array(&self, offset: usize, count: usize) -> Vec<u8> {
        let count = clamp_count(offset, count, self.pixel_count());
        let mut bytes = Vec::with_capacity(count * 4);
        for word in &self.pixels()[offset..offset + count] {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// Inverse of [`to_byte_array`](Self::to_byte_array): write `count`
    /// pixels read from `bytes` (A, R, G, B each) starting at word `offset`.
    /// Returns the number of pixels written.
    pub fn from_byte_array(&mut self, bytes: &[u8], offset: usize, count: usize) -> usize {
        let count = clamp_count(offset, count.min(bytes.len() / 4), self.pixel_count());
        let dest = &mut self.pixels_mut()[offset..offset + count];
        for (word, quad) in dest.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
        }
        count
    }

    /// Stretch a column of colors over rows `y_start` towards `y_end`
    /// (exclusive) at column `x`.
    ///
    /// Row `y` takes `colors[(y_start - y) * n / (y_start - y_end)]`, or the
    /// mirrored index when `flip` is set. `opacity` scales every source
    /// alpha before the blend decision, so a partially transparent blit of
    /// opaque colors still blends. Rows or a column outside the surface
    /// are skipped.
    pub fn blit_column(
        &mut self,
        x: i32,
        y_start: i32,
        y_end: i32,
        colors: &[Color],
        flip: bool,
        opacity: f64,
        mode: BlendMode,
    ) -> Result<()> {
        let paints = colors
            .iter()
            .map(|c| c.with_opacity(opacity).map(|c| Paint::new(c, mode)))
            .collect::<Result<Vec<_>>>()?;

        let n = paints.len() as i64;
        let span = i64::from(y_start) - i64::from(y_end);
        if n == 0 || span == 0 || x < 0 || x >= self.width() {
            trace!("column blit at x={} skipped", x);
            return Ok(());
        }

        let dir: i64 = if span > 0 { -1 } else { 1 };
        for step in 0..span.abs() {
            let y = i64::from(y_start) + dir * step;
            if y < 0 || y >= i64::from(self.height()) {
                continue;
            }
            let mut index = (i64::from(y_start) - y) * n / span;
            if flip {
                index = n - 1 - index;
            }
            let idx = self.index(x, y as i32);
            self.plot_index(idx, &paints[index as usize]);
        }
        Ok(())
    }
}
