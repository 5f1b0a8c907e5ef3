//! Aliased line rasterizers: Bresenham, DDA and the fixed-point
//! major-axis walker used for bulk drawing.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::color::{BlendMode, Color, Paint};
use crate::surface::BitmapContext;

/// Fractional bits of the major-axis walker's minor coordinate
const PRECISION_SHIFT: i32 = 8;

/// Interchangeable line algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineAlgorithm {
    Bresenham,
    Dda,
    /// Fixed-point major-axis walk with analytic clipping
    #[default]
    Fast,
    /// Xiaolin Wu antialiasing
    Wu,
    /// Gupta-Sproull coverage antialiasing
    Antialiased,
}

impl BitmapContext<'_> {
    /// Draw a line with the chosen algorithm
    pub fn draw_line_using(
        &mut self,
        algorithm: LineAlgorithm,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        match algorithm {
            LineAlgorithm::Bresenham => self.draw_line_bresenham(x1, y1, x2, y2, color, mode),
            LineAlgorithm::Dda => self.draw_line_dda(x1, y1, x2, y2, color, mode),
            LineAlgorithm::Fast => self.draw_line(x1, y1, x2, y2, color, mode),
            LineAlgorithm::Wu => self.draw_line_wu(x1, y1, x2, y2, color, mode),
            LineAlgorithm::Antialiased => self.draw_line_aa(x1, y1, x2, y2, color),
        }
    }

    /// Bresenham line with an integer error accumulator.
    ///
    /// No clipping: every pixel is bounds checked and skipped when outside,
    /// so lines leaving the surface are drawn piecewise. A zero-length line
    /// draws its single pixel.
    pub fn draw_line_bresenham(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let paint = Paint::new(color, mode);

        let mut dx = x2 - x1;
        let mut dy = y2 - y1;
        let incx = dx.signum();
        let incy = dy.signum();
        dx = dx.abs();
        dy = dy.abs();

        // (parallel step, diagonal step, short delta, long delta)
        let (pdx, pdy, es, el) = if dx > dy {
            (incx, 0, dy, dx)
        } else {
            (0, incy, dx, dy)
        };

        let mut x = x1;
        let mut y = y1;
        let mut error = el >> 1;
        self.plot(x, y, &paint);

        for _ in 0..el {
            error -= es;
            if error < 0 {
                error += el;
                x += incx;
                y += incy;
            } else {
                x += pdx;
                y += pdy;
            }
            self.plot(x, y, &paint);
        }
    }

    /// Digital differential analyzer line with float increments.
    ///
    /// Steps `max(|dx|, |dy|)` times (both endpoints drawn), truncating each
    /// sample to integer pixel coordinates. A zero-length line is a no-op.
    pub fn draw_line_dda(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let len = dx.abs().max(dy.abs());
        if len == 0 {
            trace!("dda: zero-length line at ({}, {})", x1, y1);
            return;
        }

        let paint = Paint::new(color, mode);
        let incx = dx as f32 / len as f32;
        let incy = dy as f32 / len as f32;
        let mut x = x1 as f32;
        let mut y = y1 as f32;
        let w = self.width() as f32;
        let h = self.height() as f32;

        for _ in 0..=len {
            if y < h && y >= 0.0 && x < w && x >= 0.0 {
                let idx = self.index(x as i32, y as i32);
                self.plot_index(idx, &paint);
            }
            x += incx;
            y += incy;
        }
    }

    /// Fast line: walks the major axis one pixel at a time while the minor
    /// coordinate advances in 8-bit fixed point.
    ///
    /// Instead of testing every pixel, the in-surface sub-range of the line
    /// is solved up front: the first and last fixed-point minor coordinates
    /// inside the surface are found with modular arithmetic on the slope,
    /// then the major range is clamped. A line whose major delta is zero
    /// (a single point) draws nothing.
    pub fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let paint = Paint::new(color, mode);
        let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        let dx = x2 - x1;
        let dy = y2 - y1;

        if dx.abs() > dy.abs() {
            self.walk_x_major(x1, y1, x2, y2, &paint);
        } else {
            if dy == 0 {
                trace!("draw_line: zero-length line at ({}, {})", x1, y1);
                return;
            }
            self.walk_y_major(x1, y1, x2, y2, &paint);
        }
    }

    // Walkers take widened coordinates: deltas of i32 endpoints and their
    // fixed-point shifts do not fit in i32.
    fn walk_x_major(&mut self, mut x1: i64, mut y1: i64, mut x2: i64, mut y2: i64, paint: &Paint) {
        let w = i64::from(self.width());
        let h = i64::from(self.height());
        if x2 < x1 {
            std::mem::swap(&mut x1, &mut x2);
            std::mem::swap(&mut y1, &mut y2);
        }
        let dx = x2 - x1;
        let dy = y2 - y1;

        let incy = (dy << PRECISION_SHIFT) / dx;
        let mut y1s = y1 << PRECISION_SHIFT;
        let mut y2s = y2 << PRECISION_SHIFT;
        let hs = h << PRECISION_SHIFT;

        if y1 < y2 {
            if y1 >= h || y2 < 0 {
                return;
            }
            if y1s < 0 {
                if incy == 0 {
                    return;
                }
                let old = y1s;
                // Lowest y1s >= 0 on the line's fixed-point lattice
                y1s = incy - 1 + ((y1s + 1) % incy);
                x1 += (y1s - old) / incy;
            }
            if y2s >= hs && incy != 0 {
                // Highest y2s <= hs - 1 on the lattice
                y2s = hs - 1 - (hs - 1 - y1s) % incy;
                x2 = x1 + (y2s - y1s) / incy;
            }
        } else {
            if y2 >= h || y1 < 0 {
                return;
            }
            if y1s >= hs {
                if incy == 0 {
                    return;
                }
                let old = y1s;
                y1s = hs - 1 + (incy - (hs - 1 - old) % incy);
                x1 += (y1s - old) / incy;
            }
            if y2s < 0 && incy != 0 {
                y2s = y1s % incy;
                x2 = x1 + (y2s - y1s) / incy;
            }
        }

        // The visible y range may lie entirely beside the surface
        if x2 < 0 || x1 >= w {
            return;
        }
        if x1 < 0 {
            y1s -= incy * x1;
            x1 = 0;
        }
        if x2 >= w {
            x2 = w - 1;
        }

        let stride = i64::from(self.stride());
        let len = self.pixel_count() as i64;
        let mut ys = y1s;
        let mut prev_y = ys >> PRECISION_SHIFT;
        let mut index = x1 + prev_y * stride;
        let k = if incy < 0 { 1 - stride } else { 1 + stride };

        for _ in x1..=x2 {
            if index < 0 || index >= len {
                break;
            }
            self.plot_index(index as usize, paint);
            ys += incy;
            let y = ys >> PRECISION_SHIFT;
            if y == prev_y {
                index += 1;
            } else {
                prev_y = y;
                index += k;
            }
        }
    }

    fn walk_y_major(&mut self, mut x1: i64, mut y1: i64, mut x2: i64, mut y2: i64, paint: &Paint) {
        let w = i64::from(self.width());
        let h = i64::from(self.height());
        if y2 < y1 {
            std::mem::swap(&mut x1, &mut x2);
            std::mem::swap(&mut y1, &mut y2);
        }
        let dx = x2 - x1;
        let dy = y2 - y1;

        let incx = (dx << PRECISION_SHIFT) / dy;
        let mut x1s = x1 << PRECISION_SHIFT;
        let mut x2s = x2 << PRECISION_SHIFT;
        let ws = w << PRECISION_SHIFT;

        if x1 < x2 {
            if x1 >= w || x2 < 0 {
                return;
            }
            if x1s < 0 {
                if incx == 0 {
                    return;
                }
                let old = x1s;
                x1s = incx - 1 + ((x1s + 1) % incx);
                y1 += (x1s - old) / incx;
            }
            if x2s >= ws && incx != 0 {
                x2s = ws - 1 - (ws - 1 - x1s) % incx;
                y2 = y1 + (x2s - x1s) / incx;
            }
        } else {
            if x2 >= w || x1 < 0 {
                return;
            }
            if x1s >= ws {
                if incx == 0 {
                    return;
                }
                let old = x1s;
                x1s = ws - 1 + (incx - (ws - 1 - old) % incx);
                y1 += (x1s - old) / incx;
            }
            if x2s < 0 && incx != 0 {
                x2s = x1s % incx;
                y2 = y1 + (x2s - x1s) / incx;
            }
        }

        // The visible x range may lie entirely above or below the surface
        if y2 < 0 || y1 >= h {
            return;
        }
        if y1 < 0 {
            x1s -= incx * y1;
            y1 = 0;
        }
        if y2 >= h {
            y2 = h - 1;
        }

        let stride = i64::from(self.stride());
        let len = self.pixel_count() as i64;
        let mut xs = x1s;
        let mut prev_x = xs >> PRECISION_SHIFT;
        let mut index = prev_x + y1 * stride;
        let k = if incx < 0 { stride - 1 } else { stride + 1 };

        for _ in y1..=y2 {
            if index < 0 || index >= len {
                break;
            }
            self.plot_index(index as usize, paint);
            xs += incx;
            let x = xs >> PRECISION_SHIFT;
            if x == prev_x {
                index += stride;
            } else {
                prev_x = x;
                index += k;
            }
        }
    }

    /// Connected line segments through a flat `x0, y0, x1, y1, ...` list.
    /// Repeat the first point at the end to close the shape.
    pub fn draw_polyline(&mut self, points: &[i32], color: Color, mode: BlendMode) {
        self.draw_polyline_using(LineAlgorithm::Fast, points, color, mode);
    }

    pub fn draw_polyline_using(
        &mut self,
        algorithm: LineAlgorithm,
        points: &[i32],
        color: Color,
        mode: BlendMode,
    ) {
        for segment in points.windows(4).step_by(2) {
            self.draw_line_using(
                algorithm, segment[0], segment[1], segment[2], segment[3], color, mode,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{AccessMode, PixelBuffer};

    const RED: Color = Color::from_rgb(255, 0, 0);

    fn lit(ctx: &BitmapContext<'_>) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..ctx.height() {
            for x in 0..ctx.width() {
                if ctx.get_pixel_packed(x, y) != Some(0) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_vertical_line_bresenham_and_dda() {
        for algorithm in [LineAlgorithm::Bresenham, LineAlgorithm::Dda] {
            let mut buffer = PixelBuffer::new(7, 9);
            let mut ctx = buffer.context(AccessMode::ReadWrite);
            ctx.draw_line_using(algorithm, 0, 0, 0, 8, RED, BlendMode::None);
            let pixels = lit(&ctx);
            assert_eq!(pixels.len(), 9, "{:?}", algorithm);
            assert!(pixels.iter().all(|&(x, _)| x == 0));
        }
    }

    #[test]
    fn test_bresenham_single_point() {
        let mut buffer = PixelBuffer::new(4, 4);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_bresenham(2, 1, 2, 1, RED, BlendMode::None);
        assert_eq!(lit(&ctx), vec![(2, 1)]);
    }

    #[test]
    fn test_dda_zero_length_is_noop() {
        let mut buffer = PixelBuffer::new(4, 4);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_dda(2, 1, 2, 1, RED, BlendMode::None);
        assert!(lit(&ctx).is_empty());
    }

    #[test]
    fn test_bresenham_skips_offscreen_pixels() {
        let mut buffer = PixelBuffer::new(10, 10);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_bresenham(-5, 3, 20, 3, RED, BlendMode::None);
        let pixels = lit(&ctx);
        assert_eq!(pixels.len(), 10);
        assert!(pixels.iter().all(|&(_, y)| y == 3));
    }

    #[test]
    fn test_fast_line_diagonal() {
        let mut buffer = PixelBuffer::new(64, 64);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line(0, 0, 63, 63, RED, BlendMode::Alpha);
        assert_eq!(ctx.get_pixel(32, 32), Some(RED));
        let pixels = lit(&ctx);
        assert_eq!(pixels.len(), 64);
        assert!(pixels.iter().all(|&(x, y)| x == y));
    }

    #[test]
    fn test_fast_line_horizontal_and_vertical() {
        let mut buffer = PixelBuffer::new(16, 16);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line(2, 5, 12, 5, RED, BlendMode::None);
        ctx.draw_line(7, 14, 7, 9, RED, BlendMode::None);
        let pixels = lit(&ctx);
        assert_eq!(pixels.len(), 11 + 6);
        assert!(pixels.contains(&(12, 5)));
        assert!(pixels.contains(&(7, 9)));
    }

    #[test]
    fn test_fast_line_single_point_draws_nothing() {
        let mut buffer = PixelBuffer::new(4, 4);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line(1, 1, 1, 1, RED, BlendMode::None);
        assert!(lit(&ctx).is_empty());
    }

    #[test]
    fn test_fast_line_clips_without_panicking() {
        let mut buffer = PixelBuffer::new(20, 15);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        let cases = [
            (-100, -40, 300, 90),
            (300, 90, -100, -40),
            (-30, 50, 50, -30),
            (10, -500, 12, 500),
            (12, 500, 10, -500),
            (-1000, 7, 1000, 7),
            (25, 3, 40, 9),
            (-7, -7, -1, -2),
            (0, 14, 19, 0),
            (19, -3, -4, 16),
        ];
        for (x1, y1, x2, y2) in cases {
            ctx.draw_line(x1, y1, x2, y2, RED, BlendMode::None);
        }
        // clipped long horizontal line covers its whole row
        assert!((0..20).all(|x| ctx.get_pixel(x, 7) == Some(RED)));
    }

    #[test]
    fn test_fast_line_huge_offscreen_coordinates() {
        // visible minor range lies entirely left of the surface
        let mut buffer = PixelBuffer::new(1024, 64);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line(-8_000_000, 0, 8_000_000, 6_000_000, RED, BlendMode::None);
        ctx.draw_line(8_000_000, 6_000_000, -8_000_000, 0, RED, BlendMode::None);
        // and entirely above it
        ctx.draw_line(0, -8_000_000, 6_000_000, 8_000_000, RED, BlendMode::None);
        ctx.draw_line(-9_000_000, 100, -4_000_000, 90, RED, BlendMode::None);
        assert!(lit(&ctx).is_empty());

        let mut buffer = PixelBuffer::new(4096, 64);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line(0, -1_000_000, 1_900_000, 1_000_000, RED, BlendMode::None);
        ctx.draw_line(i32::MIN, 5, i32::MAX, 5, RED, BlendMode::None);
        ctx.draw_line(3, i32::MAX, 3, i32::MIN, RED, BlendMode::None);
        assert!((0..4096).all(|x| ctx.get_pixel(x, 5) == Some(RED)));
        assert!((0..64).all(|y| ctx.get_pixel(3, y) == Some(RED)));
    }

    #[test]
    fn test_fast_line_clipped_pixels_match_unclipped_walk() {
        // The visible part of a clipped line must stay on the same lattice
        // as the portion drawn without clipping.
        let mut big = PixelBuffer::new(200, 200);
        let mut small = PixelBuffer::new(50, 50);
        {
            let mut ctx = big.context(AccessMode::ReadWrite);
            ctx.draw_line(100, 100, 190, 140, RED, BlendMode::None);
        }
        {
            let mut ctx = small.context(AccessMode::ReadWrite);
            ctx.draw_line(0, 0, 90, 40, RED, BlendMode::None);
        }
        for y in 0..50 {
            for x in 0..50 {
                assert_eq!(
                    small.get_pixel(x, y),
                    big.get_pixel(x + 100, y + 100),
                    "mismatch at {},{}",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_translucent_line_blends_with_fixed_point_formula() {
        let mut buffer = PixelBuffer::new(64, 64);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.clear_color(RED);
        let blue = Color::from_argb(128, 0, 0, 255);
        ctx.draw_line(0, 0, 63, 63, blue, BlendMode::Alpha);
        let expected = crate::color::alpha_blend_packed(blue.to_packed(), RED.to_packed());
        assert_eq!(ctx.get_pixel_packed(32, 32), Some(expected));
        assert_eq!(expected, 0xFF7F_0080);
    }

    #[test]
    fn test_polyline_closes_triangle() {
        let mut buffer = PixelBuffer::new(10, 10);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_polyline(&[1, 1, 8, 1, 8, 8, 1, 1], RED, BlendMode::None);
        assert_eq!(ctx.get_pixel(1, 1), Some(RED));
        assert_eq!(ctx.get_pixel(8, 1), Some(RED));
        assert_eq!(ctx.get_pixel(8, 8), Some(RED));
        assert_eq!(ctx.get_pixel(4, 4), Some(RED));
        assert_eq!(ctx.get_pixel(4, 6), Some(Color::TRANSPARENT));
    }
}
