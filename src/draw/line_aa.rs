//! Antialiased lines: Xiaolin Wu (two-pixel intensity split) and
//! Gupta-Sproull (three-pixel coverage from perpendicular distance).

use log::trace;

use super::clip::{clip_line_i32, ClipRect};
use crate::color::{blend_coverage, BlendMode, Color, Paint};
use crate::surface::BitmapContext;

const INTENSITY_BITS: u32 = 8;
/// `weight ^ WEIGHT_COMPLEMENT_MASK` gives the paired pixel's weight
const WEIGHT_COMPLEMENT_MASK: u32 = (1 << INTENSITY_BITS) - 1;
/// Bits to drop from the 16-bit accumulator to get an intensity
const INTENSITY_SHIFT: u32 = 16 - INTENSITY_BITS;

/// Fixed-point bits of the Gupta-Sproull coverage terms
const COVERAGE_SHIFT: i32 = 10;
const COVERAGE_ONE: f64 = (1 << COVERAGE_SHIFT) as f64;

impl BitmapContext<'_> {
    /// Wu antialiased line.
    ///
    /// The minor axis advances through a 16-bit error accumulator whose top
    /// bits weight the pixel pair straddling the ideal line. Endpoints lie
    /// exactly on the line and are drawn unweighted, as are horizontal,
    /// vertical and 45 degree lines. Weighted pixels always blend.
    pub fn draw_line_wu(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let paint = Paint::new(color, mode);

        // Run top to bottom
        if y0 > y1 {
            std::mem::swap(&mut y0, &mut y1);
            std::mem::swap(&mut x0, &mut x1);
        }

        self.plot(x0, y0, &paint);

        let mut delta_x = x1 - x0;
        let x_dir = if delta_x >= 0 { 1 } else { -1 };
        delta_x = delta_x.abs();
        let mut delta_y = y1 - y0;

        if delta_y == 0 {
            // Horizontal
            while delta_x != 0 {
                x0 += x_dir;
                self.plot(x0, y0, &paint);
                delta_x -= 1;
            }
            return;
        }
        if delta_x == 0 {
            // Vertical
            while delta_y != 0 {
                y0 += 1;
                self.plot(x0, y0, &paint);
                delta_y -= 1;
            }
            return;
        }
        if delta_x == delta_y {
            // Diagonal
            while delta_y != 0 {
                x0 += x_dir;
                y0 += 1;
                self.plot(x0, y0, &paint);
                delta_y -= 1;
            }
            return;
        }

        let mut error_acc: u16 = 0;
        if delta_y > delta_x {
            // Y-major: X advances by ErrorAdj/65536 per row
            let error_adj = ((u64::from(delta_x.unsigned_abs()) << 16)
                / u64::from(delta_y.unsigned_abs())) as u16;
            // every pixel other than the endpoints
            for _ in 1..delta_y {
                let prev = error_acc;
                error_acc = error_acc.wrapping_add(error_adj);
                if error_acc <= prev {
                    // accumulator turned over
                    x0 += x_dir;
                }
                y0 += 1;
                let weighting = u32::from(error_acc) >> INTENSITY_SHIFT;
                self.plot(x0, y0, &paint.weighted(weighting ^ WEIGHT_COMPLEMENT_MASK));
                self.plot(x0 + x_dir, y0, &paint.weighted(weighting));
            }
        } else {
            // X-major: Y advances by ErrorAdj/65536 per column
            let error_adj = ((u64::from(delta_y.unsigned_abs()) << 16)
                / u64::from(delta_x.unsigned_abs())) as u16;
            for _ in 1..delta_x {
                let prev = error_acc;
                error_acc = error_acc.wrapping_add(error_adj);
                if error_acc <= prev {
                    y0 += 1;
                }
                x0 += x_dir;
                let weighting = u32::from(error_acc) >> INTENSITY_SHIFT;
                self.plot(x0, y0, &paint.weighted(weighting ^ WEIGHT_COMPLEMENT_MASK));
                self.plot(x0, y0 + 1, &paint.weighted(weighting));
            }
        }

        self.plot(x1, y1, &paint);
    }

    /// Gupta-Sproull antialiased line.
    ///
    /// The segment is clipped to the surface, then walked in a (u, v) frame
    /// where u is the major axis. Each step writes the on-line pixel and its
    /// two neighbours across the line, each with a coverage derived from the
    /// perpendicular distance (10-bit fixed point, pre-scaled by the color's
    /// alpha). Neighbours that would leave the surface or wrap onto the
    /// adjacent scanline are skipped.
    pub fn draw_line_aa(&mut self, mut x1: i32, mut y1: i32, mut x2: i32, mut y2: i32, color: Color) {
        let rect = ClipRect::for_surface(self.width(), self.height());
        if !clip_line_i32(&rect, &mut x1, &mut y1, &mut x2, &mut y2) {
            return;
        }
        if x1 == x2 && y1 == y2 {
            // inverse distance would overflow
            trace!("draw_line_aa: zero-length line at ({}, {})", x1, y1);
            return;
        }

        let paint = Paint::new(color, BlendMode::Alpha);
        let a = paint.alpha() as i32;
        let rgb = paint.rgb();
        let stride = self.stride();

        let dx = x2 - x1;
        let dy = y2 - y1;
        let adx = dx.abs();
        let ady = dy.abs();

        // Fold all eight octants into (u, v); v steps are the minor axis.
        let (du, dv, uincr, vincr) = if adx > ady {
            let uincr = if dx < 0 { -1 } else { 1 };
            let vincr = if dy < 0 { -stride } else { stride };
            (adx, ady, uincr, vincr)
        } else {
            let uincr = if dy < 0 { -stride } else { stride };
            let vincr = if dx < 0 { -1 } else { 1 };
            (ady, adx, uincr, vincr)
        };

        let mut d = (dv << 1) - du;
        let incr_s = dv << 1;
        let incr_d = (dv - du) << 1;

        let inv_d_float = 1.0 / (4.0 * (f64::from(du).powi(2) + f64::from(dv).powi(2)).sqrt());
        let inv_d2du_float = 0.75 - 2.0 * (f64::from(du) * inv_d_float);

        let inv_d = (inv_d_float * COVERAGE_ONE) as i32;
        let inv_d2du = (inv_d2du_float * COVERAGE_ONE * f64::from(a)) as i32;
        let zero_dot_75 = (0.75 * COVERAGE_ONE * f64::from(a)) as i32;

        let inv_d_mul_alpha = inv_d * a;
        let du_mul_inv_d = du * inv_d_mul_alpha;
        let mut d_mul_inv_d = d * inv_d_mul_alpha;
        // 2 * v * du * invD: numerator of the distance, zero on the line
        let mut twovdu_mul_inv_d = 0;
        let incr_s_mul_inv_d = incr_s * inv_d_mul_alpha;
        let incr_d_mul_inv_d = incr_d * inv_d_mul_alpha;

        let mut addr = y1 * stride + x1;
        for _ in 0..=du {
            self.cover(addr, 0, (zero_dot_75 - twovdu_mul_inv_d) >> COVERAGE_SHIFT, rgb);
            self.cover(addr, vincr, (inv_d2du + twovdu_mul_inv_d) >> COVERAGE_SHIFT, rgb);
            self.cover(addr, -vincr, (inv_d2du - twovdu_mul_inv_d) >> COVERAGE_SHIFT, rgb);

            if d < 0 {
                // straight step along u
                twovdu_mul_inv_d = d_mul_inv_d + du_mul_inv_d;
                d += incr_s;
                d_mul_inv_d += incr_s_mul_inv_d;
            } else {
                // diagonal step along u and v
                twovdu_mul_inv_d = d_mul_inv_d - du_mul_inv_d;
                d += incr_d;
                d_mul_inv_d += incr_d_mul_inv_d;
                addr += vincr;
            }
            addr += uincr;
        }
    }

    /// Gupta-Sproull polyline through a flat `x0, y0, x1, y1, ...` list
    pub fn draw_polyline_aa(&mut self, points: &[i32], color: Color) {
        for segment in points.windows(4).step_by(2) {
            self.draw_line_aa(segment[0], segment[1], segment[2], segment[3], color);
        }
    }

    /// Coverage-blend the pixel at `addr + offset`, where `offset` is 0,
    /// one row, or one column away from an in-surface `addr`.
    fn cover(&mut self, addr: i32, offset: i32, coverage: i32, rgb: u32) {
        let target = addr + offset;
        if target < 0 || target >= self.pixel_count() as i32 {
            return;
        }
        if offset == 1 || offset == -1 {
            // same scanline only
            let column = addr % self.stride() + offset;
            if column < 0 || column >= self.width() {
                return;
            }
        }
        let pixels = self.pixels_mut();
        let idx = target as usize;
        pixels[idx] = blend_coverage(coverage, rgb, pixels[idx]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{AccessMode, PixelBuffer};

    const RED: Color = Color::from_rgb(255, 0, 0);

    fn alpha_at(ctx: &BitmapContext<'_>, x: i32, y: i32) -> u32 {
        ctx.get_pixel_packed(x, y).map_or(0, |p| p >> 24)
    }

    #[test]
    fn test_wu_axis_lines_are_unweighted() {
        let mut buffer = PixelBuffer::new(12, 12);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_wu(1, 2, 10, 2, RED, BlendMode::Alpha);
        ctx.draw_line_wu(5, 11, 5, 4, RED, BlendMode::Alpha);
        ctx.draw_line_wu(0, 0, 3, 3, RED, BlendMode::Alpha);
        for x in 1..=10 {
            assert_eq!(ctx.get_pixel(x, 2), Some(RED));
        }
        for y in 4..=11 {
            assert_eq!(ctx.get_pixel(5, y), Some(RED));
        }
        for i in 0..=3 {
            assert_eq!(ctx.get_pixel(i, i), Some(RED));
        }
    }

    #[test]
    fn test_wu_general_line_splits_intensity() {
        let mut buffer = PixelBuffer::new(16, 8);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_wu(0, 0, 10, 3, RED, BlendMode::Alpha);

        assert_eq!(ctx.get_pixel(0, 0), Some(RED));
        assert_eq!(ctx.get_pixel(10, 3), Some(RED));
        for x in 1..10 {
            let total: u32 = (0..8).map(|y| alpha_at(&ctx, x, y)).sum();
            assert!((250..=255).contains(&total), "column {} total {}", x, total);
        }
        assert_eq!(alpha_at(&ctx, 11, 3), 0);
    }

    #[test]
    fn test_wu_steep_line_pairs_horizontally() {
        let mut buffer = PixelBuffer::new(8, 16);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_wu(6, 14, 1, 1, RED, BlendMode::Alpha);
        for y in 2..14 {
            let total: u32 = (0..8).map(|x| alpha_at(&ctx, x, y)).sum();
            assert!((250..=255).contains(&total), "row {} total {}", y, total);
        }
    }

    #[test]
    fn test_wu_offscreen_is_skipped() {
        let mut buffer = PixelBuffer::new(4, 4);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_wu(-10, -3, 30, 9, RED, BlendMode::Alpha);
        ctx.draw_line_wu(-10, 2, 30, 2, RED, BlendMode::None);
        assert_eq!(ctx.get_pixel(3, 2), Some(RED));
    }

    #[test]
    fn test_aa_horizontal_coverage() {
        let mut buffer = PixelBuffer::new(16, 16);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_aa(2, 5, 12, 5, RED);
        // on-line pixels at 0.75 coverage, neighbours at 0.25
        assert_eq!(alpha_at(&ctx, 7, 5), 191);
        assert_eq!(alpha_at(&ctx, 7, 4), 63);
        assert_eq!(alpha_at(&ctx, 7, 6), 63);
        assert_eq!(alpha_at(&ctx, 7, 3), 0);
        assert_eq!(alpha_at(&ctx, 13, 5), 0);
        assert_eq!(alpha_at(&ctx, 1, 5), 0);
    }

    #[test]
    fn test_aa_zero_length_is_noop() {
        let mut buffer = PixelBuffer::new(4, 4);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_aa(2, 2, 2, 2, RED);
        assert!(ctx.pixels().iter().all(|p| *p == 0));
    }

    #[test]
    fn test_aa_edge_neighbours_do_not_wrap() {
        let mut buffer = PixelBuffer::new(8, 8);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        // runs down column 0: the left neighbour would land on the
        // previous row's last pixel without the column test
        ctx.draw_line_aa(0, 0, 0, 7, RED);
        for y in 0..8 {
            assert_eq!(alpha_at(&ctx, 7, y), 0, "wrapped into row {}", y);
            assert!(alpha_at(&ctx, 0, y) > 0);
        }
        // along the top and bottom rows
        ctx.draw_line_aa(0, 0, 7, 0, RED);
        ctx.draw_line_aa(7, 7, 0, 7, RED);
        ctx.draw_line_aa(7, 0, 7, 7, RED);
    }

    #[test]
    fn test_aa_polyline_visits_every_vertex() {
        let mut buffer = PixelBuffer::new(16, 16);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_polyline_aa(&[2, 2, 12, 2, 12, 12], RED);
        assert!(alpha_at(&ctx, 7, 2) > 0);
        assert!(alpha_at(&ctx, 12, 7) > 0);
        assert_eq!(alpha_at(&ctx, 5, 9), 0);
    }

    #[test]
    fn test_aa_long_line_on_wide_surface() {
        let mut buffer = PixelBuffer::new(50_000, 1);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_aa(0, 0, 49_999, 0, RED);
        assert_eq!(alpha_at(&ctx, 0, 0), 191);
        assert_eq!(alpha_at(&ctx, 25_000, 0), 191);
        assert_eq!(alpha_at(&ctx, 49_999, 0), 191);
    }

    #[test]
    fn test_aa_clips_to_surface() {
        let mut buffer = PixelBuffer::new(10, 10);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.draw_line_aa(-20, -20, 40, 40, RED);
        ctx.draw_line_aa(-20, 5, -1, 5, RED);
        assert!(alpha_at(&ctx, 5, 5) > 0);
        assert!(alpha_at(&ctx, 0, 0) > 0);
        assert!(alpha_at(&ctx, 9, 9) > 0);
    }
}
