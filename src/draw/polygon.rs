//! Even-odd scanline polygon fill.

use crate::color::{BlendMode, Color, Paint};
use crate::surface::BitmapContext;

/// In-place insertion sort; intersection lists are a handful of entries
fn insertion_sort(values: &mut [i32]) {
    for i in 1..values.len() {
        let v = values[i];
        let mut j = i;
        while j > 0 && values[j - 1] > v {
            values[j] = values[j - 1];
            j -= 1;
        }
        values[j] = v;
    }
}

impl BitmapContext<'_> {
    /// Fill a polygon given as a flat `[x0, y0, x1, y1, ...]` list.
    ///
    /// Edges join consecutive points only; pass the first point again at
    /// the end to close the shape. Each scanline is filled between
    /// intersection pairs (0, 1), (2, 3), ... so self-intersecting shapes
    /// follow the even-odd rule. An edge counts on rows `min <= y < max`,
    /// except on the polygon's last row where it counts on `min < y <= max`,
    /// so shared vertices and horizontal edges are never counted twice and
    /// the bottom row is still closed.
    pub fn fill_polygon(&mut self, points: &[i32], color: Color, mode: BlendMode) {
        let n = points.len() / 2;
        if n < 2 {
            return;
        }
        let w = self.width();
        let h = self.height();

        let (mut y_min, mut y_max) = (i32::MAX, i32::MIN);
        for p in points.chunks_exact(2) {
            y_min = y_min.min(p[1]);
            y_max = y_max.max(p[1]);
        }
        if y_max < 0 || y_min >= h {
            return;
        }
        let last_row = y_max;
        let y_min = y_min.max(0);
        let y_max = y_max.min(h - 1);

        let paint = Paint::new(color, mode);
        let mut crossings: Vec<i32> = Vec::with_capacity(n);

        for y in y_min..=y_max {
            crossings.clear();
            let fy = y as f32;
            for edge in points[..n * 2].windows(4).step_by(2) {
                let (xi, yi, xj, yj) = (edge[0], edge[1], edge[2], edge[3]);
                let (lo, hi) = if yi < yj { (yi, yj) } else { (yj, yi) };
                let hit = if y == last_row {
                    lo < y && y <= hi
                } else {
                    lo <= y && y < hi
                };
                if hit {
                    let (vxi, vyi) = (xi as f32, yi as f32);
                    let (vxj, vyj) = (xj as f32, yj as f32);
                    crossings.push((vxi + (fy - vyi) / (vyj - vyi) * (vxj - vxi)) as i32);
                }
            }
            insertion_sort(&mut crossings);

            for pair in crossings.chunks_exact(2) {
                let (x0, x1) = (pair[0], pair[1]);
                if x1 < 0 || x0 >= w {
                    continue;
                }
                let start = self.index(x0.max(0), y);
                let end = self.index(x1.min(w - 1), y) + 1;
                self.plot_span(start, end, &paint);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{AccessMode, PixelBuffer};

    const FILL: Color = Color::from_rgb(10, 20, 30);

    #[test]
    fn test_insertion_sort() {
        let mut v = [5, -1, 3, 3, 0];
        insertion_sort(&mut v);
        assert_eq!(v, [-1, 0, 3, 3, 5]);
    }

    #[test]
    fn test_closed_rectangle_fills_every_pixel() {
        let (w, h) = (17, 11);
        let mut buffer = PixelBuffer::new(w as usize, h as usize);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.fill_polygon(
            &[0, 0, 0, h - 1, w - 1, h - 1, w - 1, 0, 0, 0],
            FILL,
            BlendMode::None,
        );
        assert!(ctx.pixels().iter().all(|p| *p == FILL.to_packed()));
    }

    #[test]
    fn test_single_column_surface() {
        let mut buffer = PixelBuffer::new(1, 4);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.fill_polygon(&[0, 0, 0, 3, 0, 3, 0, 0, 0, 0], FILL, BlendMode::None);
        assert!(ctx.pixels().iter().all(|p| *p == FILL.to_packed()));
    }

    #[test]
    fn test_degenerate_polygons_are_noops() {
        let mut buffer = PixelBuffer::new(8, 8);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.fill_polygon(&[], FILL, BlendMode::None);
        ctx.fill_polygon(&[3, 3], FILL, BlendMode::None);
        ctx.fill_polygon(&[1, 2, 6, 2, 1, 2], FILL, BlendMode::None);
        ctx.fill_polygon(&[1, -9, 6, -9, 3, -2, 1, -9], FILL, BlendMode::None);
        assert!(ctx.pixels().iter().all(|p| *p == 0));
    }

    #[test]
    fn test_self_intersecting_even_odd() {
        // bow tie: left and right triangles touching at (8, 8)
        let mut buffer = PixelBuffer::new(17, 17);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.fill_polygon(&[0, 0, 16, 16, 16, 0, 0, 16, 0, 0], FILL, BlendMode::None);
        assert_eq!(ctx.get_pixel(1, 2), Some(FILL));
        assert_eq!(ctx.get_pixel(15, 2), Some(FILL));
        assert_eq!(ctx.get_pixel(8, 2), Some(Color::TRANSPARENT));
        assert_eq!(ctx.get_pixel(8, 14), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_partially_offscreen_polygon_clamped() {
        let mut buffer = PixelBuffer::new(10, 10);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        ctx.fill_polygon(&[-5, -5, 4, -5, 4, 20, -5, 20, -5, -5], FILL, BlendMode::None);
        for y in 0..10 {
            for x in 0..10 {
                let expected = if x <= 4 { FILL } else { Color::TRANSPARENT };
                assert_eq!(ctx.get_pixel(x, y), Some(expected), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_blended_fill_touches_each_pixel_once() {
        let mut buffer = PixelBuffer::new(12, 12);
        let mut ctx = buffer.context(AccessMode::ReadWrite);
        let translucent = Color::from_argb(90, 200, 0, 0);
        ctx.fill_polygon(&[2, 2, 9, 2, 9, 9, 2, 9, 2, 2], translucent, BlendMode::Alpha);
        let single = translucent.to_packed();
        assert!(ctx.pixels().iter().all(|p| *p == 0 || *p == single));
        assert_eq!(ctx.get_pixel_packed(2, 2), Some(single));
        assert_eq!(ctx.get_pixel_packed(9, 9), Some(single));
    }
}
