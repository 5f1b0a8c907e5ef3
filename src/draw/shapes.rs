//! Rectangles, ellipses, triangles and quads.

use log::trace;

use crate::color::{BlendMode, Color, Paint};
use crate::surface::BitmapContext;

/// Incremental state of the two-phase midpoint ellipse
/// (Kennedy's Bresenham-type algorithm).
struct EllipseStepper {
    x: i32,
    y: i32,
    x_change: i64,
    y_change: i64,
    err: i64,
    x_stopping: i64,
    y_stopping: i64,
    xr_sq_two: i64,
    yr_sq_two: i64,
}

impl EllipseStepper {
    /// Phase one starts on the x axis and steps y while the tangent slope
    /// is steeper than -1
    fn first_phase(xr: i32, yr: i32) -> Self {
        let (xr64, yr64) = (i64::from(xr), i64::from(yr));
        let xr_sq_two = (xr64 * xr64) << 1;
        let yr_sq_two = (yr64 * yr64) << 1;
        Self {
            x: xr,
            y: 0,
            x_change: yr64 * yr64 * (1 - (xr64 << 1)),
            y_change: xr64 * xr64,
            err: 0,
            x_stopping: yr_sq_two * xr64,
            y_stopping: 0,
            xr_sq_two,
            yr_sq_two,
        }
    }

    /// Phase two starts on the y axis and steps x
    fn second_phase(xr: i32, yr: i32) -> Self {
        let (xr64, yr64) = (i64::from(xr), i64::from(yr));
        let xr_sq_two = (xr64 * xr64) << 1;
        let yr_sq_two = (yr64 * yr64) << 1;
        Self {
            x: 0,
            y: yr,
            x_change: yr64 * yr64,
            y_change: xr64 * xr64 * (1 - (yr64 << 1)),
            err: 0,
            x_stopping: 0,
            y_stopping: xr_sq_two * yr64,
            xr_sq_two,
            yr_sq_two,
        }
    }

    fn first_running(&self) -> bool {
        self.x_stopping >= self.y_stopping
    }

    fn second_running(&self) -> bool {
        self.x_stopping <= self.y_stopping
    }

    /// Advance phase one; returns true when x stepped inwards
    fn step_first(&mut self) -> bool {
        self.y += 1;
        self.y_stopping += self.xr_sq_two;
        self.err += self.y_change;
        self.y_change += self.xr_sq_two;
        if self.x_change + (self.err << 1) > 0 {
            self.x -= 1;
            self.x_stopping -= self.yr_sq_two;
            self.err += self.x_change;
            self.x_change += self.yr_sq_two;
            return true;
        }
        false
    }

    /// Advance phase two; returns true when y stepped inwards
    fn step_second(&mut self) -> bool {
        self.x += 1;
        self.x_stopping += self.yr_sq_two;
        self.err += self.x_change;
        self.x_change += self.yr_sq_two;
        if self.y_change + (self.err << 1) > 0 {
            self.y -= 1;
            self.y_stopping -= self.xr_sq_two;
            self.err += self.y_change;
            self.y_change += self.xr_sq_two;
            return true;
        }
        false
    }
}

impl BitmapContext<'_> {
    /// Fill the half-open rectangle `[x1, x2) x [y1, y2)`.
    ///
    /// Corners are swapped if reversed and clamped to the surface. Opaque
    /// fills write the top row, then grow the filled block by copying it
    /// downwards (1 row, 2 rows, 4 rows, ...). Blended fills composite every
    /// row, since a copy cannot blend.
    pub fn fill_rectangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let w = self.width();
        let h = self.height();
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        if x2 < 0 || y2 < 0 || x1 >= w || y1 >= h {
            return;
        }
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(w);
        let y2 = y2.min(h);
        if x1 == x2 || y1 == y2 {
            return;
        }

        let paint = Paint::new(color, mode);
        let stride = self.stride() as usize;
        let len = (x2 - x1) as usize;
        let rows = (y2 - y1) as usize;
        let first = self.index(x1, y1);

        if !paint.is_direct() {
            for row in 0..rows {
                let start = first + row * stride;
                self.plot_span(start, start + len, &paint);
            }
            return;
        }

        self.plot_span(first, first + len, &paint);
        let full_width = len == stride;
        let pixels = self.pixels_mut();
        let mut done = 1;
        while done < rows {
            let n = done.min(rows - done);
            if full_width {
                let src = first..first + n * stride;
                pixels.copy_within(src, first + done * stride);
            } else {
                for row in 0..n {
                    let src = first + row * stride;
                    pixels.copy_within(src..src + len, first + (done + row) * stride);
                }
            }
            done += n;
        }
    }

    /// Rectangle outline with inclusive corners.
    /// Corners are clamped into the surface, so an off-surface edge is
    /// drawn along the border.
    pub fn draw_rectangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let w = self.width();
        let h = self.height();
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        if x2 < 0 || y2 < 0 || x1 >= w || y1 >= h {
            return;
        }
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(w - 1);
        let y2 = y2.min(h - 1);

        let paint = Paint::new(color, mode);
        let top = self.index(x1, y1);
        let span = (x2 - x1 + 1) as usize;
        self.plot_span(top, top + span, &paint);
        if y2 != y1 {
            let bottom = self.index(x1, y2);
            self.plot_span(bottom, bottom + span, &paint);
        }
        for y in (y1 + 1)..y2 {
            let left = self.index(x1, y);
            self.plot_index(left, &paint);
            if x2 != x1 {
                let right = self.index(x2, y);
                self.plot_index(right, &paint);
            }
        }
    }

    /// Plot the four symmetric points of an ellipse quadrant step,
    /// clamped into the surface; coinciding points are written once.
    fn plot_quadrants(&mut self, xc: i32, yc: i32, x: i32, y: i32, paint: &Paint) {
        let w = self.width();
        let h = self.height();
        let rx = (xc + x).clamp(0, w - 1);
        let lx = (xc - x).clamp(0, w - 1);
        let uy = (yc + y).clamp(0, h - 1);
        let ly = (yc - y).clamp(0, h - 1);

        for (row, first_row) in [(uy, true), (ly, false)] {
            if !first_row && row == uy {
                break;
            }
            let right = self.index(rx, row);
            self.plot_index(right, paint);
            if lx != rx {
                let left = self.index(lx, row);
                self.plot_index(left, paint);
            }
        }
    }

    /// Ellipse outline centred on `(xc, yc)` with radii `xr`, `yr`.
    /// Radii below 1 draw nothing.
    pub fn draw_ellipse_centered(
        &mut self,
        xc: i32,
        yc: i32,
        xr: i32,
        yr: i32,
        color: Color,
        mode: BlendMode,
    ) {
        if xr < 1 || yr < 1 {
            trace!("ellipse with radius {}x{} skipped", xr, yr);
            return;
        }
        let paint = Paint::new(color, mode);

        let mut e = EllipseStepper::first_phase(xr, yr);
        while e.first_running() {
            self.plot_quadrants(xc, yc, e.x, e.y, &paint);
            e.step_first();
        }

        let mut e = EllipseStepper::second_phase(xr, yr);
        while e.second_running() {
            self.plot_quadrants(xc, yc, e.x, e.y, &paint);
            e.step_second();
        }
    }

    /// Ellipse outline `thickness` pixels wide.
    ///
    /// Half the extra width goes outwards (`outer = thickness / 2`), the
    /// rest inwards. Phase one widens horizontally, phase two vertically;
    /// the notch left between them near the 45 degree point is filled with
    /// an `outer` x `outer` patch. That patch is a heuristic and may leave
    /// single-pixel gaps for some radius/thickness pairs.
    pub fn draw_ellipse_centered_thick(
        &mut self,
        xc: i32,
        yc: i32,
        xr: i32,
        yr: i32,
        thickness: i32,
        color: Color,
        mode: BlendMode,
    ) {
        if thickness <= 1 {
            self.draw_ellipse_centered(xc, yc, xr, yr, color, mode);
            return;
        }
        if xr < 1 || yr < 1 {
            trace!("ellipse with radius {}x{} skipped", xr, yr);
            return;
        }
        let paint = Paint::new(color, mode);
        let outer = thickness / 2;
        let inner = thickness - 1 - outer;

        let mut e = EllipseStepper::first_phase(xr, yr);
        let mut corner = (e.x, e.y);
        while e.first_running() {
            for t in -inner..=outer {
                self.plot_quadrants(xc, yc, (e.x + t).max(0), e.y, &paint);
            }
            corner = (e.x, e.y);
            e.step_first();
        }

        let mut e = EllipseStepper::second_phase(xr, yr);
        while e.second_running() {
            for t in -inner..=outer {
                self.plot_quadrants(xc, yc, e.x, (e.y + t).max(0), &paint);
            }
            e.step_second();
        }

        // Octant transition gap
        for i in 0..=outer {
            for j in 0..=outer {
                self.plot_quadrants(xc, yc, corner.0 + i, corner.1 + j, &paint);
            }
        }
    }

    /// Fill one symmetric pair of ellipse rows with a span of half-width `x`.
    /// Rows outside the surface are skipped, spans are clamped.
    fn fill_ellipse_rows(&mut self, xc: i32, yc: i32, x: i32, y: i32, paint: &Paint) {
        let w = self.width();
        let h = self.height();
        let left = xc - x;
        let right = xc + x;
        if right < 0 || left >= w {
            return;
        }
        let left = left.max(0);
        let right = right.min(w - 1);

        let rows = if y == 0 { [yc, yc] } else { [yc + y, yc - y] };
        for (i, row) in rows.into_iter().enumerate() {
            if (i == 1 && y == 0) || row < 0 || row >= h {
                continue;
            }
            let start = self.index(left, row);
            let end = self.index(right, row) + 1;
            self.plot_span(start, end, paint);
        }
    }

    /// Filled ellipse centred on `(xc, yc)`.
    ///
    /// Spans follow the midpoint outline. Each row is filled exactly once,
    /// so translucent fills do not compound.
    pub fn fill_ellipse_centered(
        &mut self,
        xc: i32,
        yc: i32,
        xr: i32,
        yr: i32,
        color: Color,
        mode: BlendMode,
    ) {
        if xr < 1 || yr < 1 {
            trace!("ellipse with radius {}x{} skipped", xr, yr);
            return;
        }
        let w = self.width();
        let h = self.height();
        if xc - xr >= w || xc + xr < 0 || yc - yr >= h || yc + yr < 0 {
            return;
        }
        let paint = Paint::new(color, mode);

        // Phase one visits a new row on every step
        let mut e = EllipseStepper::first_phase(xr, yr);
        let mut filled_to = -1;
        while e.first_running() {
            self.fill_ellipse_rows(xc, yc, e.x, e.y, &paint);
            filled_to = e.y;
            e.step_first();
        }

        // Phase two stays on a row for several steps; fill it on leaving
        let mut e = EllipseStepper::second_phase(xr, yr);
        let mut pending = false;
        while e.second_running() {
            pending = true;
            let (x, y) = (e.x, e.y);
            if e.step_second() {
                if y > filled_to {
                    self.fill_ellipse_rows(xc, yc, x, y, &paint);
                }
                pending = false;
            }
        }
        if pending && e.y > filled_to {
            self.fill_ellipse_rows(xc, yc, e.x - 1, e.y, &paint);
        }
    }

    /// Ellipse outline inscribed in the box `(x1, y1)-(x2, y2)`
    pub fn draw_ellipse(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let xr = (x2 - x1) >> 1;
        let yr = (y2 - y1) >> 1;
        self.draw_ellipse_centered(x1 + xr, y1 + yr, xr, yr, color, mode);
    }

    /// Filled ellipse inscribed in the box `(x1, y1)-(x2, y2)`
    pub fn fill_ellipse(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let xr = (x2 - x1) >> 1;
        let yr = (y2 - y1) >> 1;
        self.fill_ellipse_centered(x1 + xr, y1 + yr, xr, yr, color, mode);
    }

    pub fn draw_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: Color,
        mode: BlendMode,
    ) {
        self.draw_line(x1, y1, x2, y2, color, mode);
        self.draw_line(x2, y2, x3, y3, color, mode);
        self.draw_line(x3, y3, x1, y1, color, mode);
    }

    pub fn draw_quad(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        x4: i32,
        y4: i32,
        color: Color,
        mode: BlendMode,
    ) {
        self.draw_line(x1, y1, x2, y2, color, mode);
        self.draw_line(x2, y2, x3, y3, color, mode);
        self.draw_line(x3, y3, x4, y4, color, mode);
        self.draw_line(x4, y4, x1, y1, color, mode);
    }

    pub fn fill_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: Color,
        mode: BlendMode,
    ) {
        self.fill_polygon(&[x1, y1, x2, y2, x3, y3, x1, y1], color, mode);
    }

    pub fn fill_quad(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        x4: i32,
        y4: i32,
        color: Color,
        mode: BlendMode,
    ) {
        self.fill_polygon(&[x1, y1, x2, y2, x3, y3, x4, y4, x1, y1], color, mode);
    }
}
