//! Curve tessellation: cubic Bézier and Cardinal splines.
//!
//! Tessellators are pure and return flat `[x0, y0, x1, y1, ...]` lists
//! that the polyline and polygon routines consume. The sample step is
//! `step_factor / len`, where `len` is the larger side of the control
//! points' bounding box, so bigger curves get more segments.

use log::warn;

use crate::color::{BlendMode, Color};
use crate::surface::BitmapContext;

/// Default tessellation step factor
pub const DEFAULT_STEP_FACTOR: f32 = 2.0;

/// Smallest step factor honoured; finer values are raised to this
pub const MIN_STEP_FACTOR: f32 = 0.01;

fn sanitize_step_factor(step_factor: f32) -> f32 {
    if step_factor.is_finite() && step_factor > 0.0 {
        step_factor.max(MIN_STEP_FACTOR)
    } else {
        warn!(
            "invalid step factor {}, using {}",
            step_factor, DEFAULT_STEP_FACTOR
        );
        DEFAULT_STEP_FACTOR
    }
}

/// Larger side of the bounding box of four points
fn bounding_len(xs: [i32; 4], ys: [i32; 4]) -> i32 {
    let span = |v: [i32; 4]| {
        let (mut lo, mut hi) = (v[0], v[0]);
        for c in v {
            lo = lo.min(c);
            hi = hi.max(c);
        }
        hi.saturating_sub(lo)
    };
    span(xs).max(span(ys))
}

/// Sample parameters `0, step, 2 * step, ...` up to and including 1
fn samples(len: i32, step_factor: f32) -> impl Iterator<Item = f32> {
    let step = sanitize_step_factor(step_factor) / len as f32;
    (0u32..)
        .map(move |i| i as f32 * step)
        .take_while(|t| *t <= 1.0)
}

/// Tessellate one cubic Bézier from `(x1, y1)` to `(x2, y2)` with control
/// points `(cx1, cy1)` and `(cx2, cy2)`.
///
/// The exact end point is always appended last. Coincident control points
/// (zero-size bounding box) give an empty list.
pub fn bezier_points(
    x1: i32,
    y1: i32,
    cx1: i32,
    cy1: i32,
    cx2: i32,
    cy2: i32,
    x2: i32,
    y2: i32,
    step_factor: f32,
) -> Vec<i32> {
    let len = bounding_len([x1, cx1, cx2, x2], [y1, cy1, cy2, y2]);
    if len <= 0 {
        return Vec::new();
    }
    let (fx1, fy1, fcx1, fcy1) = (x1 as f32, y1 as f32, cx1 as f32, cy1 as f32);
    let (fcx2, fcy2, fx2, fy2) = (cx2 as f32, cy2 as f32, x2 as f32, y2 as f32);

    let mut points = Vec::new();
    for t in samples(len, step_factor) {
        let t_sq = t * t;
        let t1 = 1.0 - t;
        let t1_sq = t1 * t1;
        let a = t1 * t1_sq;
        let b = 3.0 * t * t1_sq;
        let c = 3.0 * t1 * t_sq;
        let d = t * t_sq;
        points.push((a * fx1 + b * fcx1 + c * fcx2 + d * fx2) as i32);
        points.push((a * fy1 + b * fcy1 + c * fcy2 + d * fy2) as i32);
    }
    points.push(x2);
    points.push(y2);
    points
}

/// Tessellate a chain of cubic Béziers.
///
/// `points` holds the start point followed by three points per segment
/// (two controls and the end point), the end point of one segment being
/// the start of the next.
pub fn beziers_points(points: &[i32], step_factor: f32) -> Vec<i32> {
    let mut out = Vec::new();
    if points.len() < 8 {
        return out;
    }
    let mut i = 0;
    while i + 7 < points.len() {
        let p = &points[i..i + 8];
        out.extend(bezier_points(
            p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], step_factor,
        ));
        i += 6;
    }
    out
}

/// Tessellate the Cardinal segment between `(x2, y2)` and `(x3, y3)`.
///
/// `(x1, y1)` and `(x4, y4)` are the neighbouring control points that shape
/// the tangents; `tension` scales them (0 gives straight lines, 0.5 is
/// Catmull-Rom).
pub fn cardinal_segment_points(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    x3: i32,
    y3: i32,
    x4: i32,
    y4: i32,
    tension: f32,
    step_factor: f32,
) -> Vec<i32> {
    let len = bounding_len([x1, x2, x3, x4], [y1, y2, y3, y4]);
    if len <= 0 {
        return Vec::new();
    }

    // Tangents
    let sx1 = tension * (x3 - x1) as f32;
    let sy1 = tension * (y3 - y1) as f32;
    let sx2 = tension * (x4 - x2) as f32;
    let sy2 = tension * (y4 - y2) as f32;

    let (fx2, fy2, fx3, fy3) = (x2 as f32, y2 as f32, x3 as f32, y3 as f32);
    let ax = sx1 + sx2 + 2.0 * fx2 - 2.0 * fx3;
    let ay = sy1 + sy2 + 2.0 * fy2 - 2.0 * fy3;
    let bx = -2.0 * sx1 - sx2 - 3.0 * fx2 + 3.0 * fx3;
    let by = -2.0 * sy1 - sy2 - 3.0 * fy2 + 3.0 * fy3;

    let mut points = Vec::new();
    for t in samples(len, step_factor) {
        let t_sq = t * t;
        points.push((ax * t_sq * t + bx * t_sq + sx1 * t + fx2) as i32);
        points.push((ay * t_sq * t + by * t_sq + sy1 * t + fy2) as i32);
    }
    points.push(x3);
    points.push(y3);
    points
}

/// Append the Cardinal segment from point `i` to point `j` of `points`,
/// shaped by points `h` and `k`
fn push_segment(
    out: &mut Vec<i32>,
    points: &[i32],
    [h, i, j, k]: [usize; 4],
    tension: f32,
    step_factor: f32,
) {
    out.extend(cardinal_segment_points(
        points[h * 2],
        points[h * 2 + 1],
        points[i * 2],
        points[i * 2 + 1],
        points[j * 2],
        points[j * 2 + 1],
        points[k * 2],
        points[k * 2 + 1],
        tension,
        step_factor,
    ));
}

/// Open Cardinal spline through every point of a flat list.
/// The end segments reuse their end point as the missing neighbour.
pub fn curve_points(points: &[i32], tension: f32, step_factor: f32) -> Vec<i32> {
    let n = points.len() / 2;
    let mut out = Vec::new();
    if n < 2 {
        return out;
    }
    for i in 0..n - 1 {
        let h = i.saturating_sub(1);
        let k = (i + 2).min(n - 1);
        push_segment(&mut out, points, [h, i, i + 1, k], tension, step_factor);
    }
    out
}

/// Closed Cardinal spline; the last point joins back to the first
pub fn curve_closed_points(points: &[i32], tension: f32, step_factor: f32) -> Vec<i32> {
    let n = points.len() / 2;
    let mut out = Vec::new();
    if n < 2 {
        return out;
    }
    for i in 0..n {
        let h = (i + n - 1) % n;
        let k = (i + 2) % n;
        push_segment(&mut out, points, [h, i, (i + 1) % n, k], tension, step_factor);
    }
    out
}

/// Append the first point so the filler closes the outline
fn closed(mut points: Vec<i32>) -> Vec<i32> {
    if points.len() >= 2 {
        let (x, y) = (points[0], points[1]);
        points.push(x);
        points.push(y);
    }
    points
}

impl BitmapContext<'_> {
    pub fn draw_bezier(
        &mut self,
        x1: i32,
        y1: i32,
        cx1: i32,
        cy1: i32,
        cx2: i32,
        cy2: i32,
        x2: i32,
        y2: i32,
        color: Color,
        mode: BlendMode,
    ) {
        let points = bezier_points(x1, y1, cx1, cy1, cx2, cy2, x2, y2, DEFAULT_STEP_FACTOR);
        self.draw_polyline(&points, color, mode);
    }

    /// Draw a Bézier chain (see [`beziers_points`])
    pub fn draw_beziers(&mut self, points: &[i32], color: Color, mode: BlendMode) {
        let points = beziers_points(points, DEFAULT_STEP_FACTOR);
        self.draw_polyline(&points, color, mode);
    }

    pub fn draw_curve(&mut self, points: &[i32], tension: f32, color: Color, mode: BlendMode) {
        let points = curve_points(points, tension, DEFAULT_STEP_FACTOR);
        self.draw_polyline(&points, color, mode);
    }

    pub fn draw_curve_closed(
        &mut self,
        points: &[i32],
        tension: f32,
        color: Color,
        mode: BlendMode,
    ) {
        let points = curve_closed_points(points, tension, DEFAULT_STEP_FACTOR);
        self.draw_polyline(&points, color, mode);
    }

    /// Fill the area enclosed by a Bézier chain and the chord back to its start
    pub fn fill_beziers(&mut self, points: &[i32], color: Color, mode: BlendMode) {
        let points = closed(beziers_points(points, DEFAULT_STEP_FACTOR));
        self.fill_polygon(&points, color, mode);
    }

    /// Fill the area enclosed by an open spline and the chord back to its start
    pub fn fill_curve(&mut self, points: &[i32], tension: f32, color: Color, mode: BlendMode) {
        let points = closed(curve_points(points, tension, DEFAULT_STEP_FACTOR));
        self.fill_polygon(&points, color, mode);
    }

    pub fn fill_curve_closed(
        &mut self,
        points: &[i32],
        tension: f32,
        color: Color,
        mode: BlendMode,
    ) {
        let points = closed(curve_closed_points(points, tension, DEFAULT_STEP_FACTOR));
        self.fill_polygon(&points, color, mode);
    }
}
