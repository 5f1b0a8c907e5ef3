//! Cohen-Sutherland line clipping.
//!
//! Y grows downwards: `TOP` means above `top` (`y < top`), `BOTTOM` below
//! `bottom` (`y > bottom`). Edges are inclusive.

use log::warn;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;
// Valid input converges within 4 clips; NaN intersections may not.
const MAX_ITERATIONS: u32 = 16;

/// Clip rectangle `(left, top, right, bottom)`, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ClipRect {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering every pixel of a `width` x `height` surface
    pub fn for_surface(width: i32, height: i32) -> Self {
        Self::new(0.0, 0.0, f64::from(width - 1), f64::from(height - 1))
    }

    fn outcode(&self, x: f64, y: f64) -> u8 {
        let mut code = INSIDE;
        if x < self.left {
            code |= LEFT;
        } else if x > self.right {
            code |= RIGHT;
        }
        if y < self.top {
            code |= TOP;
        } else if y > self.bottom {
            code |= BOTTOM;
        }
        code
    }
}

/// Coordinate on the other axis where the segment reaches `edge` on the
/// moving axis.
///
/// An infinite moving source skips the division and takes the far
/// endpoint's value, which is where the parameter tends to. This replaces
/// the NaN an unguarded division would produce, so the outcode of the new
/// point stays meaningful.
fn intersect(moving0: f64, other0: f64, moving1: f64, other1: f64, edge: f64) -> f64 {
    if moving0.is_infinite() {
        return other1;
    }
    other0 + (other1 - other0) * (edge - moving0) / (moving1 - moving0)
}

/// Clip the segment `(x0, y0)-(x1, y1)` to `rect` in place.
///
/// Returns `true` when at least part of the segment is visible; the
/// endpoints then hold the clipped segment. A segment that does not
/// converge (degenerate NaN input) is rejected.
pub fn clip_line(rect: &ClipRect, x0: &mut f64, y0: &mut f64, x1: &mut f64, y1: &mut f64) -> bool {
    let mut code0 = rect.outcode(*x0, *y0);
    let mut code1 = rect.outcode(*x1, *y1);

    for _ in 0..MAX_ITERATIONS {
        if (code0 | code1) == 0 {
            return true;
        }
        if (code0 & code1) != 0 {
            return false;
        }

        // Pick the endpoint outside
        let code_out = if code0 != 0 { code0 } else { code1 };
        let (x, y) = if (code_out & TOP) != 0 {
            (intersect(*y0, *x0, *y1, *x1, rect.top), rect.top)
        } else if (code_out & BOTTOM) != 0 {
            (intersect(*y0, *x0, *y1, *x1, rect.bottom), rect.bottom)
        } else if (code_out & RIGHT) != 0 {
            (rect.right, intersect(*x0, *y0, *x1, *y1, rect.right))
        } else {
            (rect.left, intersect(*x0, *y0, *x1, *y1, rect.left))
        };

        if code_out == code0 {
            *x0 = x;
            *y0 = y;
            code0 = rect.outcode(x, y);
        } else {
            *x1 = x;
            *y1 = y;
            code1 = rect.outcode(x, y);
        }
    }

    warn!("line clip did not converge, rejecting segment");
    false
}

/// Integer front end for [`clip_line`]; results are truncated towards zero
pub fn clip_line_i32(rect: &ClipRect, x0: &mut i32, y0: &mut i32, x1: &mut i32, y1: &mut i32) -> bool {
    let (mut fx0, mut fy0) = (f64::from(*x0), f64::from(*y0));
    let (mut fx1, mut fy1) = (f64::from(*x1), f64::from(*y1));
    let visible = clip_line(rect, &mut fx0, &mut fy0, &mut fx1, &mut fy1);
    // `as` saturates and maps NaN to 0
    *x0 = fx0 as i32;
    *y0 = fy0 as i32;
    *x1 = fx1 as i32;
    *y1 = fy1 as i32;
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ClipRect {
        ClipRect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_fully_outside_rejected() {
        let (mut x0, mut y0, mut x1, mut y1) = (-5, -5, -1, -1);
        assert!(!clip_line_i32(&rect(), &mut x0, &mut y0, &mut x1, &mut y1));
    }

    #[test]
    fn test_fully_inside_unchanged() {
        let (mut x0, mut y0, mut x1, mut y1) = (1, 2, 9, 7);
        assert!(clip_line_i32(&rect(), &mut x0, &mut y0, &mut x1, &mut y1));
        assert_eq!((x0, y0, x1, y1), (1, 2, 9, 7));
    }

    #[test]
    fn test_crossing_segment_clipped_to_edges() {
        let (mut x0, mut y0, mut x1, mut y1) = (-10.0, 5.0, 20.0, 5.0);
        assert!(clip_line(&rect(), &mut x0, &mut y0, &mut x1, &mut y1));
        assert_eq!((x0, y0, x1, y1), (0.0, 5.0, 10.0, 5.0));
    }

    #[test]
    fn test_diagonal_clip() {
        let (mut x0, mut y0, mut x1, mut y1) = (-5.0, -5.0, 15.0, 15.0);
        assert!(clip_line(&rect(), &mut x0, &mut y0, &mut x1, &mut y1));
        assert_eq!((x0, y0, x1, y1), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_y_down_convention() {
        // below the rect in screen space
        let (mut x0, mut y0, mut x1, mut y1) = (2.0, 11.0, 8.0, 30.0);
        assert!(!clip_line(&rect(), &mut x0, &mut y0, &mut x1, &mut y1));
        // corner-cutting miss
        let (mut x0, mut y0, mut x1, mut y1) = (-6.0, 4.0, 4.0, -6.0);
        assert!(!clip_line(&rect(), &mut x0, &mut y0, &mut x1, &mut y1));
    }

    #[test_log::test]
    fn test_degenerate_input_terminates() {
        // NaN and infinities must neither hang nor panic; the result itself
        // is unspecified.
        let cases = [
            (f64::NAN, 0.0, 5.0, 5.0),
            (f64::INFINITY, 5.0, 5.0, 5.0),
            (f64::NEG_INFINITY, f64::INFINITY, 5.0, 5.0),
            (5.0, f64::NEG_INFINITY, 5.0, f64::INFINITY),
        ];
        for (a, b, c, d) in cases {
            let (mut x0, mut y0, mut x1, mut y1) = (a, b, c, d);
            let _ = clip_line(&rect(), &mut x0, &mut y0, &mut x1, &mut y1);
        }
    }
}
