//! Exact integer geometric predicates.
//!
//! Grid coordinates are small integers, so every determinant is evaluated in
//! `i64` without rounding. The in-circle determinant is exact for grids up to
//! 16384 samples on a side.

use glam::IVec2;

/// Whether `p0`, `p1`, `p2` lie on one line.
#[inline]
#[must_use]
pub fn collinear(p0: IVec2, p1: IVec2, p2: IVec2) -> bool {
    let (x0, y0) = (i64::from(p0.x), i64::from(p0.y));
    let (x1, y1) = (i64::from(p1.x), i64::from(p1.y));
    let (x2, y2) = (i64::from(p2.x), i64::from(p2.y));
    (y1 - y0) * (x2 - x1) == (y2 - y1) * (x1 - x0)
}

/// Whether `p` lies strictly inside the circumcircle of `(a, b, c)`.
///
/// `(a, b, c)` must have the mesh's winding, i.e. a positive
/// [`strata_heightfield::edge_function`]. Points on the circle are outside,
/// which keeps cocircular grid configurations from flipping forever.
#[inline]
#[must_use]
pub fn in_circle(a: IVec2, b: IVec2, c: IVec2, p: IVec2) -> bool {
    let dx = i64::from(a.x - p.x);
    let dy = i64::from(a.y - p.y);
    let ex = i64::from(b.x - p.x);
    let ey = i64::from(b.y - p.y);
    let fx = i64::from(c.x - p.x);
    let fy = i64::from(c.y - p.y);

    let ap = dx * dx + dy * dy;
    let bp = ex * ex + ey * ey;
    let cp = fx * fx + fy * fy;

    dx * (ey * cp - bp * fy) - dy * (ex * cp - bp * fx) + ap * (ex * fy - ey * fx) < 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_heightfield::edge_function;

    #[test]
    fn test_collinear_axis_and_diagonal() {
        assert!(collinear(IVec2::new(0, 0), IVec2::new(0, 5), IVec2::new(0, 2)));
        assert!(collinear(IVec2::new(1, 1), IVec2::new(4, 4), IVec2::new(9, 9)));
        assert!(!collinear(IVec2::new(0, 0), IVec2::new(4, 4), IVec2::new(1, 2)));
    }

    #[test]
    fn test_in_circle_center_is_inside() {
        let a = IVec2::new(0, 0);
        let b = IVec2::new(0, 2);
        let c = IVec2::new(2, 0);
        assert!(edge_function(a, b, c) > 0);
        assert!(in_circle(a, b, c, IVec2::new(1, 1)));
        assert!(!in_circle(a, b, c, IVec2::new(5, 5)));
    }

    #[test]
    fn test_cocircular_point_is_not_inside() {
        // The fourth corner of a square lies exactly on the circle.
        let a = IVec2::new(0, 0);
        let b = IVec2::new(0, 2);
        let c = IVec2::new(2, 0);
        assert!(!in_circle(a, b, c, IVec2::new(2, 2)));
    }

    #[test]
    fn test_large_coordinates_do_not_overflow() {
        let a = IVec2::new(0, 0);
        let b = IVec2::new(0, 16_000);
        let c = IVec2::new(16_000, 0);
        assert!(in_circle(a, b, c, IVec2::new(8_000, 8_000)));
        assert!(!in_circle(a, b, c, IVec2::new(16_001, 16_001)));
    }
}
