//! The height oracle contract consumed by the triangulator.
//!
//! An oracle answers two questions: the elevation at an integer grid
//! coordinate, and the grid point inside a candidate triangle where the
//! planar interpolation of the triangle deviates most from the true surface.
//! The second query has a provided scan-conversion implementation, so
//! sources only need to supply dimensions and point sampling.

use glam::IVec2;

/// Edge function of `c` against the directed edge `a -> b`.
///
/// Equals twice the signed area of `(a, b, c)`. Triangles produced by the
/// triangulator have a positive value for `edge_function(p0, p1, p2)`.
#[inline]
#[must_use]
pub fn edge_function(a: IVec2, b: IVec2, c: IVec2) -> i64 {
    (i64::from(b.x) - i64::from(c.x)) * (i64::from(a.y) - i64::from(c.y))
        - (i64::from(b.y) - i64::from(c.y)) * (i64::from(a.x) - i64::from(c.x))
}

/// A read-only elevation source over the grid `[0, width) x [0, height)`.
///
/// Implementations must be pure: the same coordinate always yields the same
/// elevation, so one oracle can be shared across worker threads.
pub trait HeightOracle {
    /// Grid width in samples.
    fn width(&self) -> u32;

    /// Grid height in samples.
    fn height(&self) -> u32;

    /// Elevation at an integer grid coordinate inside the grid.
    fn elevation(&self, x: i32, y: i32) -> f32;

    /// Find the grid point of maximum absolute deviation between the plane
    /// through `triangle` and the sampled surface.
    ///
    /// Pixels are visited by scan-converting the triangle's bounding box with
    /// incrementally stepped edge functions; each covered pixel is compared
    /// against the barycentric interpolation of the three corner elevations.
    /// The error is reported as zero when the worst point is one of the
    /// triangle's own vertices, and for degenerate (zero-area) triangles.
    fn find_max_error_point(&self, triangle: [IVec2; 3]) -> (IVec2, f32) {
        let [p0, mut p1, mut p2] = triangle;
        let mut area = edge_function(p0, p1, p2);
        if area == 0 {
            return (p0, 0.0);
        }
        if area < 0 {
            std::mem::swap(&mut p1, &mut p2);
            area = -area;
        }

        let min = p0.min(p1).min(p2);
        let max = p0.max(p1).max(p2);

        let mut w00 = edge_function(p1, p2, min);
        let mut w01 = edge_function(p2, p0, min);
        let mut w02 = edge_function(p0, p1, min);

        let a01 = i64::from(p1.y - p0.y);
        let b01 = i64::from(p0.x - p1.x);
        let a12 = i64::from(p2.y - p1.y);
        let b12 = i64::from(p1.x - p2.x);
        let a20 = i64::from(p0.y - p2.y);
        let b20 = i64::from(p2.x - p0.x);

        let inv_area = 1.0 / area as f64;
        let z0 = f64::from(self.elevation(p0.x, p0.y)) * inv_area;
        let z1 = f64::from(self.elevation(p1.x, p1.y)) * inv_area;
        let z2 = f64::from(self.elevation(p2.x, p2.y)) * inv_area;

        let mut max_error = 0.0_f64;
        let mut max_point = p0;

        for y in min.y..=max.y {
            // Skip the run of pixels left of the triangle on this row.
            let mut dx = 0_i64;
            if w00 < 0 && a12 != 0 {
                dx = dx.max(-w00 / a12);
            }
            if w01 < 0 && a20 != 0 {
                dx = dx.max(-w01 / a20);
            }
            if w02 < 0 && a01 != 0 {
                dx = dx.max(-w02 / a01);
            }

            let mut w0 = w00 + a12 * dx;
            let mut w1 = w01 + a20 * dx;
            let mut w2 = w02 + a01 * dx;

            let mut was_inside = false;
            let mut x = i64::from(min.x) + dx;
            while x <= i64::from(max.x) {
                if w0 >= 0 && w1 >= 0 && w2 >= 0 {
                    was_inside = true;
                    let z = z0 * w0 as f64 + z1 * w1 as f64 + z2 * w2 as f64;
                    let dz = (z - f64::from(self.elevation(x as i32, y))).abs();
                    if dz > max_error {
                        max_error = dz;
                        max_point = IVec2::new(x as i32, y);
                    }
                } else if was_inside {
                    break;
                }
                w0 += a12;
                w1 += a20;
                w2 += a01;
                x += 1;
            }

            w00 += b12;
            w01 += b20;
            w02 += b01;
        }

        if max_point == p0 || max_point == p1 || max_point == p2 {
            max_error = 0.0;
        }
        (max_point, max_error as f32)
    }
}

impl<T: HeightOracle + ?Sized> HeightOracle for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn elevation(&self, x: i32, y: i32) -> f32 {
        (**self).elevation(x, y)
    }

    fn find_max_error_point(&self, triangle: [IVec2; 3]) -> (IVec2, f32) {
        (**self).find_max_error_point(triangle)
    }
}
