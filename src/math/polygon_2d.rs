use super::Point2;

/// Point-in-polygon test in 2D using the winding number algorithm.
///
/// The polygon is implicitly closed (last point connects back to the first).
/// Returns `true` if the point is inside. Polygons with fewer than three
/// points contain nothing.
#[must_use]
pub fn point_in_polygon_2d(point: &Point2, polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    winding_number_2d(point, polygon) != 0
}

/// Winding number of `point` with respect to polygon `verts`.
///
/// Non-zero => inside, zero => outside.
fn winding_number_2d(point: &Point2, verts: &[Point2]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let v0 = verts[i];
        let v1 = verts[(i + 1) % n];
        let side = cross_2d(v1.x - v0.x, v1.y - v0.y, point.x - v0.x, point.y - v0.y);

        if v0.y <= point.y {
            if v1.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if v1.y <= point.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// 2D cross product: `(ax * by - ay * bx)`.
#[inline]
fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}
