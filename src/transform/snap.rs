use crate::math::Point3;

use super::Axis;

/// Rounds `value` to the nearest multiple of `grid`. A non-positive grid
/// leaves the value untouched.
#[must_use]
pub fn snap_scalar(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Snaps every coordinate of `p` independently.
#[must_use]
pub fn snap_to_grid(p: &Point3, grid: f64) -> Point3 {
    Point3::new(
        snap_scalar(p.x, grid),
        snap_scalar(p.y, grid),
        snap_scalar(p.z, grid),
    )
}

/// Snaps only the listed coordinates of `p`.
#[must_use]
pub fn snap_axes(p: &Point3, grid: f64, axes: &[Axis]) -> Point3 {
    let mut out = *p;
    for axis in axes {
        let slot = match axis {
            Axis::X => &mut out.x,
            Axis::Y => &mut out.y,
            Axis::Z => &mut out.z,
        };
        *slot = snap_scalar(*slot, grid);
    }
    out
}
