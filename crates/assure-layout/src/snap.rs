//! Grid snapping

use crate::geometry::Point;

/// Round `value` to the nearest multiple of `cell`
///
/// Halfway values round towards positive infinity. A non-positive or
/// non-finite cell leaves the value unchanged.
#[inline]
#[must_use]
pub fn snap_value(value: f64, cell: f64) -> f64 {
    if !(cell.is_finite() && cell > 0.0) {
        return value;
    }
    (value / cell + 0.5).floor() * cell
}

/// Snap both axes of `point` independently
#[inline]
#[must_use]
pub fn snap_to_grid(point: Point, cell: f64) -> Point {
    Point::new(snap_value(point.x, cell), snap_value(point.y, cell))
}
