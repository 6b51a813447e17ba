//! Geometric primitives in canvas (world) coordinates

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    #[inline]
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point `radius` away along `angle` (radians, clockwise from +x)
    #[inline]
    #[must_use]
    pub fn polar_offset(self, angle: f64, radius: f64) -> Point {
        Point::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }

    /// Check if both coordinates are finite
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Mean of a set of points, `None` if empty
    #[must_use]
    pub fn centroid(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` with its top-left corner at `origin`
    #[inline]
    #[must_use]
    pub const fn at(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Right edge
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if `point` lies inside (edges inclusive)
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Separating-axis overlap test with `padding` kept clear between boxes
    ///
    /// Boxes that only touch at `padding` distance do not overlap.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Rect, padding: f64) -> bool {
        self.x < other.right() + padding
            && other.x < self.right() + padding
            && self.y < other.bottom() + padding
            && other.y < self.bottom() + padding
    }
}

/// A node already on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    /// Element key or preview id
    pub id: String,
    /// Top-left corner
    pub position: Point,
    /// Explicit size; the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl CanvasNode {
    /// Node with the default size
    #[must_use]
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            size: None,
        }
    }

    /// Set an explicit size, returning self
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Bounding box, using `default_size` when no size is set
    #[inline]
    #[must_use]
    pub fn bounds(&self, default_size: Size) -> Rect {
        Rect::at(self.position, self.size.unwrap_or(default_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_strict_with_padding() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(a.overlaps(&Rect::new(110.0, 0.0, 100.0, 50.0), 20.0));
        assert!(!a.overlaps(&Rect::new(120.0, 0.0, 100.0, 50.0), 20.0));
        assert!(!a.overlaps(&Rect::new(0.0, 70.0, 100.0, 50.0), 20.0));
        assert!(a.overlaps(&Rect::new(-50.0, -20.0, 100.0, 50.0), 0.0));
    }

    #[test]
    fn centroid_and_distance() {
        let c = Point::centroid(&[Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(2.0, 6.0)]);
        assert_eq!(c, Some(Point::new(2.0, 2.0)));
        assert_eq!(Point::centroid(&[]), None);
        assert!((Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn node_bounds_fall_back_to_default_size() {
        let node = CanvasNode::new("g:1", Point::new(10.0, 20.0));
        let bounds = node.bounds(Size::new(300.0, 150.0));
        assert_eq!(bounds.right(), 310.0);
        assert_eq!(bounds.center(), Point::new(160.0, 95.0));
        assert!(bounds.contains(Point::new(310.0, 170.0)));
    }
}
