//! Screen-to-world mapping supplied by the hosting canvas

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Maps pointer coordinates into canvas coordinates
///
/// Implemented for any `Fn(Point) -> Point`, so a closure over the host's
/// own transform works directly.
pub trait CanvasTransform {
    /// Convert a screen point to world coordinates
    fn screen_to_world(&self, point: Point) -> Point;
}

impl<F> CanvasTransform for F
where
    F: Fn(Point) -> Point,
{
    fn screen_to_world(&self, point: Point) -> Point {
        self(point)
    }
}

/// Screen and world coordinates coincide
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl CanvasTransform for Identity {
    #[inline]
    fn screen_to_world(&self, point: Point) -> Point {
        point
    }
}

/// Pan and zoom of a canvas view
///
/// A world point `w` appears on screen at `w * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport
    #[inline]
    #[must_use]
    pub const fn new(pan: Point, zoom: f64) -> Self {
        Self { pan, zoom }
    }

    /// Convert a world point to screen coordinates
    #[inline]
    #[must_use]
    pub fn world_to_screen(&self, point: Point) -> Point {
        Point::new(point.x * self.zoom + self.pan.x, point.y * self.zoom + self.pan.y)
    }
}

impl CanvasTransform for Viewport {
    fn screen_to_world(&self, point: Point) -> Point {
        let shifted = point - self.pan;
        Point::new(shifted.x / self.zoom, shifted.y / self.zoom)
    }
}
