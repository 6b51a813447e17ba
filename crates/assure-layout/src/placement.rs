//! Overlap detection and spiral search for a free position

use crate::config::LayoutConfig;
use crate::geometry::{CanvasNode, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Spiral directions per revolution
const DIRECTIONS: u32 = 8;

/// How a position was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    /// The desired position was already free
    Desired,
    /// Found by the spiral search
    Spiral,
    /// Search budget exhausted; may overlap
    Fallback,
}

/// Result of [`find_non_overlapping_position`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point,
    /// Spiral candidates evaluated
    pub attempts: u32,
    pub kind: PlacementKind,
}

impl Placement {
    /// Check if the position is guaranteed clear of every node
    #[inline]
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.kind != PlacementKind::Fallback
    }
}

/// Check if a node of `size` at `position` overlaps any of `nodes`
#[must_use]
pub fn overlaps_any(position: Point, size: Size, nodes: &[CanvasNode], config: &LayoutConfig) -> bool {
    let candidate = Rect::at(position, size);
    let default_size = config.node_size();
    nodes
        .iter()
        .any(|node| candidate.overlaps(&node.bounds(default_size), config.padding))
}

/// Candidate `attempt` (0-based) of the spiral around `origin`
///
/// The angle advances by 45° per attempt and the radius grows by one
/// step after each full revolution.
#[must_use]
pub fn spiral_candidate(origin: Point, attempt: u32, step: f64) -> Point {
    let angle = f64::from(attempt % DIRECTIONS) * FRAC_PI_4;
    let radius = step * f64::from(1 + attempt / DIRECTIONS);
    origin.polar_offset(angle, radius)
}

/// Find a position near `desired` clear of every node
///
/// Evaluates at most `config.max_attempts` spiral candidates. When all of
/// them overlap, returns the point one step further out along the last
/// candidate's direction and flags it as [`PlacementKind::Fallback`].
#[must_use]
pub fn find_non_overlapping_position(
    desired: Point,
    size: Size,
    nodes: &[CanvasNode],
    config: &LayoutConfig,
) -> Placement {
    if !overlaps_any(desired, size, nodes, config) {
        return Placement {
            position: desired,
            attempts: 0,
            kind: PlacementKind::Desired,
        };
    }

    for attempt in 0..config.max_attempts {
        let candidate = spiral_candidate(desired, attempt, config.spiral_step);
        if !overlaps_any(candidate, size, nodes, config) {
            tracing::debug!(attempt, x = candidate.x, y = candidate.y, "spiral found free position");
            return Placement {
                position: candidate,
                attempts: attempt + 1,
                kind: PlacementKind::Spiral,
            };
        }
    }

    let last = config.max_attempts.saturating_sub(1);
    let angle = f64::from(last % DIRECTIONS) * FRAC_PI_4;
    let radius = config.spiral_step * f64::from(1 + last / DIRECTIONS) + config.spiral_step;
    let position = desired.polar_offset(angle, radius);
    tracing::debug!(
        attempts = config.max_attempts,
        x = position.x,
        y = position.y,
        "spiral budget exhausted, using fallback"
    );
    Placement {
        position,
        attempts: config.max_attempts,
        kind: PlacementKind::Fallback,
    }
}
