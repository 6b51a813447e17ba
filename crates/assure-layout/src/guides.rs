//! Magnetic alignment guides

use crate::config::LayoutConfig;
use crate::geometry::{CanvasNode, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// A guide line the candidate was snapped to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "orientation", rename_all = "snake_case")]
pub enum Guide {
    /// Horizontal line at `y`, aligning centres vertically
    Horizontal { y: f64, node: usize },
    /// Vertical line at `x`, aligning centres horizontally
    Vertical { x: f64, node: usize },
}

/// Candidate after guide snapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideSnap {
    /// Top-left corner after snapping
    pub position: Point,
    pub horizontal: Option<Guide>,
    pub vertical: Option<Guide>,
}

impl GuideSnap {
    /// Check if any guide engaged
    #[inline]
    #[must_use]
    pub fn is_snapped(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }
}

/// Snap a candidate's centre onto nearby node centres
///
/// Every node is compared against the candidate's unsnapped centre. A
/// centre-y within `snap_threshold` sets the horizontal guide, a centre-x
/// within it the vertical one; later nodes overwrite earlier matches.
#[must_use]
pub fn apply_magnetic_guides(
    position: Point,
    size: Size,
    nodes: &[CanvasNode],
    config: &LayoutConfig,
) -> GuideSnap {
    let center = Rect::at(position, size).center();
    let default_size = config.node_size();
    let mut horizontal = None;
    let mut vertical = None;

    for (index, node) in nodes.iter().enumerate() {
        let other = node.bounds(default_size).center();
        if (center.y - other.y).abs() < config.snap_threshold {
            horizontal = Some(Guide::Horizontal { y: other.y, node: index });
        }
        if (center.x - other.x).abs() < config.snap_threshold {
            vertical = Some(Guide::Vertical { x: other.x, node: index });
        }
    }

    let mut snapped = position;
    if let Some(Guide::Horizontal { y, .. }) = horizontal {
        snapped.y = y - size.height / 2.0;
    }
    if let Some(Guide::Vertical { x, .. }) = vertical {
        snapped.x = x - size.width / 2.0;
    }
    GuideSnap {
        position: snapped,
        horizontal,
        vertical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aligns_centre_within_threshold() {
        let config = LayoutConfig::new();
        let nodes = vec![CanvasNode::new("n1", Point::new(0.0, 100.0))];
        let snap = apply_magnetic_guides(Point::new(500.0, 106.0), config.node_size(), &nodes, &config);
        assert_eq!(snap.position, Point::new(500.0, 100.0));
        assert_eq!(snap.horizontal, Some(Guide::Horizontal { y: 175.0, node: 0 }));
        assert_eq!(snap.vertical, None);
    }

    #[test]
    fn threshold_is_exclusive() {
        let config = LayoutConfig::new();
        let nodes = vec![CanvasNode::new("n1", Point::new(0.0, 100.0))];
        let snap = apply_magnetic_guides(Point::new(500.0, 110.0), config.node_size(), &nodes, &config);
        assert!(!snap.is_snapped());
        assert_eq!(snap.position, Point::new(500.0, 110.0));
    }

    #[test]
    fn last_match_wins() {
        let config = LayoutConfig::new();
        let nodes = vec![
            CanvasNode::new("n1", Point::new(0.0, 95.0)),
            CanvasNode::new("n2", Point::new(800.0, 104.0)),
        ];
        let snap = apply_magnetic_guides(Point::new(400.0, 100.0), config.node_size(), &nodes, &config);
        assert_eq!(snap.horizontal, Some(Guide::Horizontal { y: 179.0, node: 1 }));
        assert_eq!(snap.position.y, 104.0);
    }

    #[test]
    fn both_axes_snap_independently() {
        let config = LayoutConfig::new();
        let nodes = vec![
            CanvasNode::new("n1", Point::new(0.0, 500.0)),
            CanvasNode::new("n2", Point::new(900.0, 0.0)),
        ];
        let snap = apply_magnetic_guides(Point::new(5.0, 3.0), config.node_size(), &nodes, &config);
        assert_eq!(snap.position, Point::new(0.0, 0.0));
        assert!(matches!(snap.vertical, Some(Guide::Vertical { node: 0, .. })));
        assert!(matches!(snap.horizontal, Some(Guide::Horizontal { node: 1, .. })));
    }
}
