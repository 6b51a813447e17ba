//! Connection hints: nearby nodes a new node could link to

use crate::config::LayoutConfig;
use crate::geometry::{CanvasNode, Point};
use serde::{Deserialize, Serialize};

/// Dominant axis from the candidate to a hinted node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintDirection {
    Horizontal,
    Vertical,
}

/// A nearby node, ranked by distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionHint {
    pub node_id: String,
    pub distance: f64,
    pub direction: HintDirection,
}

/// Nodes within `max_hint_distance` of `position`, nearest first
///
/// Ties in `|dx|` and `|dy|` classify as horizontal. Equal distances keep
/// node order. At most `max_hints` entries are returned.
#[must_use]
pub fn calculate_connection_hints(
    position: Point,
    nodes: &[CanvasNode],
    config: &LayoutConfig,
) -> Vec<ConnectionHint> {
    let mut hints: Vec<_> = nodes
        .iter()
        .filter_map(|node| {
            let dx = node.position.x - position.x;
            let dy = node.position.y - position.y;
            let distance = dx.hypot(dy);
            if distance.is_nan() || distance > config.max_hint_distance {
                return None;
            }
            let direction = if dy.abs() > dx.abs() {
                HintDirection::Vertical
            } else {
                HintDirection::Horizontal
            };
            Some(ConnectionHint {
                node_id: node.id.clone(),
                distance,
                direction,
            })
        })
        .collect();
    hints.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hints.truncate(config.max_hints);
    hints
}
