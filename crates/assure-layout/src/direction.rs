//! Placement relative to source nodes

use crate::config::LayoutConfig;
use crate::geometry::{CanvasNode, Point, Size};
use crate::placement::overlaps_any;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a new node goes relative to its sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bottom,
    Right,
    /// Bottom unless that overlaps and right does not
    #[default]
    Auto,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Bottom => "bottom",
            Direction::Right => "right",
            Direction::Auto => "auto",
        })
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom" => Ok(Direction::Bottom),
            "right" => Ok(Direction::Right),
            "auto" => Ok(Direction::Auto),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Propose a position `spacing` away from the centroid of `sources`
///
/// Returns `None` when there are no sources. The proposal may still
/// overlap; the spiral search resolves that.
#[must_use]
pub fn smart_position(
    sources: &[Point],
    direction: Direction,
    size: Size,
    nodes: &[CanvasNode],
    config: &LayoutConfig,
) -> Option<Point> {
    let centroid = Point::centroid(sources)?;
    let below = Point::new(centroid.x, centroid.y + config.spacing);
    let beside = Point::new(centroid.x + config.spacing, centroid.y);

    let position = match direction {
        Direction::Bottom => below,
        Direction::Right => beside,
        Direction::Auto => {
            if !overlaps_any(below, size, nodes, config) {
                below
            } else if !overlaps_any(beside, size, nodes, config) {
                beside
            } else {
                below
            }
        }
    };
    tracing::debug!(%direction, x = position.x, y = position.y, "directional proposal");
    Some(position)
}
