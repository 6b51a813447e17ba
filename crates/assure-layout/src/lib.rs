//! Node placement for assurance-case canvases
//!
//! Turns a pointer position into a concrete, non-overlapping and
//! optionally aligned position for a new node, and ranks nearby nodes as
//! connection suggestions. Pure geometry: no dependency on the tree engine.
//!
//! # Overview
//!
//! - [`snap_to_grid`]: round to the grid
//! - [`find_non_overlapping_position`]: bounded 8-direction spiral search
//! - [`apply_magnetic_guides`]: centre alignment with nearby nodes
//! - [`smart_position`]: offset from source nodes in a [`Direction`]
//! - [`calculate_connection_hints`]: nearest nodes, capped
//! - [`PlacementEngine`]: all of the above behind request validation
//!
//! # Example
//!
//! ```rust
//! use assure_layout::{CanvasNode, Identity, PlacementEngine, PlacementKind, PlacementRequest, Point};
//!
//! let engine = PlacementEngine::default();
//! let nodes = vec![CanvasNode::new("goal:1", Point::new(100.0, 100.0))];
//!
//! let result = engine
//!     .place(&PlacementRequest::new("strategy", 100.0, 400.0), &nodes, &Identity)
//!     .unwrap();
//! assert_eq!(result.placement, PlacementKind::Desired);
//! assert_eq!(result.hints[0].node_id, "goal:1");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod guides;
pub mod hints;
pub mod placement;
pub mod snap;
pub mod transform;
pub mod validation;

// Re-exports
pub use config::{EngineConfig, LayoutConfig, PlacementOptions};
pub use direction::{smart_position, Direction};
pub use engine::{PlacementEngine, PlacementResult};
pub use error::{Axis, ConfigError, ValidationError};
pub use geometry::{CanvasNode, Point, Rect, Size};
pub use guides::{apply_magnetic_guides, Guide, GuideSnap};
pub use hints::{calculate_connection_hints, ConnectionHint, HintDirection};
pub use placement::{
    find_non_overlapping_position, overlaps_any, spiral_candidate, Placement, PlacementKind,
};
pub use snap::{snap_to_grid, snap_value};
pub use transform::{CanvasTransform, Identity, Viewport};
pub use validation::{validate_request, PlacementRequest, ValidRequest};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CanvasNode, CanvasTransform, Direction, EngineConfig, LayoutConfig, PlacementEngine,
        PlacementRequest, PlacementResult, Point, Size, ValidationError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
