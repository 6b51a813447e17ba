//! Placement pipeline
//!
//! validate → screen-to-world → directional proposal → grid snap →
//! spiral search → magnetic guides → connection hints

use crate::config::{EngineConfig, LayoutConfig, PlacementOptions};
use crate::direction::smart_position;
use crate::error::{Axis, ValidationError};
use crate::geometry::{CanvasNode, Point};
use crate::guides::{apply_magnetic_guides, Guide};
use crate::hints::{calculate_connection_hints, ConnectionHint};
use crate::placement::{find_non_overlapping_position, overlaps_any, PlacementKind};
use crate::snap::snap_to_grid;
use crate::transform::CanvasTransform;
use crate::validation::{validate_request, PlacementRequest};
use assure_model::ElementKind;
use serde::Serialize;

/// Final placement of a new node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementResult {
    pub kind: ElementKind,
    /// Top-left corner in world coordinates
    pub position: Point,
    pub placement: PlacementKind,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guides: Vec<Guide>,
    pub hints: Vec<ConnectionHint>,
}

/// Resolves node-creation requests against a node set
#[derive(Debug, Clone, Default)]
pub struct PlacementEngine {
    config: EngineConfig,
}

impl PlacementEngine {
    /// Create an engine
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine with default options over `layout`
    #[must_use]
    pub fn with_layout(layout: LayoutConfig) -> Self {
        Self::new(EngineConfig {
            layout,
            placement: PlacementOptions::default(),
        })
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Place a new node
    ///
    /// Never fails once the request is valid: an exhausted search yields a
    /// [`PlacementKind::Fallback`] position.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for malformed requests, unknown source
    /// nodes, or a transform that maps the request off the finite plane
    /// (for instance a zero zoom).
    pub fn place<T>(
        &self,
        request: &PlacementRequest,
        nodes: &[CanvasNode],
        transform: &T,
    ) -> Result<PlacementResult, ValidationError>
    where
        T: CanvasTransform + ?Sized,
    {
        let layout = &self.config.layout;
        let options = self.config.placement;
        let valid = validate_request(request, layout)?;
        let size = layout.node_size();

        let mut desired = finite_world(transform.screen_to_world(valid.position))?;
        if !request.sources.is_empty() {
            let sources = request
                .sources
                .iter()
                .map(|id| {
                    nodes
                        .iter()
                        .find(|node| &node.id == id)
                        .map(|node| node.position)
                        .ok_or_else(|| ValidationError::UnknownSource(id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(proposal) = smart_position(&sources, request.direction, size, nodes, layout) {
                desired = proposal;
            }
        }
        if options.snap_to_grid {
            desired = snap_to_grid(desired, layout.grid_size);
        }

        let found = find_non_overlapping_position(desired, size, nodes, layout);
        let mut position = found.position;
        let mut guides = Vec::new();
        if options.magnetic_guides {
            let snap = apply_magnetic_guides(position, size, nodes, layout);
            if snap.is_snapped() && !overlaps_any(snap.position, size, nodes, layout) {
                position = snap.position;
                guides.extend(snap.horizontal);
                guides.extend(snap.vertical);
            }
        }

        let hints = calculate_connection_hints(position, nodes, layout);
        tracing::debug!(
            kind = %valid.kind,
            x = position.x,
            y = position.y,
            placement = ?found.kind,
            hints = hints.len(),
            "node placed"
        );
        Ok(PlacementResult {
            kind: valid.kind,
            position,
            placement: found.kind,
            attempts: found.attempts,
            guides,
            hints,
        })
    }
}

fn finite_world(point: Point) -> Result<Point, ValidationError> {
    if !point.x.is_finite() {
        tracing::warn!(x = point.x, "transform produced a non-finite world position");
        return Err(ValidationError::NonFinite { axis: Axis::X });
    }
    if !point.y.is_finite() {
        tracing::warn!(y = point.y, "transform produced a non-finite world position");
        return Err(ValidationError::NonFinite { axis: Axis::Y });
    }
    Ok(point)
}
