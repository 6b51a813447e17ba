//! Node-creation request validation

use crate::config::LayoutConfig;
use crate::direction::Direction;
use crate::error::{Axis, ValidationError};
use crate::geometry::Point;
use assure_model::ElementKind;
use serde::{Deserialize, Serialize};

/// A raw request to place a new node, as received from the canvas
///
/// `position` is kept as loose JSON so malformed input reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub node_type: String,
    #[serde(default)]
    pub position: Option<serde_json::Value>,
    /// Nodes the new node is created from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub direction: Direction,
}

impl PlacementRequest {
    /// Request for `node_type` at screen position `(x, y)`
    #[must_use]
    pub fn new(node_type: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            node_type: node_type.into(),
            position: Some(serde_json::json!({ "x": x, "y": y })),
            sources: Vec::new(),
            direction: Direction::default(),
        }
    }

    /// Place relative to `sources` in `direction`
    #[must_use]
    pub fn from_sources<I, S>(mut self, sources: I, direction: Direction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self.direction = direction;
        self
    }
}

/// A request that passed validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRequest {
    pub kind: ElementKind,
    /// Screen position
    pub position: Point,
}

/// Check type and position of `request`
///
/// # Errors
///
/// Returns the first problem found; nothing is clamped.
pub fn validate_request(
    request: &PlacementRequest,
    config: &LayoutConfig,
) -> Result<ValidRequest, ValidationError> {
    let kind: ElementKind = request
        .node_type
        .parse()
        .map_err(|_| ValidationError::UnknownNodeType(request.node_type.clone()))?;
    let position = request
        .position
        .as_ref()
        .filter(|value| !value.is_null())
        .ok_or(ValidationError::MissingPosition)?;
    let x = coordinate(position, Axis::X, config)?;
    let y = coordinate(position, Axis::Y, config)?;
    Ok(ValidRequest {
        kind,
        position: Point::new(x, y),
    })
}

fn coordinate(
    position: &serde_json::Value,
    axis: Axis,
    config: &LayoutConfig,
) -> Result<f64, ValidationError> {
    let field = match axis {
        Axis::X => "x",
        Axis::Y => "y",
    };
    let value = position
        .get(field)
        .and_then(serde_json::Value::as_f64)
        .ok_or(ValidationError::NonNumeric { axis })?;
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { axis });
    }
    if value.abs() > config.coordinate_limit {
        return Err(ValidationError::OutOfBounds {
            axis,
            value,
            limit: config.coordinate_limit,
        });
    }
    Ok(value)
}
