//! Placement engine configuration
//!
//! Every field has a default; a TOML file only needs the keys it changes:
//!
//! ```toml
//! [layout]
//! grid_size = 25.0
//!
//! [placement]
//! magnetic_guides = false
//! ```

use crate::error::ConfigError;
use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_grid_size() -> f64 {
    20.0
}

fn default_node_width() -> f64 {
    300.0
}

fn default_node_height() -> f64 {
    150.0
}

fn default_padding() -> f64 {
    20.0
}

fn default_spiral_step() -> f64 {
    50.0
}

fn default_max_attempts() -> u32 {
    20
}

fn default_snap_threshold() -> f64 {
    10.0
}

fn default_spacing() -> f64 {
    200.0
}

fn default_max_hint_distance() -> f64 {
    300.0
}

fn default_max_hints() -> usize {
    5
}

fn default_coordinate_limit() -> f64 {
    10_000.0
}

fn default_true() -> bool {
    true
}

/// Geometry constants of the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Grid cell size for snapping
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,

    /// Default node width
    #[serde(default = "default_node_width")]
    pub node_width: f64,

    /// Default node height
    #[serde(default = "default_node_height")]
    pub node_height: f64,

    /// Clearance kept between nodes
    #[serde(default = "default_padding")]
    pub padding: f64,

    /// Radius increment per spiral revolution
    #[serde(default = "default_spiral_step")]
    pub spiral_step: f64,

    /// Spiral candidates evaluated before falling back
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Centre distance under which guides engage
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,

    /// Offset from the source centroid in directional placement
    #[serde(default = "default_spacing")]
    pub spacing: f64,

    /// Farthest node offered as a connection hint
    #[serde(default = "default_max_hint_distance")]
    pub max_hint_distance: f64,

    /// Hints returned at most
    #[serde(default = "default_max_hints")]
    pub max_hints: usize,

    /// Largest accepted absolute coordinate
    #[serde(default = "default_coordinate_limit")]
    pub coordinate_limit: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            node_width: default_node_width(),
            node_height: default_node_height(),
            padding: default_padding(),
            spiral_step: default_spiral_step(),
            max_attempts: default_max_attempts(),
            snap_threshold: default_snap_threshold(),
            spacing: default_spacing(),
            max_hint_distance: default_max_hint_distance(),
            max_hints: default_max_hints(),
            coordinate_limit: default_coordinate_limit(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set grid cell size
    #[inline]
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set default node size
    #[inline]
    #[must_use]
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }

    /// Set clearance between nodes
    #[inline]
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set spiral radius step
    #[inline]
    #[must_use]
    pub fn with_spiral_step(mut self, step: f64) -> Self {
        self.spiral_step = step;
        self
    }

    /// Set spiral attempt budget
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set guide threshold
    #[inline]
    #[must_use]
    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold;
        self
    }

    /// Set directional spacing
    #[inline]
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set hint distance and count limits
    #[inline]
    #[must_use]
    pub fn with_hint_limits(mut self, max_distance: f64, max_hints: usize) -> Self {
        self.max_hint_distance = max_distance;
        self.max_hints = max_hints;
        self
    }

    /// Set coordinate limit
    #[inline]
    #[must_use]
    pub fn with_coordinate_limit(mut self, limit: f64) -> Self {
        self.coordinate_limit = limit;
        self
    }

    /// Default node size
    #[inline]
    #[must_use]
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    /// Check every value is in range
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid_size", self.grid_size),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("spiral_step", self.spiral_step),
            ("spacing", self.spacing),
            ("coordinate_limit", self.coordinate_limit),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("padding", self.padding),
            ("snap_threshold", self.snap_threshold),
            ("max_hint_distance", self.max_hint_distance),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("must not be negative, got {value}")));
            }
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// Optional pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOptions {
    /// Snap the desired position to the grid before searching
    #[serde(default = "default_true")]
    pub snap_to_grid: bool,

    /// Align with nearby node centres after searching
    #[serde(default = "default_true")]
    pub magnetic_guides: bool,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            magnetic_guides: true,
        }
    }
}

/// Full engine configuration, as loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub placement: PlacementOptions,
}

impl EngineConfig {
    /// Parse and validate TOML text
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_canvas_constants() {
        let config = LayoutConfig::new();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.node_size(), Size::new(300.0, 150.0));
        assert_eq!(config.padding, 20.0);
        assert_eq!(config.spiral_step, 50.0);
        assert_eq!(config.max_attempts, 20);
        assert_eq!(config.snap_threshold, 10.0);
        assert_eq!(config.spacing, 200.0);
        assert_eq!(config.max_hint_distance, 300.0);
        assert_eq!(config.max_hints, 5);
        assert_eq!(config.coordinate_limit, 10_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            "[layout]\ngrid_size = 25.0\n\n[placement]\nmagnetic_guides = false\n",
        )
        .unwrap();
        assert_eq!(config.layout.grid_size, 25.0);
        assert_eq!(config.layout.node_width, 300.0);
        assert!(config.placement.snap_to_grid);
        assert!(!config.placement.magnetic_guides);

        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = EngineConfig::from_toml_str("[layout]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_attempts", .. }));

        let err = LayoutConfig::new().with_grid_size(-1.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grid_size", .. }));

        let err = LayoutConfig::new().with_padding(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "padding", .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.toml");
        std::fs::write(&path, "[layout]\nspacing = 120.0\n").unwrap();
        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.layout.spacing, 120.0);

        let missing = EngineConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(missing.is_retryable());
    }
}
