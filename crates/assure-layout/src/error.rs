//! Error types for the placement engine

use std::path::PathBuf;

/// Coordinate axis named in validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
        })
    }
}

/// A node-creation request was rejected
///
/// Requests are never clamped into range; any of these leaves the canvas
/// as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Node type outside the known set
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    /// No position supplied
    #[error("position is missing")]
    MissingPosition,

    /// Position is not an object with numeric `x` and `y`
    #[error("position {axis} is missing or not a number")]
    NonNumeric { axis: Axis },

    /// NaN or infinite coordinate
    #[error("position {axis} is not finite")]
    NonFinite { axis: Axis },

    /// Coordinate beyond the configured limit
    #[error("position {axis} = {value} exceeds the limit of ±{limit}")]
    OutOfBounds { axis: Axis, value: f64, limit: f64 },

    /// Source node named for directional placement is not on the canvas
    #[error("source node '{0}' is not on the canvas")]
    UnknownSource(String),
}

impl ValidationError {
    /// Validation failures are deterministic; retrying never helps
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Configuration could not be loaded or is out of range
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Only I/O failures can succeed on retry
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
