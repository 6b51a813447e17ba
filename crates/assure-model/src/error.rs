//! Error types for the case model

/// Errors raised while parsing or constructing model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Element type name not in the known set
    #[error("unknown element type: '{0}'")]
    UnknownKind(String),

    /// Malformed `kind:id` key
    #[error("invalid element key: '{0}' (expected kind:id)")]
    InvalidKey(String),

    /// Malformed preview id
    #[error("invalid preview id: '{0}'")]
    InvalidPreviewId(String),
}
