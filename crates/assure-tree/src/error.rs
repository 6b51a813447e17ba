//! Error types for the tree engine
//!
//! Provides error handling for:
//! - Target lookups that fail during attach/move (not-found)
//! - Structurally illegal requests (validation)
//! - Collaborator failures surfaced through the editor (remote)

use assure_model::{ElementKey, ElementKind, Permission};

use crate::store::StoreError;

/// Coarse classification shared by every error in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A referenced element could not be located
    NotFound,
    /// The request is malformed or structurally illegal
    Validation,
    /// The persistence collaborator failed or returned nothing
    Remote,
}

/// Errors from pure tree operations
///
/// Every variant is reported with the input snapshot left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Element is neither in the tree nor in the orphan set
    #[error("element {key} not found")]
    NotFound { key: ElementKey },

    /// Attach/move target could not be located
    #[error("parent {parent} not found while placing {child}")]
    ParentNotFound { child: ElementKey, parent: ElementKey },

    /// No attachment rule for this child/parent pair
    #[error("a {child} cannot be attached under a {parent}")]
    InvalidParent { child: ElementKind, parent: ElementKind },

    /// Element (or part of its subtree) is already in the tree
    #[error("element {key} is already attached")]
    AlreadyAttached { key: ElementKey },

    /// Nested key of the element is held by a different orphan
    #[error("element {key} is already held in the orphan set")]
    Conflict { key: ElementKey },

    /// Detach requested for an element that is not in the tree
    #[error("element {key} is not attached")]
    NotAttached { key: ElementKey },

    /// Goals are tree roots and cannot be detached or moved
    #[error("goal {key} is a tree root")]
    RootElement { key: ElementKey },

    /// Goals are deleted only under an explicit cascade
    #[error("goal {key} can only be deleted with a cascading policy")]
    RootDeletion { key: ElementKey },

    /// Move target lies inside the moved subtree
    #[error("cannot move {key} under its own descendant {target}")]
    CycleDetected { key: ElementKey, target: ElementKey },

    /// Attribute patch does not apply to this element
    #[error("invalid patch for {key}: {reason}")]
    InvalidPatch { key: ElementKey, reason: String },
}

impl TreeError {
    /// Classification of this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::ParentNotFound { .. } => ErrorCategory::NotFound,
            _ => ErrorCategory::Validation,
        }
    }

    /// Check if error is a lookup failure
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Tree errors are deterministic; retrying never helps
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Errors from the async editor
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Current user may not edit this case
    #[error("case is read-only at permission level {0:?}")]
    ReadOnly(Permission),

    /// Request rejected before reaching the collaborator
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Tree operation failed
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Persistence collaborator failed
    #[error("remote failure: {0}")]
    Remote(#[from] StoreError),
}

impl EditorError {
    /// Classification of this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ReadOnly(_) | Self::InvalidRequest(_) => ErrorCategory::Validation,
            Self::Tree(e) => e.category(),
            Self::Remote(_) => ErrorCategory::Remote,
        }
    }

    /// Check if retrying the same call could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_error_display() {
        let err = TreeError::ParentNotFound {
            child: ElementKey::claim(1),
            parent: ElementKey::strategy(9),
        };
        assert_eq!(
            err.to_string(),
            "parent strategy:9 not found while placing property_claim:1"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn tree_error_categories() {
        let invalid = TreeError::InvalidParent {
            child: ElementKind::Evidence,
            parent: ElementKind::Strategy,
        };
        assert_eq!(invalid.category(), ErrorCategory::Validation);
        assert_eq!(
            TreeError::NotFound { key: ElementKey::goal(1) }.category(),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn editor_error_retryable() {
        let transport = EditorError::from(StoreError::Transport("reset".into()));
        assert!(transport.is_retryable());
        assert_eq!(transport.category(), ErrorCategory::Remote);

        let remote = EditorError::from(StoreError::Remote {
            message: "forbidden".into(),
        });
        assert!(!remote.is_retryable());
        assert!(remote.to_string().contains("forbidden"));

        assert!(!EditorError::ReadOnly(Permission::View).is_retryable());
    }
}
