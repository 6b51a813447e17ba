//! Persistence collaborator boundary
//!
//! The tree engine never talks to a backend itself. [`CaseStore`] is the
//! seam the editor calls before committing any in-memory change; a REST
//! client, a test double or the in-memory store from the test utilities
//! all plug in here.

use assure_model::{Element, ElementId, ElementInfo, ElementKey, ElementKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Bearer token passed through to the collaborator
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Creation payload for a new element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewElement {
    pub kind: ElementKind,
    #[serde(flatten)]
    pub info: ElementInfo,
    /// Parent the element is created under
    #[serde(default)]
    pub parent: Option<ElementKey>,
    /// Evidence URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NewElement {
    /// Payload for `kind` named `name`
    #[must_use]
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            info: ElementInfo::named(name),
            parent: None,
            url: None,
        }
    }

    /// Set the parent, returning self
    #[must_use]
    pub fn under(mut self, parent: ElementKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the short description, returning self
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.info.short_description = description.into();
        self
    }

    /// Set the evidence URL, returning self
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Failures reported by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Collaborator reported an error; message is surfaced verbatim
    #[error("{message}")]
    Remote { message: String },

    /// Create succeeded at the transport level but returned no element
    #[error("collaborator returned no data")]
    NoData,

    /// Create returned an element of a different kind than requested
    #[error("collaborator created {created} when asked for a {expected}")]
    UnexpectedKind { expected: ElementKind, created: ElementKey },

    /// Update or delete answered `false`
    #[error("collaborator rejected {operation} of {key}")]
    Rejected { operation: StoreOp, key: ElementKey },

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// Check if retrying the same call could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Collaborator operation, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOp::Create => "create",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
        })
    }
}

/// Persistence collaborator
///
/// Mirrors a REST backend: `create` answers with the stored element (or
/// nothing), `update` and `delete` answer with a success flag. Transport
/// and server errors come back as [`StoreError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CaseStore: Send + Sync {
    /// Create an element and return it with its server-assigned id
    async fn create(
        &self,
        kind: ElementKind,
        payload: &NewElement,
        token: &AuthToken,
    ) -> Result<Option<Element>, StoreError>;

    /// Apply a JSON patch to an element
    async fn update(
        &self,
        kind: ElementKind,
        id: ElementId,
        token: &AuthToken,
        patch: &serde_json::Value,
    ) -> Result<bool, StoreError>;

    /// Delete an element
    async fn delete(
        &self,
        kind: ElementKind,
        id: ElementId,
        token: &AuthToken,
    ) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
impl<T: CaseStore + ?Sized> CaseStore for Arc<T> {
    async fn create(
        &self,
        kind: ElementKind,
        payload: &NewElement,
        token: &AuthToken,
    ) -> Result<Option<Element>, StoreError> {
        (**self).create(kind, payload, token).await
    }

    async fn update(
        &self,
        kind: ElementKind,
        id: ElementId,
        token: &AuthToken,
        patch: &serde_json::Value,
    ) -> Result<bool, StoreError> {
        (**self).update(kind, id, token, patch).await
    }

    async fn delete(
        &self,
        kind: ElementKind,
        id: ElementId,
        token: &AuthToken,
    ) -> Result<bool, StoreError> {
        (**self).delete(kind, id, token).await
    }
}
