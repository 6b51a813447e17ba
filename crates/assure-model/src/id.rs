//! Element identity
//!
//! Provides [`ElementId`] (server-assigned), [`ElementKind`], the composite
//! [`ElementKey`] used to address elements across the tree and the orphan
//! set, and [`PreviewId`] for locally created nodes awaiting confirmation.

use crate::error::ModelError;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Server-assigned element identifier
///
/// Ids are unique per element kind, not across kinds: a goal and a strategy
/// may share the same numeric id. Use [`ElementKey`] when both matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Create from raw value
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ElementId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Kind of assurance-case element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Top-level claim; root of the argument tree
    Goal,
    /// Annotation attached to a goal
    Context,
    /// Argument decomposition step under a goal
    Strategy,
    /// Claim about a system property
    PropertyClaim,
    /// Supporting artefact referenced by claims
    Evidence,
}

impl ElementKind {
    /// Every kind, in tree order
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Goal,
        ElementKind::Context,
        ElementKind::Strategy,
        ElementKind::PropertyClaim,
        ElementKind::Evidence,
    ];

    /// Kinds that can be detached and tracked as orphans
    pub const DETACHABLE: [ElementKind; 4] = [
        ElementKind::Context,
        ElementKind::Strategy,
        ElementKind::PropertyClaim,
        ElementKind::Evidence,
    ];

    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::Goal => "goal",
            ElementKind::Context => "context",
            ElementKind::Strategy => "strategy",
            ElementKind::PropertyClaim => "property_claim",
            ElementKind::Evidence => "evidence",
        }
    }

    /// Collection name used by the REST backend
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            ElementKind::Goal => "goals",
            ElementKind::Context => "contexts",
            ElementKind::Strategy => "strategies",
            ElementKind::PropertyClaim => "propertyclaims",
            ElementKind::Evidence => "evidence",
        }
    }

    /// Letter used for generated display names (`G1`, `S2`, ...)
    #[must_use]
    pub const fn name_prefix(self) -> char {
        match self {
            ElementKind::Goal => 'G',
            ElementKind::Context => 'C',
            ElementKind::Strategy => 'S',
            ElementKind::PropertyClaim => 'P',
            ElementKind::Evidence => 'E',
        }
    }

    /// Whether elements of this kind can be detached into the orphan set
    #[inline]
    #[must_use]
    pub fn is_detachable(self) -> bool {
        self != ElementKind::Goal
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goal" => Ok(ElementKind::Goal),
            "context" => Ok(ElementKind::Context),
            "strategy" => Ok(ElementKind::Strategy),
            "property_claim" | "propertyclaim" | "property" => Ok(ElementKind::PropertyClaim),
            "evidence" => Ok(ElementKind::Evidence),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

/// Composite key `(kind, id)` addressing one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementKey {
    /// Element kind
    pub kind: ElementKind,
    /// Server id within that kind
    pub id: ElementId,
}

impl ElementKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub const fn new(kind: ElementKind, id: ElementId) -> Self {
        Self { kind, id }
    }

    /// Key for a goal
    #[inline]
    #[must_use]
    pub const fn goal(id: u64) -> Self {
        Self::new(ElementKind::Goal, ElementId(id))
    }

    /// Goal key from a typed id, as stored in parent references
    #[inline]
    #[must_use]
    pub const fn goal_from(id: ElementId) -> Self {
        Self::new(ElementKind::Goal, id)
    }

    /// Key for a context
    #[inline]
    #[must_use]
    pub const fn context(id: u64) -> Self {
        Self::new(ElementKind::Context, ElementId(id))
    }

    /// Key for a strategy
    #[inline]
    #[must_use]
    pub const fn strategy(id: u64) -> Self {
        Self::new(ElementKind::Strategy, ElementId(id))
    }

    /// Key for a property claim
    #[inline]
    #[must_use]
    pub const fn claim(id: u64) -> Self {
        Self::new(ElementKind::PropertyClaim, ElementId(id))
    }

    /// Key for an evidence item
    #[inline]
    #[must_use]
    pub const fn evidence(id: u64) -> Self {
        Self::new(ElementKind::Evidence, ElementId(id))
    }
}

impl Display for ElementKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for ElementKey {
    type Err = ModelError;

    /// Parses `kind:id`, e.g. `strategy:12`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ModelError::InvalidKey(s.to_string()))?;
        let kind = kind.parse()?;
        let id = id
            .trim()
            .parse::<u64>()
            .map_err(|_| ModelError::InvalidKey(s.to_string()))?;
        Ok(Self::new(kind, ElementId(id)))
    }
}

const PREVIEW_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const PREVIEW_SUFFIX_LEN: usize = 5;

/// Client-side id for a node that has not been confirmed by the server
///
/// Format: `{kind}-{timestamp_ms}-{5 base36 chars}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewId(String);

impl PreviewId {
    /// Generate a fresh preview id for `kind` using the wall clock and thread RNG
    #[must_use]
    pub fn generate(kind: ElementKind) -> Self {
        Self::generate_with(kind, Utc::now().timestamp_millis(), &mut rand::rng())
    }

    /// Generate with an explicit timestamp and random source
    #[must_use]
    pub fn generate_with<R: Rng + ?Sized>(kind: ElementKind, timestamp_ms: i64, rng: &mut R) -> Self {
        let suffix: String = (0..PREVIEW_SUFFIX_LEN)
            .map(|_| char::from(PREVIEW_ALPHABET[rng.random_range(0..PREVIEW_ALPHABET.len())]))
            .collect();
        Self(format!("{}-{}-{}", kind.as_str(), timestamp_ms, suffix))
    }

    /// Parse and validate an existing preview id
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidPreviewId`] if the string does not follow
    /// the `{kind}-{timestamp}-{suffix}` format.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidPreviewId(raw.to_string());
        let mut parts = raw.rsplitn(3, '-');
        let suffix = parts.next().ok_or_else(invalid)?;
        let timestamp = parts.next().ok_or_else(invalid)?;
        let kind = parts.next().ok_or_else(invalid)?;

        kind.parse::<ElementKind>().map_err(|_| invalid())?;
        timestamp.parse::<i64>().map_err(|_| invalid())?;
        let suffix_ok = suffix.len() == PREVIEW_SUFFIX_LEN
            && suffix.bytes().all(|b| PREVIEW_ALPHABET.contains(&b));
        if !suffix_ok {
            return Err(invalid());
        }
        Ok(Self(raw.to_string()))
    }

    /// Kind encoded in the id
    #[must_use]
    pub fn kind(&self) -> Option<ElementKind> {
        self.0.rsplitn(3, '-').nth(2)?.parse().ok()
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PreviewId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
