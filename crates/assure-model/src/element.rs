//! Assurance-case elements
//!
//! The tree is stored as nested data: a [`Goal`] owns its contexts,
//! strategies and claims; a [`Strategy`] owns claims; a [`PropertyClaim`]
//! owns nested claims and evidence. There are no back-pointers. Parent
//! references are kept as foreign keys on the child so the backend can be
//! told where an element lives.

use crate::id::{ElementId, ElementKey, ElementKind};
use serde::{Deserialize, Serialize};

/// Descriptive attributes shared by every element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Display name (`G1`, `P2`, ...)
    pub name: String,
    /// One-line description
    #[serde(default)]
    pub short_description: String,
    /// Full description
    #[serde(default)]
    pub long_description: String,
}

impl ElementInfo {
    /// Info with just a name
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the short description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = description.into();
        self
    }
}

/// Root claim of an argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: ElementId,
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub context: Vec<Context>,
    #[serde(default)]
    pub strategies: Vec<Strategy>,
    #[serde(default)]
    pub property_claims: Vec<PropertyClaim>,
}

impl Goal {
    /// Create an empty goal
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            info: ElementInfo::named(name),
            context: Vec::new(),
            strategies: Vec::new(),
            property_claims: Vec::new(),
        }
    }

    /// Key of this goal
    #[inline]
    #[must_use]
    pub fn key(&self) -> ElementKey {
        ElementKey::new(ElementKind::Goal, self.id)
    }

    /// This goal's key followed by every key below it
    #[must_use]
    pub fn subtree_keys(&self) -> Vec<ElementKey> {
        let mut out = vec![self.key()];
        out.extend(self.context.iter().map(Context::key));
        for strategy in &self.strategies {
            out.extend(strategy.subtree_keys());
        }
        for claim in &self.property_claims {
            claim.collect_keys(&mut out);
        }
        out
    }

    /// Strategy directly under this goal
    #[must_use]
    pub fn strategy_mut(&mut self, id: ElementId) -> Option<&mut Strategy> {
        self.strategies.iter_mut().find(|s| s.id == id)
    }

    /// Depth-first search for a claim anywhere below this goal
    #[must_use]
    pub fn find_claim(&self, id: ElementId) -> Option<&PropertyClaim> {
        self.property_claims
            .iter()
            .chain(self.strategies.iter().flat_map(|s| s.property_claims.iter()))
            .find_map(|claim| claim.find_claim(id))
    }

    /// Mutable depth-first search for a claim anywhere below this goal
    #[must_use]
    pub fn find_claim_mut(&mut self, id: ElementId) -> Option<&mut PropertyClaim> {
        self.property_claims
            .iter_mut()
            .chain(self.strategies.iter_mut().flat_map(|s| s.property_claims.iter_mut()))
            .find_map(|claim| claim.find_claim_mut(id))
    }
}

/// Annotation attached to a goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: ElementId,
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub goal_id: Option<ElementId>,
}

impl Context {
    /// Create an unattached context
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            info: ElementInfo::named(name),
            goal_id: None,
        }
    }

    /// Key of this context
    #[inline]
    #[must_use]
    pub fn key(&self) -> ElementKey {
        ElementKey::new(ElementKind::Context, self.id)
    }
}

/// Decomposition step between a goal and its claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: ElementId,
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub goal_id: Option<ElementId>,
    #[serde(default)]
    pub property_claims: Vec<PropertyClaim>,
}

impl Strategy {
    /// Create an unattached strategy with no claims
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            info: ElementInfo::named(name),
            goal_id: None,
            property_claims: Vec::new(),
        }
    }

    /// Key of this strategy
    #[inline]
    #[must_use]
    pub fn key(&self) -> ElementKey {
        ElementKey::new(ElementKind::Strategy, self.id)
    }

    /// Add a claim, returning self (fixture convenience)
    #[must_use]
    pub fn with_claim(mut self, mut claim: PropertyClaim) -> Self {
        claim.parent = Some(ClaimParent::Strategy(self.id));
        self.property_claims.push(claim);
        self
    }

    /// This strategy's key followed by every key below it
    #[must_use]
    pub fn subtree_keys(&self) -> Vec<ElementKey> {
        let mut out = vec![self.key()];
        for claim in &self.property_claims {
            claim.collect_keys(&mut out);
        }
        out
    }
}

/// The single parent of a property claim
///
/// A claim hangs off exactly one of a goal, a strategy or another claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ClaimParent {
    Goal(ElementId),
    Strategy(ElementId),
    PropertyClaim(ElementId),
}

impl ClaimParent {
    /// Key of the parent element
    #[must_use]
    pub fn key(self) -> ElementKey {
        match self {
            ClaimParent::Goal(id) => ElementKey::new(ElementKind::Goal, id),
            ClaimParent::Strategy(id) => ElementKey::new(ElementKind::Strategy, id),
            ClaimParent::PropertyClaim(id) => ElementKey::new(ElementKind::PropertyClaim, id),
        }
    }

    /// Parent from a key, if that kind can own claims
    #[must_use]
    pub fn from_key(key: ElementKey) -> Option<Self> {
        match key.kind {
            ElementKind::Goal => Some(ClaimParent::Goal(key.id)),
            ElementKind::Strategy => Some(ClaimParent::Strategy(key.id)),
            ElementKind::PropertyClaim => Some(ClaimParent::PropertyClaim(key.id)),
            ElementKind::Context | ElementKind::Evidence => None,
        }
    }
}

/// Claim about a property of the system, possibly nested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyClaim {
    pub id: ElementId,
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub parent: Option<ClaimParent>,
    #[serde(default)]
    pub property_claims: Vec<PropertyClaim>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

impl PropertyClaim {
    /// Create an unattached claim with no children
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            info: ElementInfo::named(name),
            parent: None,
            property_claims: Vec::new(),
            evidence: Vec::new(),
        }
    }

    /// Key of this claim
    #[inline]
    #[must_use]
    pub fn key(&self) -> ElementKey {
        ElementKey::new(ElementKind::PropertyClaim, self.id)
    }

    /// Nest a sub-claim, returning self (fixture convenience)
    #[must_use]
    pub fn with_claim(mut self, mut claim: PropertyClaim) -> Self {
        claim.parent = Some(ClaimParent::PropertyClaim(self.id));
        self.property_claims.push(claim);
        self
    }

    /// Attach evidence, returning self (fixture convenience)
    #[must_use]
    pub fn with_evidence(mut self, mut evidence: Evidence) -> Self {
        evidence.link(self.id);
        self.evidence.push(evidence);
        self
    }

    /// Depth-first search including `self`
    #[must_use]
    pub fn find_claim(&self, id: ElementId) -> Option<&PropertyClaim> {
        if self.id == id {
            return Some(self);
        }
        self.property_claims.iter().find_map(|c| c.find_claim(id))
    }

    /// Mutable depth-first search including `self`
    #[must_use]
    pub fn find_claim_mut(&mut self, id: ElementId) -> Option<&mut PropertyClaim> {
        if self.id == id {
            return Some(self);
        }
        self.property_claims.iter_mut().find_map(|c| c.find_claim_mut(id))
    }

    /// This claim's key followed by every nested claim and evidence key
    #[must_use]
    pub fn subtree_keys(&self) -> Vec<ElementKey> {
        let mut out = Vec::new();
        self.collect_keys(&mut out);
        out
    }

    fn collect_keys(&self, out: &mut Vec<ElementKey>) {
        out.push(self.key());
        for claim in &self.property_claims {
            claim.collect_keys(out);
        }
        out.extend(self.evidence.iter().map(Evidence::key));
    }
}

/// Supporting artefact, linkable from several claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: ElementId,
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub property_claim_id: Vec<ElementId>,
}

impl Evidence {
    /// Create an unlinked evidence item
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            info: ElementInfo::named(name),
            url: None,
            property_claim_id: Vec::new(),
        }
    }

    /// Key of this evidence item
    #[inline]
    #[must_use]
    pub fn key(&self) -> ElementKey {
        ElementKey::new(ElementKind::Evidence, self.id)
    }

    /// Set URL, returning self
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether `claim` is among the referencing claims
    #[inline]
    #[must_use]
    pub fn is_linked_to(&self, claim: ElementId) -> bool {
        self.property_claim_id.contains(&claim)
    }

    /// Record a link to `claim` (idempotent)
    pub fn link(&mut self, claim: ElementId) {
        if !self.is_linked_to(claim) {
            self.property_claim_id.push(claim);
        }
    }

    /// Drop the link to `claim`; returns whether it was present
    pub fn unlink(&mut self, claim: ElementId) -> bool {
        let before = self.property_claim_id.len();
        self.property_claim_id.retain(|id| *id != claim);
        before != self.property_claim_id.len()
    }

    /// First referencing claim (treated as primary by editors)
    #[inline]
    #[must_use]
    pub fn primary_claim(&self) -> Option<ElementId> {
        self.property_claim_id.first().copied()
    }
}

/// Any element that can be detached from the tree
///
/// Goals are tree roots and are not representable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Context(Context),
    Strategy(Strategy),
    PropertyClaim(PropertyClaim),
    Evidence(Evidence),
}

impl Element {
    /// Element kind
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Context(_) => ElementKind::Context,
            Element::Strategy(_) => ElementKind::Strategy,
            Element::PropertyClaim(_) => ElementKind::PropertyClaim,
            Element::Evidence(_) => ElementKind::Evidence,
        }
    }

    /// Server id
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Element::Context(e) => e.id,
            Element::Strategy(e) => e.id,
            Element::PropertyClaim(e) => e.id,
            Element::Evidence(e) => e.id,
        }
    }

    /// `(kind, id)` key
    #[inline]
    #[must_use]
    pub fn key(&self) -> ElementKey {
        ElementKey::new(self.kind(), self.id())
    }

    /// Descriptive attributes
    #[must_use]
    pub fn info(&self) -> &ElementInfo {
        match self {
            Element::Context(e) => &e.info,
            Element::Strategy(e) => &e.info,
            Element::PropertyClaim(e) => &e.info,
            Element::Evidence(e) => &e.info,
        }
    }

    /// Mutable descriptive attributes
    pub fn info_mut(&mut self) -> &mut ElementInfo {
        match self {
            Element::Context(e) => &mut e.info,
            Element::Strategy(e) => &mut e.info,
            Element::PropertyClaim(e) => &mut e.info,
            Element::Evidence(e) => &mut e.info,
        }
    }

    /// Keys of every parent this element references
    #[must_use]
    pub fn parent_keys(&self) -> Vec<ElementKey> {
        match self {
            Element::Context(e) => e.goal_id.map(ElementKey::goal_from).into_iter().collect(),
            Element::Strategy(e) => e.goal_id.map(ElementKey::goal_from).into_iter().collect(),
            Element::PropertyClaim(e) => e.parent.map(ClaimParent::key).into_iter().collect(),
            Element::Evidence(e) => e
                .property_claim_id
                .iter()
                .map(|id| ElementKey::new(ElementKind::PropertyClaim, *id))
                .collect(),
        }
    }

    /// Drop every parent reference
    pub fn clear_parent(&mut self) {
        match self {
            Element::Context(e) => e.goal_id = None,
            Element::Strategy(e) => e.goal_id = None,
            Element::PropertyClaim(e) => e.parent = None,
            Element::Evidence(e) => e.property_claim_id.clear(),
        }
    }

    /// This element's key followed by every key in its subtree
    #[must_use]
    pub fn subtree_keys(&self) -> Vec<ElementKey> {
        match self {
            Element::Context(_) | Element::Evidence(_) => vec![self.key()],
            Element::Strategy(s) => s.subtree_keys(),
            Element::PropertyClaim(c) => c.subtree_keys(),
        }
    }
}

impl From<Context> for Element {
    fn from(value: Context) -> Self {
        Element::Context(value)
    }
}

impl From<Strategy> for Element {
    fn from(value: Strategy) -> Self {
        Element::Strategy(value)
    }
}

impl From<PropertyClaim> for Element {
    fn from(value: PropertyClaim) -> Self {
        Element::PropertyClaim(value)
    }
}

impl From<Evidence> for Element {
    fn from(value: Evidence) -> Self {
        Element::Evidence(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nested_claim() -> PropertyClaim {
        PropertyClaim::new(1, "P1")
            .with_claim(
                PropertyClaim::new(2, "P1.1")
                    .with_claim(PropertyClaim::new(3, "P1.1.1"))
                    .with_evidence(Evidence::new(10, "E1")),
            )
            .with_evidence(Evidence::new(11, "E2"))
    }

    #[test]
    fn find_claim_is_depth_first_and_includes_self() {
        let claim = nested_claim();
        assert_eq!(claim.find_claim(ElementId(1)).map(|c| c.id), Some(ElementId(1)));
        assert_eq!(claim.find_claim(ElementId(3)).map(|c| c.id), Some(ElementId(3)));
        assert!(claim.find_claim(ElementId(99)).is_none());
    }

    #[test]
    fn with_helpers_set_parent_references() {
        let claim = nested_claim();
        let child = &claim.property_claims[0];
        assert_eq!(child.parent, Some(ClaimParent::PropertyClaim(ElementId(1))));
        assert_eq!(child.evidence[0].property_claim_id, vec![ElementId(2)]);
    }

    #[test]
    fn subtree_keys_cover_nested_data() {
        let keys = Element::from(nested_claim()).subtree_keys();
        assert_eq!(
            keys,
            vec![
                ElementKey::claim(1),
                ElementKey::claim(2),
                ElementKey::claim(3),
                ElementKey::evidence(10),
                ElementKey::evidence(11),
            ]
        );
    }

    #[test]
    fn evidence_link_is_idempotent() {
        let mut e = Evidence::new(1, "E1");
        e.link(ElementId(4));
        e.link(ElementId(4));
        e.link(ElementId(5));
        assert_eq!(e.property_claim_id, vec![ElementId(4), ElementId(5)]);
        assert_eq!(e.primary_claim(), Some(ElementId(4)));
        assert!(e.unlink(ElementId(4)));
        assert!(!e.unlink(ElementId(4)));
        assert_eq!(e.primary_claim(), Some(ElementId(5)));
    }

    #[test]
    fn clear_parent_drops_all_references() {
        let mut element = Element::from(Evidence::new(1, "E1"));
        if let Element::Evidence(e) = &mut element {
            e.link(ElementId(2));
            e.link(ElementId(3));
        }
        assert_eq!(element.parent_keys().len(), 2);
        element.clear_parent();
        assert!(element.parent_keys().is_empty());
    }

    #[test]
    fn claim_parent_from_key_rejects_leaves() {
        assert_eq!(
            ClaimParent::from_key(ElementKey::strategy(4)),
            Some(ClaimParent::Strategy(ElementId(4)))
        );
        assert!(ClaimParent::from_key(ElementKey::context(4)).is_none());
        assert!(ClaimParent::from_key(ElementKey::evidence(4)).is_none());
    }

    #[test]
    fn element_json_shape() {
        let element = Element::from(Strategy::new(7, "S1"));
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "strategy");
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "S1");

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn claim_parent_json_shape() {
        let mut claim = PropertyClaim::new(3, "P1");
        claim.parent = Some(ClaimParent::Strategy(ElementId(9)));
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["parent"]["kind"], "strategy");
        assert_eq!(json["parent"]["id"], 9);
    }
}
