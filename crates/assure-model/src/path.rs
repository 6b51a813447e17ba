//! Element paths for addressing within a case
//!
//! Provides [`ElementPath`] for the position of an element inside the nested
//! goal/strategy/claim collections, and path resolution against an
//! [`AssuranceCase`].

use crate::case::AssuranceCase;
use crate::element::{Context, Element, ElementInfo, Evidence, Goal, PropertyClaim, Strategy};
use crate::id::{ElementKey, ElementKind};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step into a child collection, by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathStep {
    /// `case.goals[i]`
    Goal(usize),
    /// `goal.context[i]`
    Context(usize),
    /// `goal.strategies[i]`
    Strategy(usize),
    /// `*.property_claims[i]`
    Claim(usize),
    /// `claim.evidence[i]`
    Evidence(usize),
}

impl PathStep {
    /// Position within the collection
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            PathStep::Goal(i)
            | PathStep::Context(i)
            | PathStep::Strategy(i)
            | PathStep::Claim(i)
            | PathStep::Evidence(i) => i,
        }
    }

    /// Kind of element the step lands on
    #[inline]
    #[must_use]
    pub fn kind(self) -> ElementKind {
        match self {
            PathStep::Goal(_) => ElementKind::Goal,
            PathStep::Context(_) => ElementKind::Context,
            PathStep::Strategy(_) => ElementKind::Strategy,
            PathStep::Claim(_) => ElementKind::PropertyClaim,
            PathStep::Evidence(_) => ElementKind::Evidence,
        }
    }

    fn tag(self) -> char {
        match self {
            PathStep::Goal(_) => 'g',
            PathStep::Context(_) => 'c',
            PathStep::Strategy(_) => 's',
            PathStep::Claim(_) => 'p',
            PathStep::Evidence(_) => 'e',
        }
    }
}

impl Display for PathStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tag(), self.index())
    }
}

impl FromStr for PathStep {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let tag = chars.next().ok_or(PathError::EmptySegment)?;
        let index: usize = chars
            .as_str()
            .parse()
            .map_err(|_| PathError::InvalidSegment(s.to_string()))?;
        match tag {
            'g' => Ok(PathStep::Goal(index)),
            'c' => Ok(PathStep::Context(index)),
            's' => Ok(PathStep::Strategy(index)),
            'p' => Ok(PathStep::Claim(index)),
            'e' => Ok(PathStep::Evidence(index)),
            _ => Err(PathError::InvalidSegment(s.to_string())),
        }
    }
}

/// Location of an element inside a case
///
/// # Examples
/// - `g0` → first goal
/// - `g0.s1.p0` → first claim of the second strategy of the first goal
/// - `g0.p2.p0.e1` → second evidence of a nested claim
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ElementPath(Vec<PathStep>);

impl ElementPath {
    /// Create path from steps
    #[inline]
    #[must_use]
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }

    /// Empty path (the case itself)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path steps
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parent path (if not root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Last step (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<PathStep> {
        self.0.last().copied()
    }

    /// Append a step, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, step: PathStep) -> Self {
        let mut new = self.clone();
        new.0.push(step);
        new
    }

    /// Check if this path is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Check if this path is a strict ancestor of another
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }
}

impl Display for ElementPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for ElementPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let steps = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else {
                    seg.parse()
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self(steps))
    }
}

/// Borrowed view of whatever a path points at
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Goal(&'a Goal),
    Context(&'a Context),
    Strategy(&'a Strategy),
    Claim(&'a PropertyClaim),
    Evidence(&'a Evidence),
}

impl NodeRef<'_> {
    /// Key of the referenced element
    #[must_use]
    pub fn key(&self) -> ElementKey {
        match self {
            NodeRef::Goal(g) => g.key(),
            NodeRef::Context(c) => c.key(),
            NodeRef::Strategy(s) => s.key(),
            NodeRef::Claim(p) => p.key(),
            NodeRef::Evidence(e) => e.key(),
        }
    }

    /// Descriptive attributes of the referenced element
    #[must_use]
    pub fn info(&self) -> &ElementInfo {
        match self {
            NodeRef::Goal(g) => &g.info,
            NodeRef::Context(c) => &c.info,
            NodeRef::Strategy(s) => &s.info,
            NodeRef::Claim(p) => &p.info,
            NodeRef::Evidence(e) => &e.info,
        }
    }

    /// Owned copy as a detachable element (`None` for goals)
    #[must_use]
    pub fn to_element(&self) -> Option<Element> {
        match self {
            NodeRef::Goal(_) => None,
            NodeRef::Context(c) => Some(Element::Context((*c).clone())),
            NodeRef::Strategy(s) => Some(Element::Strategy((*s).clone())),
            NodeRef::Claim(p) => Some(Element::PropertyClaim((*p).clone())),
            NodeRef::Evidence(e) => Some(Element::Evidence((*e).clone())),
        }
    }
}

/// Mutable view of whatever a path points at
#[derive(Debug)]
pub enum NodeMut<'a> {
    Goal(&'a mut Goal),
    Context(&'a mut Context),
    Strategy(&'a mut Strategy),
    Claim(&'a mut PropertyClaim),
    Evidence(&'a mut Evidence),
}

impl NodeMut<'_> {
    /// Mutable descriptive attributes of the referenced element
    pub fn info_mut(&mut self) -> &mut ElementInfo {
        match self {
            NodeMut::Goal(g) => &mut g.info,
            NodeMut::Context(c) => &mut c.info,
            NodeMut::Strategy(s) => &mut s.info,
            NodeMut::Claim(p) => &mut p.info,
            NodeMut::Evidence(e) => &mut e.info,
        }
    }
}

impl AssuranceCase {
    /// Resolve a path to the element it addresses
    #[must_use]
    pub fn resolve(&self, path: &ElementPath) -> Option<NodeRef<'_>> {
        let (first, rest) = path.steps().split_first()?;
        let PathStep::Goal(i) = *first else {
            return None;
        };
        let mut node = NodeRef::Goal(self.goals.get(i)?);
        for step in rest {
            node = match (node, *step) {
                (NodeRef::Goal(g), PathStep::Context(i)) => NodeRef::Context(g.context.get(i)?),
                (NodeRef::Goal(g), PathStep::Strategy(i)) => NodeRef::Strategy(g.strategies.get(i)?),
                (NodeRef::Goal(g), PathStep::Claim(i)) => NodeRef::Claim(g.property_claims.get(i)?),
                (NodeRef::Strategy(s), PathStep::Claim(i)) => {
                    NodeRef::Claim(s.property_claims.get(i)?)
                }
                (NodeRef::Claim(p), PathStep::Claim(i)) => NodeRef::Claim(p.property_claims.get(i)?),
                (NodeRef::Claim(p), PathStep::Evidence(i)) => NodeRef::Evidence(p.evidence.get(i)?),
                _ => return None,
            };
        }
        Some(node)
    }

    /// Resolve a path mutably
    #[must_use]
    pub fn resolve_mut(&mut self, path: &ElementPath) -> Option<NodeMut<'_>> {
        let (first, rest) = path.steps().split_first()?;
        let PathStep::Goal(i) = *first else {
            return None;
        };
        let mut node = NodeMut::Goal(self.goals.get_mut(i)?);
        for step in rest {
            node = match (node, *step) {
                (NodeMut::Goal(g), PathStep::Context(i)) => NodeMut::Context(g.context.get_mut(i)?),
                (NodeMut::Goal(g), PathStep::Strategy(i)) => {
                    NodeMut::Strategy(g.strategies.get_mut(i)?)
                }
                (NodeMut::Goal(g), PathStep::Claim(i)) => {
                    NodeMut::Claim(g.property_claims.get_mut(i)?)
                }
                (NodeMut::Strategy(s), PathStep::Claim(i)) => {
                    NodeMut::Claim(s.property_claims.get_mut(i)?)
                }
                (NodeMut::Claim(p), PathStep::Claim(i)) => {
                    NodeMut::Claim(p.property_claims.get_mut(i)?)
                }
                (NodeMut::Claim(p), PathStep::Evidence(i)) => {
                    NodeMut::Evidence(p.evidence.get_mut(i)?)
                }
                _ => return None,
            };
        }
        Some(node)
    }
}

/// Errors related to element paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Segment is not a tag letter followed by an index
    #[error("invalid segment: {0} (expected g|c|s|p|e followed by an index)")]
    InvalidSegment(String),
}
