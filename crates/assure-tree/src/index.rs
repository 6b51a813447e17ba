//! Element location index
//!
//! Provides [`CaseIndex`], mapping each element key to the path(s) where it
//! sits in the nested case. Rebuilt after every structural mutation so that
//! attach targets are found by lookup instead of a fresh tree search.

use assure_model::{AssuranceCase, ElementKey, ElementKind, ElementPath, PathStep, PropertyClaim};
use std::collections::HashMap;

/// Key → path index over one case
///
/// Evidence may legitimately appear under several claims and therefore has
/// one path per referencing claim. Every other kind has at most one path in
/// a consistent tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseIndex {
    paths: HashMap<ElementKey, Vec<ElementPath>>,
    /// Visit order, for deterministic iteration
    order: Vec<ElementKey>,
}

/// One indexed placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// The placed element
    pub key: ElementKey,
    /// Where it sits
    pub path: ElementPath,
    /// Key of the element owning the collection, `None` for goals
    pub parent: Option<ElementKey>,
}

impl Placement {
    /// Number of steps from the case root (goals are depth 1)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

impl CaseIndex {
    /// Build index by walking the whole case
    #[must_use]
    pub fn build(case: &AssuranceCase) -> Self {
        let mut index = Self::default();
        for (gi, goal) in case.goals.iter().enumerate() {
            let goal_path = ElementPath::new(vec![PathStep::Goal(gi)]);
            index.record(goal.key(), goal_path.clone());

            for (ci, context) in goal.context.iter().enumerate() {
                index.record(
                    ElementKey::new(ElementKind::Context, context.id),
                    goal_path.child(PathStep::Context(ci)),
                );
            }
            for (si, strategy) in goal.strategies.iter().enumerate() {
                let strategy_path = goal_path.child(PathStep::Strategy(si));
                index.record(
                    ElementKey::new(ElementKind::Strategy, strategy.id),
                    strategy_path.clone(),
                );
                index.record_claims(&strategy.property_claims, &strategy_path);
            }
            index.record_claims(&goal.property_claims, &goal_path);
        }
        index
    }

    fn record_claims(&mut self, claims: &[PropertyClaim], parent: &ElementPath) {
        for (pi, claim) in claims.iter().enumerate() {
            let claim_path = parent.child(PathStep::Claim(pi));
            self.record(claim.key(), claim_path.clone());
            self.record_claims(&claim.property_claims, &claim_path);
            for (ei, evidence) in claim.evidence.iter().enumerate() {
                self.record(evidence.key(), claim_path.child(PathStep::Evidence(ei)));
            }
        }
    }

    fn record(&mut self, key: ElementKey, path: ElementPath) {
        let entry = self.paths.entry(key).or_default();
        if entry.is_empty() {
            self.order.push(key);
        }
        entry.push(path);
    }

    /// All paths for a key (empty if absent)
    #[must_use]
    pub fn paths(&self, key: &ElementKey) -> &[ElementPath] {
        self.paths.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First recorded path for a key
    #[inline]
    #[must_use]
    pub fn first_path(&self, key: &ElementKey) -> Option<&ElementPath> {
        self.paths(key).first()
    }

    /// Check if key is placed anywhere in the tree
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ElementKey) -> bool {
        self.paths.contains_key(key)
    }

    /// Number of distinct elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in tree visit order
    pub fn keys(&self) -> impl Iterator<Item = &ElementKey> {
        self.order.iter()
    }

    /// Every placement with its owning parent, in visit order
    #[must_use]
    pub fn placements(&self, case: &AssuranceCase) -> Vec<Placement> {
        let mut out = Vec::new();
        for key in &self.order {
            for path in self.paths(key) {
                let parent = path
                    .parent()
                    .filter(|p| !p.is_empty())
                    .and_then(|p| case.resolve(&p))
                    .map(|node| node.key());
                out.push(Placement {
                    key: *key,
                    path: path.clone(),
                    parent,
                });
            }
        }
        out
    }

    /// Keys placed more than once where that is not allowed (non-evidence)
    #[must_use]
    pub fn duplicates(&self) -> Vec<(ElementKey, &[ElementPath])> {
        self.order
            .iter()
            .filter(|key| key.kind != ElementKind::Evidence)
            .filter_map(|key| {
                let paths = self.paths(key);
                (paths.len() > 1).then_some((*key, paths))
            })
            .collect()
    }

    /// Whether `descendant` sits inside the subtree rooted at `ancestor`
    #[must_use]
    pub fn is_within(&self, descendant: &ElementKey, ancestor: &ElementKey) -> bool {
        let ancestors = self.paths(ancestor);
        self.paths(descendant)
            .iter()
            .any(|d| ancestors.iter().any(|a| a.is_ancestor_of(d)))
    }
}
