//! Tree engine
//!
//! [`CaseSnapshot`] pairs an [`AssuranceCase`] with its [`OrphanSet`] and a
//! [`CaseIndex`] over the tree. Every operation is pure: it borrows the
//! snapshot, and on success returns a new one. On error the input is
//! untouched, so callers can dry-run an edit before persisting it.
//!
//! # Partition
//!
//! Each element sits in exactly one of: the tree, or the orphan set.
//! Evidence is the exception: it may be listed under several claims as long
//! as each of them is in its `property_claim_id`, and a copy nested in an
//! orphan subtree may share its key with copies still placed in the tree.
//! Detach and move carry subtrees intact, shared evidence included.

use crate::error::TreeError;
use crate::index::{CaseIndex, Placement};
use crate::patch::ElementPatch;
use assure_model::{
    compat, AssuranceCase, ClaimParent, Element, ElementId, ElementKey, ElementKind, ElementPath,
    Evidence, Goal, NodeMut, NodeRef, OrphanSet, PathStep, PropertyClaim,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What happens to the children of a deleted element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remove the whole subtree
    #[default]
    Cascade,
    /// Move direct children (with their subtrees) to the orphan set
    OrphanChildren,
}

/// A case together with its orphan set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SnapshotParts", into = "SnapshotParts")]
pub struct CaseSnapshot {
    case: AssuranceCase,
    orphans: OrphanSet,
    index: CaseIndex,
}

/// Serialized form of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotParts {
    case: AssuranceCase,
    #[serde(default)]
    orphans: OrphanSet,
}

impl From<SnapshotParts> for CaseSnapshot {
    fn from(parts: SnapshotParts) -> Self {
        Self::from_parts(parts.case, parts.orphans)
    }
}

impl From<CaseSnapshot> for SnapshotParts {
    fn from(snapshot: CaseSnapshot) -> Self {
        let (case, orphans) = snapshot.into_parts();
        Self { case, orphans }
    }
}

impl CaseSnapshot {
    /// Snapshot with an empty orphan set
    #[must_use]
    pub fn new(case: AssuranceCase) -> Self {
        Self::from_parts(case, OrphanSet::new())
    }

    /// Snapshot from a case and an existing orphan set
    #[must_use]
    pub fn from_parts(case: AssuranceCase, orphans: OrphanSet) -> Self {
        let index = CaseIndex::build(&case);
        Self { case, orphans, index }
    }

    /// Split back into case and orphans
    #[must_use]
    pub fn into_parts(self) -> (AssuranceCase, OrphanSet) {
        (self.case, self.orphans)
    }

    /// The case tree
    #[inline]
    #[must_use]
    pub fn case(&self) -> &AssuranceCase {
        &self.case
    }

    /// Detached elements
    #[inline]
    #[must_use]
    pub fn orphans(&self) -> &OrphanSet {
        &self.orphans
    }

    /// Location index over the tree
    #[inline]
    #[must_use]
    pub fn index(&self) -> &CaseIndex {
        &self.index
    }

    /// Check if the element is placed in the tree
    #[inline]
    #[must_use]
    pub fn is_attached(&self, key: &ElementKey) -> bool {
        self.index.contains(key)
    }

    /// Check if the element is a root of the orphan set
    #[inline]
    #[must_use]
    pub fn is_orphan(&self, key: &ElementKey) -> bool {
        self.orphans.contains(key)
    }

    /// Tree node for a key (first placement for shared evidence)
    #[must_use]
    pub fn locate(&self, key: &ElementKey) -> Option<NodeRef<'_>> {
        self.index
            .first_path(key)
            .and_then(|path| self.case.resolve(path))
    }

    /// Owned copy of a detachable element, from the tree or the orphan set
    #[must_use]
    pub fn element(&self, key: &ElementKey) -> Option<Element> {
        self.locate(key)
            .and_then(|node| node.to_element())
            .or_else(|| self.orphans.get(key).cloned())
    }

    /// Every tree placement with its parent key and depth
    #[must_use]
    pub fn elements(&self) -> Vec<Placement> {
        self.index.placements(&self.case)
    }

    /// Orphans that could be attached under a node of `node_type`
    #[must_use]
    pub fn filter_orphans_for_node(&self, node_type: &str) -> Vec<&Element> {
        self.orphans.filter_for_node(node_type)
    }

    /// Insert `element` (with its subtree) under `target`
    ///
    /// If the element is currently an orphan it leaves the orphan set in the
    /// same step. The target is found through the index; a missing target is
    /// a not-found error.
    ///
    /// # Errors
    ///
    /// - [`TreeError::InvalidParent`] if no attachment rule covers the pair
    /// - [`TreeError::AlreadyAttached`] if the element, or any non-evidence key
    ///   of its subtree, is already in the tree
    /// - [`TreeError::Conflict`] if a nested non-evidence key is held by a
    ///   different orphan
    /// - [`TreeError::ParentNotFound`] if `target` is not in the tree
    pub fn attach(&self, element: Element, target: ElementKey) -> Result<Self, TreeError> {
        let child = element.key();
        if !compat::can_attach(child.kind, target.kind) {
            tracing::warn!("Rejected attach of {} under {}", child, target);
            return Err(TreeError::InvalidParent {
                child: child.kind,
                parent: target.kind,
            });
        }

        let subtree = element.subtree_keys();
        // nested evidence may already be shared with the tree or another orphan
        let exclusive: Vec<ElementKey> = subtree
            .iter()
            .copied()
            .filter(|k| *k == child || k.kind != ElementKind::Evidence)
            .collect();
        if let Some(key) = exclusive.iter().find(|k| self.index.contains(k)) {
            return Err(TreeError::AlreadyAttached { key: *key });
        }

        let mut next = self.clone();
        if let Some(existing) = next.orphans.remove(&child) {
            // the incoming element must carry the orphan's whole subtree
            let incoming: HashSet<ElementKey> = subtree.iter().copied().collect();
            if let Some(key) = existing.subtree_keys().into_iter().find(|k| !incoming.contains(k)) {
                return Err(TreeError::Conflict { key });
            }
        }
        let held: HashSet<ElementKey> = next.orphans.all_keys().into_iter().collect();
        if let Some(key) = subtree
            .iter()
            .find(|k| k.kind != ElementKind::Evidence && held.contains(k))
        {
            return Err(TreeError::Conflict { key: *key });
        }
        // a loose evidence orphan rejoins the tree through the incoming copy
        for key in subtree.iter().filter(|k| k.kind == ElementKind::Evidence) {
            if next.orphans.remove(key).is_some() {
                tracing::debug!("Evidence orphan {} rejoined the tree under {}", key, child);
            }
        }

        let Some(path) = next.index.first_path(&target).cloned() else {
            tracing::warn!("Attach target {} not found for {}", target, child);
            return Err(TreeError::ParentNotFound { child, parent: target });
        };
        if !insert_child(&mut next.case, &path, element) {
            return Err(TreeError::ParentNotFound { child, parent: target });
        }
        next.reindex();

        tracing::debug!("Attached {} under {} at {}", child, target, path);
        Ok(next)
    }

    /// Remove an element (with its subtree) from the tree into the orphan set
    ///
    /// The subtree keeps its internal structure, evidence links included,
    /// so reattaching it restores it unchanged. Evidence it shares with
    /// claims outside the subtree also stays placed under those claims.
    ///
    /// # Errors
    ///
    /// [`TreeError::RootElement`] for goals, [`TreeError::NotAttached`] for
    /// orphans, [`TreeError::NotFound`] for unknown keys.
    pub fn detach(&self, key: ElementKey) -> Result<Self, TreeError> {
        self.ensure_placed(key)?;
        let mut next = self.clone();
        let element = next.take(key)?;
        next.orphans.insert(element);

        tracing::debug!("Detached {} into orphan set ({} orphans)", key, next.orphans.len());
        Ok(next)
    }

    /// Move an element (with its subtree) under a new parent
    ///
    /// The subtree travels intact, shared evidence and its links included.
    /// Moving an orphan is the same as attaching it.
    ///
    /// # Errors
    ///
    /// As [`Self::detach`] and [`Self::attach`], plus
    /// [`TreeError::CycleDetected`] when `target` is inside the moved subtree.
    pub fn move_element(&self, key: ElementKey, target: ElementKey) -> Result<Self, TreeError> {
        if let Some(orphan) = self.orphans.get(&key) {
            return self.attach(orphan.clone(), target);
        }
        self.ensure_placed(key)?;
        if !compat::can_attach(key.kind, target.kind) {
            return Err(TreeError::InvalidParent {
                child: key.kind,
                parent: target.kind,
            });
        }
        if target == key || self.index.is_within(&target, &key) {
            return Err(TreeError::CycleDetected { key, target });
        }
        if !self.index.contains(&target) {
            return Err(TreeError::ParentNotFound { child: key, parent: target });
        }

        let mut next = self.clone();
        let mut element = next.take(key)?;
        element.clear_parent();
        // taking the subtree may shift sibling indices, so the target path is looked up afresh
        let path = next
            .index
            .first_path(&target)
            .cloned()
            .ok_or(TreeError::ParentNotFound { child: key, parent: target })?;
        if !insert_child(&mut next.case, &path, element) {
            return Err(TreeError::ParentNotFound { child: key, parent: target });
        }
        if key.kind == ElementKind::Evidence {
            nested_orphan_evidence_mut(&mut next.orphans, key.id, &mut |copy| copy.link(target.id));
        }
        next.reindex();

        tracing::debug!("Moved {} under {}", key, target);
        Ok(next)
    }

    /// Remove an element from the tree or the orphan set for good
    ///
    /// Evidence left anywhere else drops its links to the deleted claims.
    /// Under [`DeletePolicy::OrphanChildren`] direct evidence children that
    /// are still listed elsewhere only lose the link to the deleted claim.
    ///
    /// # Errors
    ///
    /// [`TreeError::RootDeletion`] for goals under a non-cascading policy,
    /// [`TreeError::NotFound`] if the key is neither placed nor an orphan root.
    pub fn remove(&self, key: ElementKey, policy: DeletePolicy) -> Result<Self, TreeError> {
        if key.kind == ElementKind::Goal {
            return self.remove_goal(key, policy);
        }

        let mut next = self.clone();
        let element = if let Some(orphan) = next.orphans.remove(&key) {
            orphan
        } else if next.index.contains(&key) {
            next.take(key)?
        } else {
            return Err(TreeError::NotFound { key });
        };

        let released = match policy {
            DeletePolicy::Cascade => element_members(&element).0,
            DeletePolicy::OrphanChildren if key.kind == ElementKind::PropertyClaim => HashSet::from([key.id]),
            DeletePolicy::OrphanChildren => HashSet::new(),
        };
        next.release_claims(&released);

        if policy == DeletePolicy::OrphanChildren {
            for child in children_of(element) {
                let child_key = child.key();
                if child_key.kind == ElementKind::Evidence && next.holds(&child_key) {
                    continue;
                }
                next.orphans.insert(child);
            }
        }

        tracing::debug!("Removed {} ({:?})", key, policy);
        Ok(next)
    }

    fn remove_goal(&self, key: ElementKey, policy: DeletePolicy) -> Result<Self, TreeError> {
        if policy != DeletePolicy::Cascade {
            return Err(TreeError::RootDeletion { key });
        }
        let position = match self.index.first_path(&key).and_then(ElementPath::last) {
            Some(PathStep::Goal(i)) => i,
            _ => return Err(TreeError::NotFound { key }),
        };

        let mut next = self.clone();
        let goal = next.case.goals.remove(position);
        let (claims, _) = goal_members(&goal);
        next.release_claims(&claims);
        next.reindex();

        tracing::debug!("Removed goal {} and its subtree", key);
        Ok(next)
    }

    /// Add a goal (with any subtree) as a new tree root
    ///
    /// # Errors
    ///
    /// [`TreeError::AlreadyAttached`] if any key of the goal is already placed.
    pub fn insert_goal(&self, mut goal: Goal) -> Result<Self, TreeError> {
        if let Some(key) = goal.subtree_keys().into_iter().find(|k| self.index.contains(k)) {
            return Err(TreeError::AlreadyAttached { key });
        }
        for context in &mut goal.context {
            context.goal_id = Some(goal.id);
        }
        for strategy in &mut goal.strategies {
            strategy.goal_id = Some(goal.id);
        }
        for claim in &mut goal.property_claims {
            claim.parent = Some(ClaimParent::Goal(goal.id));
        }

        let mut next = self.clone();
        let key = goal.key();
        next.case.goals.push(goal);
        next.reindex();

        tracing::debug!("Inserted goal {}", key);
        Ok(next)
    }

    /// List already attached evidence under one more claim
    ///
    /// Linking to a claim that already lists the evidence is a no-op.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidParent`] unless linking evidence to a claim,
    /// [`TreeError::NotAttached`] / [`TreeError::NotFound`] for the evidence,
    /// [`TreeError::ParentNotFound`] for the claim.
    pub fn link_evidence(&self, evidence: ElementKey, claim: ElementKey) -> Result<Self, TreeError> {
        check_evidence_pair(evidence, claim)?;
        self.ensure_placed(evidence)?;
        let Some(claim_path) = self.index.first_path(&claim).cloned() else {
            return Err(TreeError::ParentNotFound {
                child: evidence,
                parent: claim,
            });
        };
        if self.evidence_path_under(evidence, &claim_path).is_some() {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        let mut template = None;
        for path in self.index.paths(&evidence) {
            if let Some(NodeMut::Evidence(item)) = next.case.resolve_mut(path) {
                item.link(claim.id);
                template.get_or_insert_with(|| item.clone());
            }
        }
        let template = template.ok_or(TreeError::NotFound { key: evidence })?;
        nested_orphan_evidence_mut(&mut next.orphans, evidence.id, &mut |item| item.link(claim.id));
        match next.case.resolve_mut(&claim_path) {
            Some(NodeMut::Claim(target)) => target.evidence.push(template),
            _ => {
                return Err(TreeError::ParentNotFound {
                    child: evidence,
                    parent: claim,
                })
            }
        }
        next.reindex();

        tracing::debug!("Linked {} to {}", evidence, claim);
        Ok(next)
    }

    /// Drop one claim's link to evidence
    ///
    /// When the last tree link goes the evidence becomes an orphan, unless
    /// an orphan subtree still holds a copy of it.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotAttached`] if the claim does not list the evidence.
    pub fn unlink_evidence(&self, evidence: ElementKey, claim: ElementKey) -> Result<Self, TreeError> {
        check_evidence_pair(evidence, claim)?;
        self.ensure_placed(evidence)?;
        let claim_path = self
            .index
            .first_path(&claim)
            .ok_or(TreeError::ParentNotFound {
                child: evidence,
                parent: claim,
            })?;
        let Some(target) = self.evidence_path_under(evidence, claim_path) else {
            return Err(TreeError::NotAttached { key: evidence });
        };

        let mut next = self.clone();
        let removed = take_at(&mut next.case, &target).ok_or(TreeError::NotFound { key: evidence })?;
        let remaining: Vec<_> = self
            .index
            .paths(&evidence)
            .iter()
            .filter(|p| **p != target)
            .collect();
        for path in &remaining {
            if let Some(NodeMut::Evidence(item)) = next.case.resolve_mut(path) {
                item.unlink(claim.id);
            }
        }
        nested_orphan_evidence_mut(&mut next.orphans, evidence.id, &mut |item| {
            item.unlink(claim.id);
        });
        if remaining.is_empty() && !next.orphans.all_keys().contains(&evidence) {
            next.orphans.insert(removed);
        }
        next.reindex();

        tracing::debug!("Unlinked {} from {}", evidence, claim);
        Ok(next)
    }

    /// Apply an attribute patch to every copy of an element
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidPatch`] for a URL on anything but evidence,
    /// [`TreeError::NotFound`] if the key is neither placed nor an orphan root.
    pub fn update_element(&self, key: ElementKey, patch: &ElementPatch) -> Result<Self, TreeError> {
        if patch.url.is_some() && key.kind != ElementKind::Evidence {
            return Err(TreeError::InvalidPatch {
                key,
                reason: "only evidence carries a url".into(),
            });
        }

        let mut next = self.clone();
        let mut found = false;
        for path in self.index.paths(&key) {
            if let Some(mut node) = next.case.resolve_mut(path) {
                patch.apply(node.info_mut());
                if let (NodeMut::Evidence(item), Some(url)) = (node, &patch.url) {
                    item.url = Some(url.clone());
                }
                found = true;
            }
        }
        if let Some(orphan) = next.orphans.get_mut(&key) {
            patch.apply(orphan.info_mut());
            if let (Element::Evidence(item), Some(url)) = (orphan, &patch.url) {
                item.url = Some(url.clone());
            }
            found = true;
        }
        if key.kind == ElementKind::Evidence {
            nested_orphan_evidence_mut(&mut next.orphans, key.id, &mut |item| {
                patch.apply(&mut item.info);
                if let Some(url) = &patch.url {
                    item.url = Some(url.clone());
                }
                found = true;
            });
        }
        if !found {
            return Err(TreeError::NotFound { key });
        }
        Ok(next)
    }

    /// Keep only the listed orphans
    ///
    /// Evidence shared with a dropped orphan loses its links to the
    /// dropped claims.
    #[must_use]
    pub fn retain_orphans(&self, keep: &[ElementKey]) -> Self {
        let dropped: HashSet<ElementId> = self
            .orphans
            .iter()
            .filter(|orphan| !keep.contains(&orphan.key()))
            .flat_map(|orphan| element_members(orphan).0)
            .collect();
        let mut next = self.clone();
        next.orphans.retain_keys(keep);
        next.release_claims(&dropped);
        next
    }

    fn ensure_placed(&self, key: ElementKey) -> Result<(), TreeError> {
        if key.kind == ElementKind::Goal {
            return Err(TreeError::RootElement { key });
        }
        if self.index.contains(&key) {
            Ok(())
        } else if self.orphans.contains(&key) {
            Err(TreeError::NotAttached { key })
        } else {
            Err(TreeError::NotFound { key })
        }
    }

    /// Path of the copy of `evidence` sitting directly under `claim_path`
    fn evidence_path_under(&self, evidence: ElementKey, claim_path: &ElementPath) -> Option<ElementPath> {
        self.index
            .paths(&evidence)
            .iter()
            .find(|p| p.parent().as_ref() == Some(claim_path))
            .cloned()
    }

    /// Check if the key is placed or held anywhere in the orphan set
    fn holds(&self, key: &ElementKey) -> bool {
        self.index.contains(key) || self.orphans.all_keys().contains(key)
    }

    /// Take every placement of `key` out of the tree and return one of them
    ///
    /// The subtree is returned as it stands. Evidence taken as the root
    /// leaves every claim listing it and keeps no links; copies nested in
    /// orphan subtrees drop their links to those claims.
    fn take(&mut self, key: ElementKey) -> Result<Element, TreeError> {
        let mut paths = self.index.paths(&key).to_vec();
        if paths.is_empty() {
            return Err(TreeError::NotFound { key });
        }
        let holders: HashSet<ElementId> = if key.kind == ElementKind::Evidence {
            paths
                .iter()
                .filter_map(ElementPath::parent)
                .filter_map(|parent| match self.case.resolve(&parent) {
                    Some(NodeRef::Claim(claim)) => Some(claim.id),
                    _ => None,
                })
                .collect()
        } else {
            HashSet::new()
        };
        // later siblings first so earlier paths stay valid
        paths.sort();
        paths.reverse();

        let mut taken = None;
        for path in &paths {
            let element = take_at(&mut self.case, path).ok_or(TreeError::NotFound { key })?;
            taken.get_or_insert(element);
        }
        let mut element = taken.ok_or(TreeError::NotFound { key })?;
        if let Element::Evidence(item) = &mut element {
            item.property_claim_id.clear();
            nested_orphan_evidence_mut(&mut self.orphans, key.id, &mut |copy| {
                copy.property_claim_id.retain(|id| !holders.contains(id));
            });
        }

        self.reindex();
        Ok(element)
    }

    /// Unlink deleted claims from every evidence copy left behind
    fn release_claims(&mut self, claims: &HashSet<ElementId>) {
        if claims.is_empty() {
            return;
        }
        let mut release = |claim: &mut PropertyClaim| {
            for item in &mut claim.evidence {
                item.property_claim_id.retain(|id| !claims.contains(id));
            }
        };
        visit_case_claims_mut(&mut self.case, &mut release);
        for orphan in self.orphans.iter_mut() {
            visit_element_claims_mut(orphan, &mut release);
        }
    }

    fn reindex(&mut self) {
        self.index = CaseIndex::build(&self.case);
    }
}

fn check_evidence_pair(evidence: ElementKey, claim: ElementKey) -> Result<(), TreeError> {
    if evidence.kind == ElementKind::Evidence && claim.kind == ElementKind::PropertyClaim {
        Ok(())
    } else {
        Err(TreeError::InvalidParent {
            child: evidence.kind,
            parent: claim.kind,
        })
    }
}

/// Push `element` into the matching collection of the node at `parent`
///
/// Sets the child's parent reference. Returns `false` if the path does not
/// resolve or the pair has no collection.
fn insert_child(case: &mut AssuranceCase, parent: &ElementPath, element: Element) -> bool {
    match (case.resolve_mut(parent), element) {
        (Some(NodeMut::Goal(goal)), Element::Context(mut context)) => {
            context.goal_id = Some(goal.id);
            goal.context.push(context);
        }
        (Some(NodeMut::Goal(goal)), Element::Strategy(mut strategy)) => {
            strategy.goal_id = Some(goal.id);
            goal.strategies.push(strategy);
        }
        (Some(NodeMut::Goal(goal)), Element::PropertyClaim(mut claim)) => {
            claim.parent = Some(ClaimParent::Goal(goal.id));
            goal.property_claims.push(claim);
        }
        (Some(NodeMut::Strategy(strategy)), Element::PropertyClaim(mut claim)) => {
            claim.parent = Some(ClaimParent::Strategy(strategy.id));
            strategy.property_claims.push(claim);
        }
        (Some(NodeMut::Claim(owner)), Element::PropertyClaim(mut claim)) => {
            claim.parent = Some(ClaimParent::PropertyClaim(owner.id));
            owner.property_claims.push(claim);
        }
        (Some(NodeMut::Claim(owner)), Element::Evidence(mut evidence)) => {
            evidence.link(owner.id);
            owner.evidence.push(evidence);
        }
        _ => return false,
    }
    true
}

/// Remove and return the element at `path`
fn take_at(case: &mut AssuranceCase, path: &ElementPath) -> Option<Element> {
    fn take<T>(items: &mut Vec<T>, i: usize) -> Option<T> {
        (i < items.len()).then(|| items.remove(i))
    }

    let step = path.last()?;
    let parent = path.parent()?;
    match (case.resolve_mut(&parent)?, step) {
        (NodeMut::Goal(goal), PathStep::Context(i)) => take(&mut goal.context, i).map(Element::Context),
        (NodeMut::Goal(goal), PathStep::Strategy(i)) => {
            take(&mut goal.strategies, i).map(Element::Strategy)
        }
        (NodeMut::Goal(goal), PathStep::Claim(i)) => {
            take(&mut goal.property_claims, i).map(Element::PropertyClaim)
        }
        (NodeMut::Strategy(strategy), PathStep::Claim(i)) => {
            take(&mut strategy.property_claims, i).map(Element::PropertyClaim)
        }
        (NodeMut::Claim(claim), PathStep::Claim(i)) => {
            take(&mut claim.property_claims, i).map(Element::PropertyClaim)
        }
        (NodeMut::Claim(claim), PathStep::Evidence(i)) => {
            take(&mut claim.evidence, i).map(Element::Evidence)
        }
        _ => None,
    }
}

/// Direct children of a removed element
fn children_of(element: Element) -> Vec<Element> {
    match element {
        Element::Context(_) | Element::Evidence(_) => Vec::new(),
        Element::Strategy(strategy) => strategy
            .property_claims
            .into_iter()
            .map(Element::PropertyClaim)
            .collect(),
        Element::PropertyClaim(claim) => claim
            .property_claims
            .into_iter()
            .map(Element::PropertyClaim)
            .chain(claim.evidence.into_iter().map(Element::Evidence))
            .collect(),
    }
}

fn visit_claims_mut<F: FnMut(&mut PropertyClaim)>(claims: &mut [PropertyClaim], f: &mut F) {
    for claim in claims {
        f(claim);
        visit_claims_mut(&mut claim.property_claims, f);
    }
}

fn visit_case_claims_mut<F: FnMut(&mut PropertyClaim)>(case: &mut AssuranceCase, f: &mut F) {
    for goal in &mut case.goals {
        for strategy in &mut goal.strategies {
            visit_claims_mut(&mut strategy.property_claims, f);
        }
        visit_claims_mut(&mut goal.property_claims, f);
    }
}

fn visit_element_claims_mut<F: FnMut(&mut PropertyClaim)>(element: &mut Element, f: &mut F) {
    match element {
        Element::Strategy(strategy) => visit_claims_mut(&mut strategy.property_claims, f),
        Element::PropertyClaim(claim) => visit_claims_mut(std::slice::from_mut(claim), f),
        Element::Context(_) | Element::Evidence(_) => {}
    }
}

/// Claim ids and evidence ids inside a subtree
fn element_members(element: &Element) -> (HashSet<ElementId>, HashSet<ElementId>) {
    split_members(element.subtree_keys())
}

fn goal_members(goal: &Goal) -> (HashSet<ElementId>, HashSet<ElementId>) {
    split_members(goal.subtree_keys())
}

fn split_members(keys: Vec<ElementKey>) -> (HashSet<ElementId>, HashSet<ElementId>) {
    let mut claims = HashSet::new();
    let mut evidence = HashSet::new();
    for key in keys {
        match key.kind {
            ElementKind::PropertyClaim => {
                claims.insert(key.id);
            }
            ElementKind::Evidence => {
                evidence.insert(key.id);
            }
            _ => {}
        }
    }
    (claims, evidence)
}

/// Visit every copy of evidence `id` listed under a claim of an orphan subtree
fn nested_orphan_evidence_mut<F: FnMut(&mut Evidence)>(orphans: &mut OrphanSet, id: ElementId, f: &mut F) {
    for orphan in orphans.iter_mut() {
        visit_element_claims_mut(orphan, &mut |claim| {
            for item in claim.evidence.iter_mut().filter(|e| e.id == id) {
                f(item);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assure_model::{Context, Strategy};
    use pretty_assertions::assert_eq;

    /// G1 ─┬ C1
    ///     ├ S1 ── P1 ─┬ P2 ── E1
    ///     │           └ E2
    ///     └ P3 ── E1 (shared)
    fn snapshot() -> CaseSnapshot {
        let mut goal = Goal::new(1, "G1");
        let mut context = Context::new(1, "C1");
        context.goal_id = Some(goal.id);
        goal.context.push(context);
        let mut strategy = Strategy::new(1, "S1");
        strategy.goal_id = Some(goal.id);
        goal.strategies.push(
            strategy.with_claim(
                PropertyClaim::new(1, "P1")
                    .with_claim(PropertyClaim::new(2, "P2").with_evidence(Evidence::new(1, "E1")))
                    .with_evidence(Evidence::new(2, "E2")),
            ),
        );
        let mut p3 = PropertyClaim::new(3, "P3").with_evidence(Evidence::new(1, "E1"));
        p3.parent = Some(ClaimParent::Goal(goal.id));
        goal.property_claims.push(p3);
        let mut case = AssuranceCase::new(1, "case").with_goal(goal);
        // shared evidence lists both claims
        let both = vec![ElementId(2), ElementId(3)];
        case.find_claim_mut(ElementId(2)).unwrap().evidence[0].property_claim_id = both.clone();
        case.find_claim_mut(ElementId(3)).unwrap().evidence[0].property_claim_id = both;
        CaseSnapshot::new(case)
    }

    #[test]
    fn attach_evidence_to_nested_claim() {
        let snap = snapshot();
        let next = snap
            .attach(Evidence::new(9, "E9").into(), ElementKey::claim(2))
            .unwrap();

        let claim = next.case().find_claim(ElementId(2)).unwrap();
        assert_eq!(claim.evidence.len(), 2);
        assert_eq!(claim.evidence[1].property_claim_id, vec![ElementId(2)]);
        assert!(!snap.is_attached(&ElementKey::evidence(9)));
    }

    #[test]
    fn attach_to_missing_parent_is_not_found() {
        let err = snapshot()
            .attach(PropertyClaim::new(7, "P7").into(), ElementKey::strategy(99))
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::ParentNotFound {
                child: ElementKey::claim(7),
                parent: ElementKey::strategy(99),
            }
        );
    }

    #[test]
    fn attach_rejects_incompatible_parent() {
        let err = snapshot()
            .attach(Evidence::new(9, "E9").into(), ElementKey::strategy(1))
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidParent { .. }));
    }

    #[test]
    fn attach_rejects_duplicate() {
        let err = snapshot()
            .attach(PropertyClaim::new(3, "P3").into(), ElementKey::goal(1))
            .unwrap_err();
        assert_eq!(err, TreeError::AlreadyAttached { key: ElementKey::claim(3) });
    }

    #[test]
    fn detach_keeps_subtree_and_orphans_it() {
        let snap = snapshot();
        let next = snap.detach(ElementKey::claim(1)).unwrap();

        assert!(!next.is_attached(&ElementKey::claim(1)));
        assert!(!next.is_attached(&ElementKey::claim(2)));
        assert!(!next.is_attached(&ElementKey::evidence(2)));
        assert!(next.is_orphan(&ElementKey::claim(1)));

        let Some(Element::PropertyClaim(orphan)) = next.orphans().get(&ElementKey::claim(1)) else {
            panic!("expected claim orphan");
        };
        assert_eq!(orphan.parent, None);
        assert_eq!(orphan.property_claims[0].id, ElementId(2));
        assert_eq!(orphan.evidence[0].id, ElementId(2));
    }

    #[test]
    fn detach_keeps_shared_evidence_on_both_sides() {
        let next = snapshot().detach(ElementKey::claim(1)).unwrap();
        let both = vec![ElementId(2), ElementId(3)];

        let p3 = next.case().find_claim(ElementId(3)).unwrap();
        assert_eq!(p3.evidence[0].property_claim_id, both);
        let Some(Element::PropertyClaim(orphan)) = next.orphans().get(&ElementKey::claim(1)) else {
            panic!("expected claim orphan");
        };
        assert_eq!(orphan.property_claims[0].evidence[0].id, ElementId(1));
        assert_eq!(orphan.property_claims[0].evidence[0].property_claim_id, both);
        assert!(next.check_partition().is_ok());
    }

    #[test]
    fn detach_then_attach_restores_shared_evidence() {
        let snap = snapshot();
        let detached = snap.detach(ElementKey::claim(1)).unwrap();
        let orphan = detached.orphans().get(&ElementKey::claim(1)).cloned().unwrap();
        let restored = detached.attach(orphan, ElementKey::strategy(1)).unwrap();

        assert_eq!(restored.case(), snap.case());
        assert!(restored.orphans().is_empty());
        assert_eq!(restored.index().paths(&ElementKey::evidence(1)).len(), 2);
    }

    #[test]
    fn detach_goal_is_rejected() {
        assert_eq!(
            snapshot().detach(ElementKey::goal(1)).unwrap_err(),
            TreeError::RootElement { key: ElementKey::goal(1) }
        );
    }

    #[test]
    fn detach_then_attach_restores_tree() {
        let snap = snapshot();
        let detached = snap.detach(ElementKey::context(1)).unwrap();
        let orphan = detached.orphans().get(&ElementKey::context(1)).cloned().unwrap();
        let restored = detached.attach(orphan, ElementKey::goal(1)).unwrap();

        assert_eq!(restored.case(), snap.case());
        assert!(restored.orphans().is_empty());
    }

    #[test]
    fn move_claim_between_parents() {
        let next = snapshot()
            .move_element(ElementKey::claim(2), ElementKey::claim(3))
            .unwrap();
        let p3 = next.case().find_claim(ElementId(3)).unwrap();
        assert_eq!(p3.property_claims[0].id, ElementId(2));
        assert_eq!(p3.property_claims[0].parent, Some(ClaimParent::PropertyClaim(ElementId(3))));
        assert!(next.orphans().is_empty());
        assert!(next.index().duplicates().is_empty());
    }

    #[test]
    fn move_keeps_shared_evidence_links() {
        let snap = snapshot();
        let next = snap
            .move_element(ElementKey::claim(1), ElementKey::goal(1))
            .unwrap();
        let both = vec![ElementId(2), ElementId(3)];

        let p2 = next.case().find_claim(ElementId(2)).unwrap();
        assert_eq!(p2.evidence.len(), 1);
        assert_eq!(p2.evidence[0].property_claim_id, both);
        let p3 = next.case().find_claim(ElementId(3)).unwrap();
        assert_eq!(p3.evidence[0].property_claim_id, both);

        let p1 = next.case().find_claim(ElementId(1)).unwrap();
        assert_eq!(p1.parent, Some(ClaimParent::Goal(ElementId(1))));
        let mut before = snap.element(&ElementKey::claim(1)).unwrap();
        let mut after = next.element(&ElementKey::claim(1)).unwrap();
        before.clear_parent();
        after.clear_parent();
        assert_eq!(after, before);
        assert!(next.check_partition().is_ok());
    }

    #[test]
    fn move_evidence_relocates_every_copy() {
        let next = snapshot()
            .move_element(ElementKey::evidence(1), ElementKey::claim(1))
            .unwrap();
        assert_eq!(next.index().paths(&ElementKey::evidence(1)).len(), 1);
        let p1 = next.case().find_claim(ElementId(1)).unwrap();
        let moved = p1.evidence.iter().find(|e| e.id == ElementId(1)).unwrap();
        assert_eq!(moved.property_claim_id, vec![ElementId(1)]);
    }

    #[test]
    fn moving_evidence_updates_copies_held_by_orphans() {
        let next = snapshot()
            .detach(ElementKey::claim(1))
            .and_then(|s| s.attach(PropertyClaim::new(4, "P4").into(), ElementKey::goal(1)))
            .and_then(|s| s.move_element(ElementKey::evidence(1), ElementKey::claim(4)))
            .unwrap();

        let Some(Element::PropertyClaim(orphan)) = next.orphans().get(&ElementKey::claim(1)) else {
            panic!("expected claim orphan");
        };
        assert_eq!(
            orphan.property_claims[0].evidence[0].property_claim_id,
            vec![ElementId(2), ElementId(4)]
        );
        assert!(next.check_partition().is_ok());
    }

    #[test]
    fn move_into_own_subtree_is_a_cycle() {
        let err = snapshot()
            .move_element(ElementKey::claim(1), ElementKey::claim(2))
            .unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
    }

    #[test]
    fn remove_cascade_and_orphan_children() {
        let snap = snapshot();

        let cascaded = snap.remove(ElementKey::claim(1), DeletePolicy::Cascade).unwrap();
        assert!(!cascaded.is_attached(&ElementKey::claim(2)));
        assert!(cascaded.orphans().is_empty());
        assert!(cascaded.is_attached(&ElementKey::evidence(1)));

        let orphaned = snap
            .remove(ElementKey::claim(1), DeletePolicy::OrphanChildren)
            .unwrap();
        assert!(orphaned.is_orphan(&ElementKey::claim(2)));
        assert!(orphaned.is_orphan(&ElementKey::evidence(2)));
        assert!(!orphaned.is_orphan(&ElementKey::claim(1)));
    }

    #[test]
    fn remove_releases_links_held_by_orphans() {
        let detached = snapshot().detach(ElementKey::claim(1)).unwrap();
        let next = detached.remove(ElementKey::claim(3), DeletePolicy::Cascade).unwrap();

        assert!(!next.is_attached(&ElementKey::evidence(1)));
        let Some(Element::PropertyClaim(orphan)) = next.orphans().get(&ElementKey::claim(1)) else {
            panic!("expected claim orphan");
        };
        assert_eq!(orphan.property_claims[0].evidence[0].property_claim_id, vec![ElementId(2)]);
        assert!(next.check_partition().is_ok());
    }

    #[test]
    fn orphaning_children_skips_evidence_still_listed() {
        let snap = snapshot()
            .link_evidence(ElementKey::evidence(2), ElementKey::claim(3))
            .unwrap();
        let next = snap.remove(ElementKey::claim(1), DeletePolicy::OrphanChildren).unwrap();

        // E2 stays under P3 only, without the deleted P1 link
        assert!(!next.is_orphan(&ElementKey::evidence(2)));
        let p3 = next.case().find_claim(ElementId(3)).unwrap();
        let e2 = p3.evidence.iter().find(|e| e.id == ElementId(2)).unwrap();
        assert_eq!(e2.property_claim_id, vec![ElementId(3)]);
        assert!(next.is_orphan(&ElementKey::claim(2)));
        assert!(next.check_partition().is_ok());
    }

    #[test]
    fn dropping_an_orphan_releases_its_links() {
        let detached = snapshot().detach(ElementKey::claim(1)).unwrap();
        let next = detached.retain_orphans(&[]);

        assert!(next.orphans().is_empty());
        let p3 = next.case().find_claim(ElementId(3)).unwrap();
        assert_eq!(p3.evidence[0].property_claim_id, vec![ElementId(3)]);
    }

    #[test]
    fn goal_deletion_requires_cascade() {
        let snap = snapshot();
        assert_eq!(
            snap.remove(ElementKey::goal(1), DeletePolicy::OrphanChildren).unwrap_err(),
            TreeError::RootDeletion { key: ElementKey::goal(1) }
        );
        let empty = snap.remove(ElementKey::goal(1), DeletePolicy::Cascade).unwrap();
        assert!(empty.case().goals.is_empty());
        assert!(empty.index().is_empty());
    }

    #[test]
    fn link_and_unlink_evidence() {
        let snap = snapshot();
        let linked = snap.link_evidence(ElementKey::evidence(2), ElementKey::claim(3)).unwrap();
        assert_eq!(linked.index().paths(&ElementKey::evidence(2)).len(), 2);
        for path in linked.index().paths(&ElementKey::evidence(2)) {
            let Some(NodeRef::Evidence(item)) = linked.case().resolve(path) else {
                panic!("expected evidence");
            };
            assert_eq!(item.property_claim_id, vec![ElementId(1), ElementId(3)]);
        }

        let once = linked.unlink_evidence(ElementKey::evidence(2), ElementKey::claim(1)).unwrap();
        assert_eq!(once.index().paths(&ElementKey::evidence(2)).len(), 1);
        let last = once.unlink_evidence(ElementKey::evidence(2), ElementKey::claim(3)).unwrap();
        assert!(last.is_orphan(&ElementKey::evidence(2)));
    }

    #[test]
    fn unlink_keeps_evidence_held_by_an_orphan_subtree() {
        let detached = snapshot().detach(ElementKey::claim(1)).unwrap();
        let next = detached
            .unlink_evidence(ElementKey::evidence(1), ElementKey::claim(3))
            .unwrap();

        assert!(!next.is_attached(&ElementKey::evidence(1)));
        assert!(!next.is_orphan(&ElementKey::evidence(1)));
        let Some(Element::PropertyClaim(orphan)) = next.orphans().get(&ElementKey::claim(1)) else {
            panic!("expected claim orphan");
        };
        assert_eq!(orphan.property_claims[0].evidence[0].property_claim_id, vec![ElementId(2)]);
    }

    #[test]
    fn reattach_evidence_also_held_by_an_orphan_subtree() {
        let snap = snapshot()
            .detach(ElementKey::claim(1))
            .and_then(|s| s.detach(ElementKey::evidence(1)))
            .unwrap();
        assert!(snap.is_orphan(&ElementKey::evidence(1)));

        let orphan = snap.orphans().get(&ElementKey::evidence(1)).cloned().unwrap();
        let next = snap.attach(orphan, ElementKey::claim(3)).unwrap();
        assert!(next.is_attached(&ElementKey::evidence(1)));
        assert!(next.is_orphan(&ElementKey::claim(1)));
        assert!(next.check_partition().is_ok());
    }

    #[test]
    fn attach_absorbs_loose_evidence_orphan() {
        let snap = snapshot().detach(ElementKey::context(1)).unwrap();
        let (case, mut orphans) = snap.into_parts();
        orphans.insert(Evidence::new(9, "E9").into());
        let snap = CaseSnapshot::from_parts(case, orphans);

        let claim = PropertyClaim::new(8, "P8").with_evidence(Evidence::new(9, "E9"));
        let next = snap.attach(claim.into(), ElementKey::goal(1)).unwrap();
        assert!(next.is_attached(&ElementKey::evidence(9)));
        assert!(!next.is_orphan(&ElementKey::evidence(9)));
        assert!(next.is_orphan(&ElementKey::context(1)));
        assert!(next.check_partition().is_ok());
    }

    #[test]
    fn update_touches_every_copy() {
        let patch = ElementPatch::rename("Shared").with_url("https://example.org");
        let next = snapshot().update_element(ElementKey::evidence(1), &patch).unwrap();
        for path in next.index().paths(&ElementKey::evidence(1)) {
            let node = next.case().resolve(path).unwrap();
            assert_eq!(node.info().name, "Shared");
        }

        let detached = snapshot().detach(ElementKey::claim(1)).unwrap();
        let next = detached.update_element(ElementKey::evidence(1), &patch).unwrap();
        let Some(Element::PropertyClaim(orphan)) = next.orphans().get(&ElementKey::claim(1)) else {
            panic!("expected claim orphan");
        };
        let held = &orphan.property_claims[0].evidence[0];
        assert_eq!(held.info.name, "Shared");
        assert_eq!(held.url.as_deref(), Some("https://example.org"));

        let err = snapshot()
            .update_element(ElementKey::claim(1), &ElementPatch::default().with_url("x"))
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidPatch { .. }));
    }

    #[test]
    fn snapshot_serde_rebuilds_index() {
        let snap = snapshot().detach(ElementKey::context(1)).unwrap();
        let json = serde_json::to_string(&snap).unwrap();
        let back: CaseSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
