//! Testing utilities for the assure workspace
//!
//! Shared case fixtures and an in-memory [`MemoryStore`] standing in for
//! the REST backend.

#![allow(missing_docs)]

mod store;

pub use store::{MemoryStore, StoreCall};

use assure_model::{AssuranceCase, Context, Element, ElementKey, Evidence, Goal, OrphanSet, PropertyClaim, Strategy};
use assure_tree::CaseSnapshot;

/// Empty case with goal `G1` (id 1)
pub fn single_goal() -> CaseSnapshot {
    CaseSnapshot::new(AssuranceCase::new(1, "Test case"))
        .insert_goal(Goal::new(1, "G1"))
        .unwrap()
}

/// A small consistent case
///
/// ```text
/// G1 ─┬ C1
///     ├ S1 ── P1 ── P2 ── E1
///     └ P3 ── E1 (shared with P2)
/// ```
pub fn sample_case() -> CaseSnapshot {
    single_goal()
        .attach(Context::new(1, "C1").into(), ElementKey::goal(1))
        .and_then(|s| s.attach(Strategy::new(1, "S1").into(), ElementKey::goal(1)))
        .and_then(|s| s.attach(PropertyClaim::new(1, "P1").into(), ElementKey::strategy(1)))
        .and_then(|s| s.attach(PropertyClaim::new(2, "P2").into(), ElementKey::claim(1)))
        .and_then(|s| s.attach(Evidence::new(1, "E1").into(), ElementKey::claim(2)))
        .and_then(|s| s.attach(PropertyClaim::new(3, "P3").into(), ElementKey::goal(1)))
        .and_then(|s| s.link_evidence(ElementKey::evidence(1), ElementKey::claim(3)))
        .unwrap()
}

/// Contexts with the given ids, as orphans
pub fn orphan_contexts(ids: &[u64]) -> OrphanSet {
    ids.iter()
        .map(|id| Element::from(Context::new(*id, format!("C{id}"))))
        .collect()
}

/// `single_goal()` plus the given orphan contexts
pub fn goal_with_orphans(ids: &[u64]) -> CaseSnapshot {
    let (case, _) = single_goal().into_parts();
    CaseSnapshot::from_parts(case, orphan_contexts(ids))
}

/// Every key placed in the tree or held in the orphan set
pub fn all_keys(snapshot: &CaseSnapshot) -> Vec<ElementKey> {
    let mut keys: Vec<_> = snapshot.index().keys().copied().collect();
    keys.extend(snapshot.orphans().all_keys());
    keys
}

/// Assert the partition invariant, printing every violation on failure
pub fn assert_partition(snapshot: &CaseSnapshot) {
    if let Err(report) = snapshot.check_partition() {
        panic!("partition violated: {report}");
    }
}
