//! Partition checker
//!
//! Verifies that every element sits in exactly one place: placed once in
//! the tree, or held once in the orphan set. Shared evidence is allowed
//! under several claims as long as each holding claim in the tree is listed
//! in the evidence's `property_claim_id`. A copy nested in an orphan subtree
//! may share its key with tree copies; an evidence orphan root may not.

use crate::snapshot::CaseSnapshot;
use assure_model::{ClaimParent, ElementKey, ElementKind, ElementPath, NodeRef};
use std::collections::HashSet;
use std::fmt;

/// A single breach of the partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionViolation {
    /// Non-evidence element placed more than once
    DuplicatePlacement { key: ElementKey, paths: Vec<ElementPath> },
    /// Element is both in the tree and in the orphan set (as a root, or
    /// nested when it is not evidence)
    InTreeAndOrphaned { key: ElementKey },
    /// Element is held by more than one orphan subtree
    OrphanDuplicate { key: ElementKey },
    /// Recorded parent reference disagrees with the actual placement
    DanglingParent {
        key: ElementKey,
        recorded: Option<ElementKey>,
        placed_under: ElementKey,
    },
    /// Evidence sits under a claim it does not list
    EvidenceLinkMismatch { key: ElementKey, claim: ElementKey },
    /// Known element is neither placed nor orphaned
    Missing { key: ElementKey },
}

impl fmt::Display for PartitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePlacement { key, paths } => {
                let paths: Vec<_> = paths.iter().map(ToString::to_string).collect();
                write!(f, "{key} placed {} times ({})", paths.len(), paths.join(", "))
            }
            Self::InTreeAndOrphaned { key } => write!(f, "{key} is in the tree and the orphan set"),
            Self::OrphanDuplicate { key } => write!(f, "{key} is held by several orphans"),
            Self::DanglingParent {
                key,
                recorded: Some(recorded),
                placed_under,
            } => write!(f, "{key} records parent {recorded} but sits under {placed_under}"),
            Self::DanglingParent {
                key,
                recorded: None,
                placed_under,
            } => write!(f, "{key} records no parent but sits under {placed_under}"),
            Self::EvidenceLinkMismatch { key, claim } => {
                write!(f, "{key} sits under {claim} without linking to it")
            }
            Self::Missing { key } => write!(f, "{key} is neither attached nor orphaned"),
        }
    }
}

/// Every violation found in one check
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} partition violation(s): {}", .violations.len(), summary(.violations))]
pub struct PartitionReport {
    pub violations: Vec<PartitionViolation>,
}

fn summary(violations: &[PartitionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PartitionReport {
    /// Check if no violation was found
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl CaseSnapshot {
    /// Collect every partition violation
    #[must_use]
    pub fn partition_report(&self) -> PartitionReport {
        let mut violations: Vec<_> = self
            .index()
            .duplicates()
            .into_iter()
            .map(|(key, paths)| PartitionViolation::DuplicatePlacement {
                key,
                paths: paths.to_vec(),
            })
            .collect();

        let roots: HashSet<ElementKey> = self.orphans().keys().copied().collect();
        let mut reported = HashSet::new();
        let mut held = HashSet::new();
        for key in self.orphans().all_keys() {
            let nested_evidence = key.kind == ElementKind::Evidence && !roots.contains(&key);
            // one evidence item may appear under several claims of orphan subtrees
            if !held.insert(key) && key.kind != ElementKind::Evidence {
                violations.push(PartitionViolation::OrphanDuplicate { key });
            }
            if self.index().contains(&key) && !nested_evidence && !reported.contains(&key) {
                violations.push(PartitionViolation::InTreeAndOrphaned { key });
                reported.insert(key);
            }
        }

        for placement in self.elements() {
            let Some(parent) = placement.parent else {
                continue;
            };
            let recorded = match self.case().resolve(&placement.path) {
                Some(NodeRef::Evidence(item)) => {
                    if !item.is_linked_to(parent.id) {
                        violations.push(PartitionViolation::EvidenceLinkMismatch {
                            key: placement.key,
                            claim: parent,
                        });
                    }
                    continue;
                }
                Some(NodeRef::Context(context)) => context.goal_id.map(ElementKey::goal_from),
                Some(NodeRef::Strategy(strategy)) => strategy.goal_id.map(ElementKey::goal_from),
                Some(NodeRef::Claim(claim)) => claim.parent.map(ClaimParent::key),
                Some(NodeRef::Goal(_)) | None => continue,
            };
            if recorded != Some(parent) {
                violations.push(PartitionViolation::DanglingParent {
                    key: placement.key,
                    recorded,
                    placed_under: parent,
                });
            }
        }

        PartitionReport { violations }
    }

    /// Check the partition invariant
    ///
    /// # Errors
    ///
    /// Returns the full [`PartitionReport`] if any violation is found.
    pub fn check_partition(&self) -> Result<(), PartitionReport> {
        self.partition_report().into_result()
    }

    /// Check the partition invariant and that every key in `universe` is
    /// accounted for
    ///
    /// # Errors
    ///
    /// Returns the full [`PartitionReport`] if any violation is found.
    pub fn check_partition_against<I>(&self, universe: I) -> Result<(), PartitionReport>
    where
        I: IntoIterator<Item = ElementKey>,
    {
        let mut report = self.partition_report();
        let held: HashSet<_> = self.orphans().all_keys().into_iter().collect();
        report.violations.extend(
            universe
                .into_iter()
                .filter(|key| !self.is_attached(key) && !held.contains(key))
                .map(|key| PartitionViolation::Missing { key }),
        );
        report.into_result()
    }
}
