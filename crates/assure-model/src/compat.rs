//! Type-compatibility tables
//!
//! [`orphan_targets`] decides which orphans are offered while a node is
//! being edited and matches the backend exactly. [`can_attach`] is the
//! structural table: which collection a child can actually be inserted into.

use crate::id::ElementKind;

const ALL_ORPHANS: &[ElementKind] = &[
    ElementKind::Context,
    ElementKind::Strategy,
    ElementKind::PropertyClaim,
    ElementKind::Evidence,
];

const CLAIM_ONLY: &[ElementKind] = &[ElementKind::PropertyClaim];

const CLAIM_AND_EVIDENCE: &[ElementKind] = &[ElementKind::PropertyClaim, ElementKind::Evidence];

/// Orphan kinds a node of `kind` accepts
///
/// Goal accepts all four, Strategy accepts claims, a claim accepts claims
/// and evidence. Context and Evidence have no children.
#[must_use]
pub fn orphan_targets(kind: ElementKind) -> &'static [ElementKind] {
    match kind {
        ElementKind::Goal => ALL_ORPHANS,
        ElementKind::Strategy => CLAIM_ONLY,
        ElementKind::PropertyClaim => CLAIM_AND_EVIDENCE,
        ElementKind::Context | ElementKind::Evidence => &[],
    }
}

/// Orphan kinds offered while editing a node whose type name is `node_type`
///
/// Unrecognised type names, and node types that cannot hold children, fall
/// back to offering every orphan.
#[must_use]
pub fn orphan_filter_for(node_type: &str) -> &'static [ElementKind] {
    match node_type.parse::<ElementKind>() {
        Ok(kind @ (ElementKind::Goal | ElementKind::Strategy | ElementKind::PropertyClaim)) => {
            orphan_targets(kind)
        }
        _ => ALL_ORPHANS,
    }
}

/// Whether a `child` can be inserted under a `parent`
#[must_use]
pub fn can_attach(child: ElementKind, parent: ElementKind) -> bool {
    matches!(
        (child, parent),
        (
            ElementKind::Context | ElementKind::Strategy | ElementKind::PropertyClaim,
            ElementKind::Goal
        ) | (ElementKind::PropertyClaim, ElementKind::Strategy | ElementKind::PropertyClaim)
            | (ElementKind::Evidence, ElementKind::PropertyClaim)
    )
}

/// Child kinds a parent can structurally hold
#[must_use]
pub fn child_kinds(parent: ElementKind) -> Vec<ElementKind> {
    ElementKind::DETACHABLE
        .into_iter()
        .filter(|child| can_attach(*child, parent))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orphan_table_matches_backend() {
        assert_eq!(orphan_targets(ElementKind::Goal).len(), 4);
        assert_eq!(orphan_targets(ElementKind::Strategy), &[ElementKind::PropertyClaim]);
        assert_eq!(
            orphan_targets(ElementKind::PropertyClaim),
            &[ElementKind::PropertyClaim, ElementKind::Evidence]
        );
        assert!(orphan_targets(ElementKind::Context).is_empty());
        assert!(orphan_targets(ElementKind::Evidence).is_empty());
    }

    #[test]
    fn unknown_node_type_accepts_everything() {
        assert_eq!(orphan_filter_for("assumption"), ALL_ORPHANS);
        assert_eq!(orphan_filter_for(""), ALL_ORPHANS);
        assert_eq!(orphan_filter_for("context"), ALL_ORPHANS);
        assert_eq!(orphan_filter_for("strategy"), CLAIM_ONLY);
        assert_eq!(orphan_filter_for("propertyclaim"), CLAIM_AND_EVIDENCE);
    }

    #[test]
    fn structural_table() {
        assert!(can_attach(ElementKind::Context, ElementKind::Goal));
        assert!(can_attach(ElementKind::PropertyClaim, ElementKind::PropertyClaim));
        assert!(can_attach(ElementKind::Evidence, ElementKind::PropertyClaim));
        assert!(!can_attach(ElementKind::Evidence, ElementKind::Goal));
        assert!(!can_attach(ElementKind::Evidence, ElementKind::Strategy));
        assert!(!can_attach(ElementKind::Context, ElementKind::Strategy));
        assert!(!can_attach(ElementKind::Goal, ElementKind::Goal));
        assert!(child_kinds(ElementKind::Context).is_empty());
        assert_eq!(
            child_kinds(ElementKind::Goal),
            vec![ElementKind::Context, ElementKind::Strategy, ElementKind::PropertyClaim]
        );
    }
}
