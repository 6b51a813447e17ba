//! Display names for new elements
//!
//! Names are a kind prefix (`G`, `C`, `S`, `P`, `E`) followed by a number.
//! A new element gets one more than the largest number already used by its
//! kind anywhere in the snapshot, orphans included.

use crate::snapshot::CaseSnapshot;
use assure_model::{Element, ElementKind, PropertyClaim};

/// Number in `name` if it is `prefix` followed by digits only
#[must_use]
pub fn name_number(prefix: char, name: &str) -> Option<u64> {
    let digits = name.trim().strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl CaseSnapshot {
    /// Next free display name for `kind`
    #[must_use]
    pub fn next_element_name(&self, kind: ElementKind) -> String {
        let prefix = kind.name_prefix();
        let mut highest = 0;
        let mut consider = |element_kind: ElementKind, name: &str| {
            if element_kind == kind {
                if let Some(n) = name_number(prefix, name) {
                    highest = highest.max(n);
                }
            }
        };

        for key in self.index().keys() {
            if let Some(node) = self.locate(key) {
                consider(key.kind, &node.info().name);
            }
        }
        for orphan in self.orphans().iter() {
            visit_names(orphan, &mut consider);
        }

        format!("{prefix}{}", highest + 1)
    }
}

fn visit_names<F: FnMut(ElementKind, &str)>(element: &Element, f: &mut F) {
    match element {
        Element::Context(_) | Element::Evidence(_) => f(element.kind(), &element.info().name),
        Element::Strategy(strategy) => {
            f(ElementKind::Strategy, &strategy.info.name);
            visit_claim_names(&strategy.property_claims, f);
        }
        Element::PropertyClaim(claim) => visit_claim_names(std::slice::from_ref(claim), f),
    }
}

fn visit_claim_names<F: FnMut(ElementKind, &str)>(claims: &[PropertyClaim], f: &mut F) {
    for claim in claims {
        f(ElementKind::PropertyClaim, &claim.info.name);
        visit_claim_names(&claim.property_claims, f);
        for evidence in &claim.evidence {
            f(ElementKind::Evidence, &evidence.info.name);
        }
    }
}
