//! Attribute patches and collaborator patch payloads

use assure_model::{ElementInfo, ElementKey, ElementKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// In-place edit of an element's descriptive attributes
///
/// `None` fields are left untouched. `url` only applies to evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ElementPatch {
    /// Patch renaming the element
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the short description, returning self
    #[must_use]
    pub fn with_short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = Some(text.into());
        self
    }

    /// Set the long description, returning self
    #[must_use]
    pub fn with_long_description(mut self, text: impl Into<String>) -> Self {
        self.long_description = Some(text.into());
        self
    }

    /// Set the evidence URL, returning self
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Check if the patch changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.short_description.is_none()
            && self.long_description.is_none()
            && self.url.is_none()
    }

    /// Apply the descriptive fields to `info`
    pub fn apply(&self, info: &mut ElementInfo) {
        if let Some(name) = &self.name {
            info.name.clone_from(name);
        }
        if let Some(text) = &self.short_description {
            info.short_description.clone_from(text);
        }
        if let Some(text) = &self.long_description {
            info.long_description.clone_from(text);
        }
    }

    /// JSON body for the collaborator's `update`
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Collaborator patch that re-parents `child` under `parent`
///
/// With `parent = None` every parent field is nulled, which is how a detach
/// is persisted. Claims carry one field per possible parent kind and all
/// but the chosen one are cleared.
#[must_use]
pub fn parent_patch(child: ElementKind, parent: Option<ElementKey>) -> Value {
    let id_of = |kind: ElementKind| {
        parent
            .filter(|p| p.kind == kind)
            .map_or(Value::Null, |p| json!(p.id))
    };
    match child {
        ElementKind::Goal => json!({}),
        ElementKind::Context | ElementKind::Strategy => json!({ "goal_id": id_of(ElementKind::Goal) }),
        ElementKind::PropertyClaim => json!({
            "goal_id": id_of(ElementKind::Goal),
            "strategy_id": id_of(ElementKind::Strategy),
            "property_claim_id": id_of(ElementKind::PropertyClaim),
        }),
        ElementKind::Evidence => {
            let ids: Vec<_> = parent
                .filter(|p| p.kind == ElementKind::PropertyClaim)
                .map(|p| p.id)
                .into_iter()
                .collect();
            json!({ "property_claim_id": ids })
        }
    }
}
