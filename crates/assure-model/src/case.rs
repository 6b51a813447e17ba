//! The assurance case aggregate

use crate::element::{Goal, PropertyClaim, Strategy};
use crate::id::ElementId;
use serde::{Deserialize, Serialize};

/// Access level the current user holds on a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only
    #[default]
    View,
    /// May comment, not edit
    Review,
    /// Full edit rights
    Manage,
}

impl Permission {
    /// Structural and attribute edits allowed
    #[inline]
    #[must_use]
    pub fn can_edit(self) -> bool {
        self == Permission::Manage
    }

    /// Comments allowed
    #[inline]
    #[must_use]
    pub fn can_review(self) -> bool {
        self >= Permission::Review
    }
}

/// Root aggregate: one or more goals plus case-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssuranceCase {
    pub id: ElementId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Permission,
    /// Edit-lock token held by the current session, if any
    #[serde(default)]
    pub lock_uuid: Option<String>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl AssuranceCase {
    /// Create an empty case the current user can manage
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            name: name.into(),
            description: String::new(),
            permissions: Permission::Manage,
            lock_uuid: None,
            goals: Vec::new(),
        }
    }

    /// Set permissions, returning self
    #[must_use]
    pub fn with_permissions(mut self, permissions: Permission) -> Self {
        self.permissions = permissions;
        self
    }

    /// Add a goal, returning self
    #[must_use]
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    /// First goal; most editors only ever show this one
    #[inline]
    #[must_use]
    pub fn primary_goal(&self) -> Option<&Goal> {
        self.goals.first()
    }

    /// Goal by id
    #[must_use]
    pub fn goal(&self, id: ElementId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Mutable goal by id
    #[must_use]
    pub fn goal_mut(&mut self, id: ElementId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }

    /// Strategy by id, searching every goal
    #[must_use]
    pub fn strategy_mut(&mut self, id: ElementId) -> Option<&mut Strategy> {
        self.goals.iter_mut().find_map(|g| g.strategy_mut(id))
    }

    /// Claim by id, searching every goal depth-first
    #[must_use]
    pub fn find_claim(&self, id: ElementId) -> Option<&PropertyClaim> {
        self.goals.iter().find_map(|g| g.find_claim(id))
    }

    /// Mutable claim by id, searching every goal depth-first
    #[must_use]
    pub fn find_claim_mut(&mut self, id: ElementId) -> Option<&mut PropertyClaim> {
        self.goals.iter_mut().find_map(|g| g.find_claim_mut(id))
    }
}
