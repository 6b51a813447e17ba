//! Assurance-case tree engine
//!
//! Structural operations over an assurance case and its orphan set.
//!
//! # Overview
//!
//! - **CaseSnapshot**: pure attach / detach / move / delete over a case and
//!   its orphans, returning a new snapshot or an error with the input intact
//! - **CaseIndex**: key → path index rebuilt after each structural change
//! - **Partition checker**: every element placed once or orphaned once
//! - **CaseEditor**: async editor that persists through a [`CaseStore`]
//!   before committing anything in memory
//!
//! # Example
//!
//! ```rust
//! use assure_model::{AssuranceCase, ElementKey, Goal, PropertyClaim, Strategy};
//! use assure_tree::CaseSnapshot;
//!
//! let snapshot = CaseSnapshot::new(AssuranceCase::new(1, "Demo"))
//!     .insert_goal(Goal::new(1, "G1"))
//!     .and_then(|s| s.attach(Strategy::new(2, "S1").into(), ElementKey::goal(1)))
//!     .and_then(|s| s.attach(PropertyClaim::new(3, "P1").into(), ElementKey::strategy(2)))
//!     .unwrap();
//!
//! let detached = snapshot.detach(ElementKey::strategy(2)).unwrap();
//! assert!(detached.is_orphan(&ElementKey::strategy(2)));
//! assert!(!detached.is_attached(&ElementKey::claim(3)));
//! assert!(detached.check_partition().is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod editor;
pub mod error;
pub mod index;
pub mod naming;
pub mod partition;
pub mod patch;
pub mod snapshot;
pub mod store;

// Re-exports
pub use editor::{BatchFailure, BatchOutcome, CaseEditor};
pub use error::{EditorError, ErrorCategory, TreeError};
pub use index::{CaseIndex, Placement};
pub use naming::name_number;
pub use partition::{PartitionReport, PartitionViolation};
pub use patch::{parent_patch, ElementPatch};
pub use snapshot::{CaseSnapshot, DeletePolicy};
pub use store::{AuthToken, CaseStore, NewElement, StoreError, StoreOp};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for tree editing
    pub use crate::{
        AuthToken, BatchOutcome, CaseEditor, CaseSnapshot, CaseStore, DeletePolicy, EditorError,
        ElementPatch, NewElement, StoreError, TreeError,
    };
    pub use assure_model::{Element, ElementKey, ElementKind};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
