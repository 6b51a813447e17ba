//! Assurance-case model
//!
//! Typed data for hierarchical argument trees
//! (Goal → Context / Strategy / PropertyClaim → Evidence).
//!
//! # Core Concepts
//!
//! - [`AssuranceCase`]: root aggregate holding one or more [`Goal`]s
//! - [`Element`]: any detachable element (context, strategy, claim, evidence)
//! - [`ClaimParent`]: the single parent of a claim, as a tagged union
//! - [`ElementKey`]: `(kind, id)` address used across tree and orphan set
//! - [`OrphanSet`]: detached elements awaiting reattachment or deletion
//! - [`ElementPath`]: position of an element in the nested collections
//!
//! # Example
//!
//! ```rust
//! use assure_model::{AssuranceCase, ElementKey, Goal, OrphanSet, Strategy};
//!
//! let mut goal = Goal::new(1, "G1");
//! goal.strategies.push(Strategy::new(2, "S1"));
//! let case = AssuranceCase::new(10, "Demo").with_goal(goal);
//!
//! let node = case.resolve(&"g0.s0".parse().unwrap()).unwrap();
//! assert_eq!(node.key(), ElementKey::strategy(2));
//! assert!(OrphanSet::new().filter_for_node("strategy").is_empty());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod case;
mod element;
mod error;
mod id;
mod orphan;
mod path;

/// Type-compatibility tables
pub mod compat;

// Re-exports
pub use case::{AssuranceCase, Permission};
pub use element::{
    ClaimParent, Context, Element, ElementInfo, Evidence, Goal, PropertyClaim, Strategy,
};
pub use error::ModelError;
pub use id::{ElementId, ElementKey, ElementKind, PreviewId};
pub use orphan::OrphanSet;
pub use path::{ElementPath, NodeMut, NodeRef, PathError, PathStep};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
