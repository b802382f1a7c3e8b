//! Role/condition based permission evaluation.
//!
//! Roles grant `(resource, action, condition?)` triples. Evaluation folds
//! every grant of every role held by a principal into a single [`Decision`],
//! which is then checked against a concrete record owner.
//!
//! # Modules
//!
//! - `types` - Resources, actions, conditions and grants
//! - `evaluator` - Grant resolution and record-scoped checks

pub mod evaluator;
pub mod types;

#[cfg(test)]
mod evaluator_props;

pub use evaluator::{Decision, RecordScope, evaluate};
pub use types::{Action, Condition, Grant, Resource};
