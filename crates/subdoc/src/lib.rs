//! Subdocument operations: classifier, path algebra, single-path evaluator
//!
//! This crate owns everything about one path-level operation against one
//! JSON fragment:
//! - [`Operation`]: the closed opcode classification with capability flags
//! - [`Path`]: the dotted/bracketed addressing syntax
//! - [`evaluate_lookup`] / [`evaluate_mutation`]: apply one operation to a
//!   fragment and produce a [`ResultInfo`]
//!
//! The evaluator is namespace-agnostic: callers decide whether the fragment
//! is a document body or an xattr blob. Multi-spec sequencing, commit and
//! wire encoding live in the engine and wire crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod eval;
pub mod operation;
pub mod path;

pub use eval::{evaluate_lookup, evaluate_mutation, ResultInfo, MAX_DOC_DEPTH};
pub use operation::Operation;
pub use path::{Path, PathComponent, PathError, MAX_PATH_COMPONENTS};
