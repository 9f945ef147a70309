//! # hvc-core — Foundational Types for Job Specifications
//!
//! Defines the types every other crate in the workspace builds on: which
//! kind of job a document describes, the runtime type of a configuration
//! value, the type constraints a ruleset places on hyperparameters, and
//! the job document itself.
//!
//! ## Key Design Principles
//!
//! 1. **One `JobKind` enum.** Extract/train and predict jobs are the only
//!    two kinds. Every key-set lookup is keyed by this enum, so a ruleset
//!    that forgets one of them is rejected at load time.
//!
//! 2. **Type identity, not value equivalence.** `ValueType::of` maps `5`
//!    to `Integer` and `5.0` to `Float`. A `TypeConstraint` accepts a value
//!    only if the value's type is a member of the constraint.
//!
//! 3. **Documents are JSON value trees.** YAML job files are converted to
//!    `serde_json::Value` once at load time so every checker walks the same
//!    representation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hvc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod job;
pub mod value;

pub use document::{
    load_todo_list, todo_list_from_value, JobDocument, CONVERT_KEY, FILE_FORMAT_KEY, HYPERPARAMETERS_KEY,
    MODELS_KEY, MODEL_NAME_KEY, PROBABILITY_FLAG_KEY, TODO_LIST_KEY,
};
pub use error::DocumentError;
pub use job::{JobKind, UnknownJobKind};
pub use value::{yaml_to_json_value, TypeConstraint, UnknownValueType, ValueType};
