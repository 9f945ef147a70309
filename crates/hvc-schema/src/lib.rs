//! # hvc-schema — Ruleset Loading & Job Validation
//!
//! Loads the validation ruleset that describes which keys, models,
//! hyperparameters and conversions a job specification may use, and
//! validates job documents against it.
//!
//! ## Responsibilities
//!
//! - **Ruleset loading:** [`SchemaRegistry`] parses a YAML ruleset once
//!   and exposes read-only lookups. A malformed ruleset is a
//!   [`SchemaLoadError`], never a validation finding.
//! - **Validation:** [`ValidationEngine`] runs the passes in
//!   [`checks`] in a fixed order and collects every finding into a
//!   [`ValidationReport`].
//!
//! ## Design
//!
//! Validation never fails on document content. A document either passes
//! or yields a list of [`ValidationError`]s; only an unreadable ruleset
//! or job file is an `Err`. The registry is immutable after load and
//! shared by reference, so many documents may be validated at once.

pub mod checks;
pub mod engine;
pub mod registry;
pub mod report;

// Re-export primary types.
pub use engine::{validate, ValidationEngine, PASSES};
pub use registry::{KeyRequirement, KeySets, SchemaLoadError, SchemaRegistry, BUILTIN_RULESET};
pub use report::{ErrorKind, ValidationError, ValidationReport};
