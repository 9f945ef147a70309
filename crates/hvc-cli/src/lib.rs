//! # hvc-cli — Command-Line Validation of Job Specifications
//!
//! Provides the `hvc` command-line interface. Configuration files are
//! checked here, before any spectrogram is computed or any model is fit,
//! so a typo in a todo list fails in milliseconds instead of hours into a
//! run.
//!
//! ## Subcommands
//!
//! - `hvc validate` — Validate every todo item of a job file.
//! - `hvc schema check` — Load a ruleset and report whether it is usable.
//! - `hvc schema show` — Print the models, keys and hyperparameter types
//!   a ruleset allows.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | every todo item passed |
//! | 1 | at least one todo item failed validation |
//! | 2 | operational error: unreadable file, broken ruleset |
//!
//! ```bash
//! hvc validate gy6or6_train.yml --kind extract-train
//! hvc validate gy6or6_predict.yml --kind predict --format json
//! hvc schema check my_rules.yml
//! ```

pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use hvc_schema::SchemaRegistry;

/// All todo items passed.
pub const EXIT_OK: u8 = 0;
/// At least one todo item failed validation.
pub const EXIT_INVALID: u8 = 1;
/// The command could not run.
pub const EXIT_ERROR: u8 = 2;

/// Load the ruleset at `path`, or the bundled ruleset when `path` is `None`.
pub fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry> {
    let registry = match path {
        Some(path) => SchemaRegistry::from_path(path)
            .with_context(|| format!("failed to load ruleset {}", path.display()))?,
        None => SchemaRegistry::builtin().context("bundled ruleset is invalid")?,
    };

    tracing::info!(
        models = registry.model_count(),
        file_formats = registry.valid_file_formats().len(),
        source = %path.map_or_else(|| "builtin".to_string(), |p| p.display().to_string()),
        "loaded ruleset"
    );

    Ok(registry)
}
