//! # Validate Subcommand
//!
//! Loads a job file, splits it into todo items, and validates each item
//! against the ruleset. Every finding for every item is printed; the run
//! does not stop at the first failing item.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use hvc_core::{load_todo_list, JobKind};
use hvc_schema::{ValidationEngine, ValidationReport};

use crate::{EXIT_INVALID, EXIT_OK};

/// Output format for validation results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One OK/FAIL line per todo item, findings indented below.
    #[default]
    Text,
    /// A JSON array with one report per todo item.
    Json,
}

/// Arguments for the `hvc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Job file to validate (YAML, or JSON with a `.json` extension).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Job kind the file describes (extract-train or predict).
    #[arg(short, long)]
    pub kind: JobKind,

    /// Ruleset to validate against. Defaults to the bundled ruleset.
    #[arg(long, value_name = "RULESET")]
    pub schema: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every todo item passes, 1 when any fails.
/// Operational problems are returned as `Err`.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let registry = crate::load_registry(args.schema.as_deref())?;

    let documents = load_todo_list(&args.path, args.kind)
        .with_context(|| format!("failed to load job file {}", args.path.display()))?;

    tracing::debug!(
        path = %args.path.display(),
        kind = %args.kind,
        items = documents.len(),
        "loaded todo list"
    );

    let reports = ValidationEngine::new(&registry).validate_all(&documents);

    let output = match args.format {
        OutputFormat::Text => render_text(&args.path.display().to_string(), &reports),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&reports).context("failed to serialize reports")?
        }
    };
    println!("{output}");

    if reports.iter().all(ValidationReport::is_ok) {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_INVALID)
    }
}

/// Render reports as one block per todo item plus a summary line.
pub fn render_text(label: &str, reports: &[ValidationReport]) -> String {
    let mut lines = Vec::new();
    let mut passed = 0usize;

    for (i, report) in reports.iter().enumerate() {
        if report.is_ok() {
            passed += 1;
            lines.push(format!("OK: {label} [todo {i}]"));
        } else {
            lines.push(format!("FAIL: {label} [todo {i}]"));
            for error in report.errors() {
                lines.push(format!("  {error}"));
            }
        }
    }

    lines.push(format!("{passed}/{} todo item(s) passed", reports.len()));
    lines.join("\n")
}
