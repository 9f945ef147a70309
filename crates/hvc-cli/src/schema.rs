//! # Schema Subcommand
//!
//! Inspection of validation rulesets: load one to confirm it is usable,
//! or print what it allows.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use hvc_core::JobKind;
use hvc_schema::SchemaRegistry;

use crate::EXIT_OK;

/// Arguments for the `hvc schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

/// Schema subcommands.
#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Load a ruleset and print a summary.
    Check {
        /// Path to the ruleset YAML file.
        #[arg(value_name = "RULESET")]
        ruleset: PathBuf,
    },

    /// Print platforms, models, model keys and hyperparameter types.
    Show {
        /// Ruleset to show. Defaults to the bundled ruleset.
        #[arg(long, value_name = "RULESET")]
        schema: Option<PathBuf>,
    },
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    match &args.command {
        SchemaCommand::Check { ruleset } => {
            let registry = crate::load_registry(Some(ruleset))?;
            println!("OK: {} ({})", ruleset.display(), summarize(&registry));
            Ok(EXIT_OK)
        }
        SchemaCommand::Show { schema } => {
            let registry = crate::load_registry(schema.as_deref())?;
            println!("{}", describe(&registry));
            Ok(EXIT_OK)
        }
    }
}

/// One-line count of what a ruleset defines.
pub fn summarize(registry: &SchemaRegistry) -> String {
    format!(
        "{} model(s) on {} platform(s), {} file format(s), {} convert type(s)",
        registry.model_count(),
        registry.valid_models().len(),
        registry.valid_file_formats().len(),
        registry.valid_convert_types().len(),
    )
}

/// Human-readable listing of a ruleset.
pub fn describe(registry: &SchemaRegistry) -> String {
    let mut lines = Vec::new();

    lines.push(format!("file formats: {}", join(registry.valid_file_formats())));
    for kind in JobKind::all_kinds() {
        lines.push(format!("{kind} keys:"));
        lines.push(format!("  required: {}", join(registry.required_keys(*kind))));
        lines.push(format!("  optional: {}", join(registry.optional_keys(*kind))));
    }

    for (platform, models) in registry.valid_models() {
        lines.push(format!("platform {platform}:"));
        for model in models {
            lines.push(format!("  model {model}:"));
            for (key, requirement) in registry.model_keys(model).into_iter().flatten() {
                lines.push(format!("    key {key} ({requirement})"));
            }
            for (param, constraint) in registry.hyperparameter_types(model).into_iter().flatten() {
                lines.push(format!("    hyperparameter {param}: {constraint}"));
            }
            if registry.requires_probability(model) {
                lines.push("    requires predict_proba: true".to_string());
            }
        }
    }

    lines.push(format!("convert types: {}", join(registry.valid_convert_types())));
    for section in registry.sections() {
        let keys = registry.section_keys(section).map(join).unwrap_or_default();
        lines.push(format!("section {section}: {keys}"));
    }

    lines.join("\n")
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
