//! # hvc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hvc_cli::schema::{run_schema, SchemaArgs};
use hvc_cli::validate::{run_validate, ValidateArgs};
use hvc_cli::EXIT_ERROR;

/// hvc — job specification validator
///
/// Checks extract/train and predict todo lists against the validation
/// ruleset before any feature extraction or model training starts.
#[derive(Parser, Debug)]
#[command(name = "hvc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every todo item of a job file.
    Validate(ValidateArgs),

    /// Check or display a validation ruleset.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("hvc CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Schema(args) => run_schema(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvc_cli::schema::SchemaCommand;
    use hvc_cli::validate::OutputFormat;
    use hvc_core::JobKind;

    #[test]
    fn test_parse_validate_defaults() {
        let cli = Cli::try_parse_from(["hvc", "validate", "job.yml", "--kind", "extract-train"]).unwrap();
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.path.to_str(), Some("job.yml"));
                assert_eq!(args.kind, JobKind::ExtractTrain);
                assert_eq!(args.format, OutputFormat::Text);
                assert!(args.schema.is_none());
            }
            other => panic!("Expected Validate, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_validate_all_options() {
        let cli = Cli::try_parse_from([
            "hvc", "-vv", "validate", "job.json", "-k", "predict", "--schema", "rules.yml",
            "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.kind, JobKind::Predict);
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.schema.is_some());
            }
            other => panic!("Expected Validate, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = Cli::try_parse_from(["hvc", "validate", "job.yml", "--kind", "segment"]).unwrap_err();
        assert!(err.to_string().contains("segment"), "got: {err}");
    }

    #[test]
    fn test_parse_requires_kind() {
        assert!(Cli::try_parse_from(["hvc", "validate", "job.yml"]).is_err());
    }

    #[test]
    fn test_parse_schema_subcommands() {
        let cli = Cli::try_parse_from(["hvc", "schema", "check", "rules.yml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schema(SchemaArgs { command: SchemaCommand::Check { .. } })
        ));

        let cli = Cli::try_parse_from(["hvc", "schema", "show", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Commands::Schema(SchemaArgs { command: SchemaCommand::Show { schema: None } })
        ));
    }
}
