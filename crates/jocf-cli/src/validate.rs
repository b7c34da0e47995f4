//! # Validate Command
//!
//! Validates JOCF documents (files or directories) against the configured
//! schema corpus and prints a `PASS`/`FAIL` line per document, or the whole
//! aggregate as JSON.

use std::fmt::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use jocf_schema::{AggregatedValidationResult, JsonValidator, ValidatorConfig};

/// Arguments for `jocf-validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to a JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root of the schema corpus (overrides configuration).
    #[arg(long, value_name = "DIR")]
    pub schema_root: Option<PathBuf>,

    /// File-name suffix selecting documents inside directories.
    #[arg(long, value_name = "SUFFIX")]
    pub pattern: Option<String>,

    /// Enable strict mode.
    #[arg(long)]
    pub strict: bool,

    /// Print the aggregated result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Documents or directories to validate.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

/// Resolve configuration from the config file or environment, then apply
/// command-line overrides.
///
/// # Errors
///
/// Fails if the configuration file cannot be read or the schema root does
/// not exist.
pub fn resolve_config(args: &ValidateArgs) -> Result<ValidatorConfig> {
    let mut config = match &args.config {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => ValidatorConfig::from_env(),
    };
    if let Some(root) = &args.schema_root {
        config.schema.root_path = root.clone();
    }
    if let Some(pattern) = &args.pattern {
        config.validation.document_pattern = pattern.clone();
    }
    if args.strict {
        config.validation.strict_mode = true;
    }
    config
        .ensure_schema_root()
        .context("schema corpus is not available")?;
    Ok(config)
}

/// Execute the validate command.
///
/// Returns exit code: 0 when every document is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = resolve_config(args)?;
    let mut validator = JsonValidator::from_config(&config);

    tracing::info!(
        schema_root = %config.schema_root_path().display(),
        file_schemas = validator.loader().list_file_types().len(),
        object_schemas = validator.loader().list_object_types().len(),
        "loaded schema corpus"
    );

    let aggregate = validate_paths(&mut validator, &args.paths);
    let report = render_report(&aggregate, args.json)?;
    print!("{report}");

    let stats = validator.stats();
    tracing::debug!(
        records = stats.total_validations,
        failed = stats.failed_validations,
        "record validation statistics"
    );

    Ok(if aggregate.is_valid() { 0 } else { 1 })
}

/// Validate each path in order; directories are expanded with the
/// configured document pattern.
pub fn validate_paths(validator: &mut JsonValidator, paths: &[PathBuf]) -> AggregatedValidationResult {
    let mut aggregate = AggregatedValidationResult::new();
    for path in paths {
        if path.is_dir() {
            aggregate.extend(validator.validate_directory(path, None).into_results());
        } else {
            aggregate.add_result(validator.validate(path));
        }
    }
    aggregate
}

/// Render the report printed to stdout.
///
/// # Errors
///
/// Fails if the report cannot be serialized or formatted.
pub fn render_report(aggregate: &AggregatedValidationResult, json: bool) -> Result<String> {
    if json {
        let mut out = aggregate
            .to_json(true)
            .context("failed to serialize validation report")?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    write_text_report(&mut out, aggregate).context("failed to format validation report")?;
    Ok(out)
}

fn write_text_report(out: &mut impl Write, aggregate: &AggregatedValidationResult) -> fmt::Result {
    for result in aggregate.results() {
        let path = result
            .file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<value>".to_string());
        if result.is_valid() {
            writeln!(out, "PASS: {path}")?;
        } else {
            writeln!(out, "FAIL: {path}")?;
            for error in result.errors() {
                writeln!(out, "  - {error}")?;
            }
        }
    }
    writeln!(out, "\nDocuments: {}/{} passed", aggregate.valid(), aggregate.total())?;
    if aggregate.invalid() > 0 {
        writeln!(
            out,
            "{} document(s) failed validation with {} error(s).",
            aggregate.invalid(),
            aggregate.total_stats().total_errors
        )?;
    }
    Ok(())
}
