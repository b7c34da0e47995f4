//! # jocf-validate entry point
//!
//! Parses command-line arguments, installs logging, and runs validation.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jocf_cli::validate::{run_validate, ValidateArgs};

/// Validate JOCF cap-table documents against a local JSON Schema corpus.
#[derive(Parser, Debug)]
#[command(name = "jocf-validate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    args: ValidateArgs,
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
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run_validate(&cli.args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
