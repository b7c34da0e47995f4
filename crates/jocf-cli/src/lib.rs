//! # jocf-cli — Command-Line Validator for JOCF Documents
//!
//! Provides the `jocf-validate` binary. All validation logic lives in
//! `jocf-schema`; this crate parses arguments, resolves configuration and
//! prints reports.
//!
//! ```bash
//! jocf-validate --schema-root schema/ exports/
//! jocf-validate --config validator_config.json --json company.jocf.json
//! ```
//!
//! Exit codes: `0` all documents valid, `1` at least one invalid document,
//! `2` operational error (bad configuration, missing schema root).

pub mod validate;
