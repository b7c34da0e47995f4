//! # jocf-schema — Schema Corpus Loading & Two-Phase Validation
//!
//! Validates JOCF cap-table documents against a local corpus of JSON Schema
//! files.
//!
//! ## Loading (`loader`, `registry`)
//!
//! [`SchemaLoader`] walks the corpus, indexes container schemas by
//! `file_type` and record schemas by `object_type`, and lazily builds a
//! [`ResolutionRegistry`] keyed by `$id` so that `$ref` pointers resolve
//! across files. Malformed schema files are logged and skipped.
//!
//! ## Validation (`record`, `container`, `validate`)
//!
//! - [`RecordValidator::validate_record`] selects a record schema by
//!   `object_type` and evaluates it fully.
//! - [`ContainerValidator::validate`] checks a document's structure, then
//!   delegates every item to the record validator.
//! - [`JsonValidator`] loads documents from disk (JSON or YAML) and
//!   aggregates results over files and directories.
//!
//! Validation never fails fast and never reports outcomes through `Err`:
//! every entry point returns a [`ValidationResult`] holding all errors found.
//!
//! ## Crate Policy
//!
//! - Depends only on `jocf-core` internally.
//! - Schema resolution is local only. No `$ref` is ever fetched over the
//!   network; an unknown URI is a compile error for that schema.
//! - Mutating loader operations take `&mut self`; validators borrow the
//!   loader immutably.

pub mod config;
pub mod container;
pub mod document;
pub mod error;
pub mod loader;
pub mod record;
pub mod registry;
pub mod result;
pub mod validate;

pub use config::{ConfigError, ValidatorConfig};
pub use container::ContainerValidator;
pub use document::{extract_discriminator, SchemaDocument};
pub use error::SchemaError;
pub use loader::{LoadSummary, SchemaInfo, SchemaLoader, SchemaSummary, SCHEMA_SUFFIX};
pub use record::{
    extract_error_path, CustomValidator, FormattedError, RecordValidator, ValidationContext,
    ValidationStats,
};
pub use registry::ResolutionRegistry;
pub use result::{
    AggregatedStats, AggregatedValidationResult, ErrorCategories, ErrorCategory,
    ValidationResult, ValidationSummary,
};
pub use validate::{load_document, JsonValidator};

pub use jocf_core::{FileType, ObjectType, SchemaId};
