//! # Error Types
//!
//! Errors for the parts of the validator that can genuinely fail: reading
//! and parsing schema files, compiling a resolved schema, and loading an
//! input document. Validation outcomes are never errors; they are carried
//! by [`crate::ValidationResult`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading schemas or documents.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema file could not be read.
    #[error("failed to read schema {path}: {source}")]
    Read {
        /// Path of the schema file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A schema file is not valid JSON.
    #[error("failed to parse schema {path}: {source}")]
    Parse {
        /// Path of the schema file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A schema file parsed, but its root is not a JSON object.
    #[error("schema {path} is not a JSON object")]
    NotAnObject {
        /// Path of the schema file.
        path: PathBuf,
    },

    /// A resolved schema could not be compiled into an evaluator.
    #[error("failed to compile schema {schema_id}: {reason}")]
    Compile {
        /// The schema `$id`, or its title when it has none.
        schema_id: String,
        /// Human-readable reason, typically an unresolvable `$ref`.
        reason: String,
    },

    /// An input document could not be read or parsed.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoad {
        /// Path of the document.
        path: String,
        /// Human-readable reason.
        reason: String,
    },
}
