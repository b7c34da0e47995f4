//! # Document Orchestrator
//!
//! [`JsonValidator`] loads documents from disk and runs the
//! [`ContainerValidator`] over them, one file, a list of files, or a
//! directory tree at a time.
//!
//! Read and parse failures of a document become a failed
//! [`ValidationResult`] for that document; they never abort a batch.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::container::ContainerValidator;
use crate::error::SchemaError;
use crate::loader::SchemaLoader;
use crate::record::{RecordValidator, ValidationStats};
use crate::result::{AggregatedValidationResult, ValidationResult};

/// Validates container documents against one schema corpus.
#[derive(Debug)]
pub struct JsonValidator {
    loader: SchemaLoader,
    strict_mode: bool,
    document_pattern: String,
    stats: ValidationStats,
}

impl JsonValidator {
    /// Wrap a loader as-is. The caller decides whether it has been loaded.
    pub fn new(loader: SchemaLoader) -> Self {
        let defaults = ValidatorConfig::default();
        Self {
            loader,
            strict_mode: defaults.validation.strict_mode,
            document_pattern: defaults.validation.document_pattern,
            stats: ValidationStats::default(),
        }
    }

    /// Build a validator for the configured corpus and load it.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        let mut loader = SchemaLoader::from_config(config);
        loader.load_all();
        Self {
            loader,
            strict_mode: config.validation.strict_mode,
            document_pattern: config.validation.document_pattern.clone(),
            stats: ValidationStats::default(),
        }
    }

    pub fn loader(&self) -> &SchemaLoader {
        &self.loader
    }

    /// Mutable access for reloads and cache clears.
    pub fn loader_mut(&mut self) -> &mut SchemaLoader {
        &mut self.loader
    }

    /// Record-validator statistics accumulated over every call so far.
    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ValidationStats::default();
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.strict_mode = strict;
    }

    /// Default file-name suffix for [`validate_directory`](Self::validate_directory).
    pub fn document_pattern(&self) -> &str {
        &self.document_pattern
    }

    pub fn set_document_pattern(&mut self, pattern: impl Into<String>) {
        self.document_pattern = pattern.into();
    }

    /// Validate one document file.
    pub fn validate(&mut self, path: impl AsRef<Path>) -> ValidationResult {
        let path = path.as_ref();
        self.with_container(|container| validate_file(container, path))
    }

    /// Validate an in-memory document.
    pub fn validate_value(&mut self, document: &Value) -> ValidationResult {
        self.with_container(|container| container.validate(document))
    }

    /// Validate several files in order.
    pub fn validate_multiple<I, P>(&mut self, paths: I) -> AggregatedValidationResult
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.with_container(|container| {
            let mut aggregate = AggregatedValidationResult::new();
            for path in paths {
                aggregate.add_result(validate_file(container, path.as_ref()));
            }
            aggregate
        })
    }

    /// Validate every file under `dir` whose name ends with `suffix`
    /// (default: the configured document pattern), recursively and in
    /// sorted order. A missing directory yields an empty aggregate.
    pub fn validate_directory(
        &mut self,
        dir: impl AsRef<Path>,
        suffix: Option<&str>,
    ) -> AggregatedValidationResult {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "document directory does not exist");
            return AggregatedValidationResult::new();
        }
        let suffix = suffix.unwrap_or(self.document_pattern.as_str()).to_string();
        let mut files = Vec::new();
        collect_documents(dir, &suffix, &mut files);
        files.sort();
        tracing::info!(dir = %dir.display(), documents = files.len(), "validating directory");
        self.validate_multiple(files)
    }

    /// Run `f` with a container validator borrowing this corpus, then fold
    /// its record statistics into the running totals.
    fn with_container<R>(&mut self, f: impl FnOnce(&mut ContainerValidator<'_>) -> R) -> R {
        let mut records = RecordValidator::new(&self.loader);
        records.set_strict_mode(self.strict_mode);
        let mut container = ContainerValidator::with_record_validator(records);
        let out = f(&mut container);
        self.stats.merge(container.record_validator().stats());
        out
    }
}

/// Read a document. `.yaml`/`.yml` files are parsed as YAML, everything
/// else as JSON.
///
/// # Errors
///
/// [`SchemaError::DocumentLoad`] if the file cannot be read or parsed.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, SchemaError> {
    let path = path.as_ref();
    let load_err = |reason: String| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| load_err(e.to_string()))
    } else {
        serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))
    }
}

fn validate_file(container: &mut ContainerValidator<'_>, path: &Path) -> ValidationResult {
    let mut result = match load_document(path) {
        Ok(document) => container.validate(&document),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot load document");
            let mut failed = ValidationResult::new();
            failed.add_error(e.to_string());
            failed
        }
    };
    result.set_file_path(path);
    tracing::debug!(
        path = %path.display(),
        valid = result.is_valid(),
        errors = result.error_count(),
        "validated document"
    );
    result
}

fn collect_documents(dir: &Path, suffix: &str, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "cannot read document directory");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_documents(&path, suffix, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix))
        {
            out.push(path);
        }
    }
}
