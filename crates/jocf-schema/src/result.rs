//! # Validation Results
//!
//! [`ValidationResult`] is the outcome of one validation call: a validity
//! flag plus the ordered list of human-readable errors. It starts valid and
//! becomes invalid on the first [`ValidationResult::add_error`]; errors are
//! never removed. [`AggregatedValidationResult`] collects per-document
//! results and keeps `total == valid + invalid` after every append.
//!
//! Validators never report outcomes through `Err`. Callers inspect
//! [`ValidationResult::is_valid`] and [`ValidationResult::errors`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Coarse classification of an error string, used for reporting only.
///
/// Classification is substring-based over unstructured messages. Do not
/// branch program logic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A record delegated from a container or batch failed.
    ObjectValidation,
    /// A discriminator was missing, mistyped, unknown or not allowed.
    TypeCheck,
    /// A schema keyword was violated during full evaluation.
    SchemaValidation,
    /// Anything else (I/O, parse, structural shape).
    Other,
}

impl ErrorCategory {
    /// Classify one error message.
    pub fn classify(message: &str) -> Self {
        if message.contains("object validation error") || message.starts_with("Item ") {
            Self::ObjectValidation
        } else if message.contains("schema validation error") {
            Self::SchemaValidation
        } else if message.contains("object_type") || message.contains("file_type") {
            Self::TypeCheck
        } else {
            Self::Other
        }
    }
}

/// Per-category error counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorCategories {
    /// Errors from delegated record validation.
    pub object_validation_errors: usize,
    /// Discriminator and type-check errors.
    pub type_check_errors: usize,
    /// Schema keyword violations.
    pub schema_validation_errors: usize,
    /// Everything else.
    pub other_errors: usize,
}

/// Report-oriented digest of a [`ValidationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Number of errors.
    pub total_errors: usize,
    /// Whether validation succeeded.
    pub validation_success: bool,
    /// Errors bucketed by [`ErrorCategory`].
    pub error_categories: ErrorCategories,
}

/// Outcome of a single validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_path: Option<PathBuf>,
    validated_objects: usize,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// A fresh, valid result with no errors.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            file_path: None,
            validated_objects: 0,
        }
    }

    /// A valid result for a document.
    pub fn success(file_path: impl Into<PathBuf>, validated_objects: usize) -> Self {
        let mut result = Self::new();
        result.file_path = Some(file_path.into());
        result.validated_objects = validated_objects;
        result
    }

    /// A result for a document carrying the given errors.
    ///
    /// Validity follows the error list: an empty list yields a valid result.
    pub fn failure<I, S>(file_path: impl Into<PathBuf>, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut result = Self::new();
        result.file_path = Some(file_path.into());
        result.add_errors(errors);
        result
    }

    /// Append an error and mark the result invalid.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    /// Append several errors in order.
    pub fn add_errors<I, S>(&mut self, errors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for e in errors {
            self.add_error(e);
        }
    }

    /// Append a warning. Warnings never affect validity.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another result into this one: errors and warnings are appended
    /// in order and validated-object counts are summed.
    pub fn merge(&mut self, other: ValidationResult) {
        self.add_errors(other.errors);
        self.warnings.extend(other.warnings);
        self.validated_objects += other.validated_objects;
    }

    /// True iff no error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Errors in the order they were recorded.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings in the order they were recorded.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the result and return its errors.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Path of the validated document, if the result came from a file.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// Number of records evaluated while producing this result.
    pub fn validated_objects(&self) -> usize {
        self.validated_objects
    }

    pub fn set_validated_objects(&mut self, count: usize) {
        self.validated_objects = count;
    }

    /// Bucket errors by [`ErrorCategory`], preserving order within each bucket.
    pub fn errors_by_type(&self) -> BTreeMap<ErrorCategory, Vec<String>> {
        let mut buckets: BTreeMap<ErrorCategory, Vec<String>> = BTreeMap::new();
        for e in &self.errors {
            buckets
                .entry(ErrorCategory::classify(e))
                .or_default()
                .push(e.clone());
        }
        buckets
    }

    /// Count errors per category.
    pub fn summary(&self) -> ValidationSummary {
        let mut categories = ErrorCategories::default();
        for e in &self.errors {
            match ErrorCategory::classify(e) {
                ErrorCategory::ObjectValidation => categories.object_validation_errors += 1,
                ErrorCategory::TypeCheck => categories.type_check_errors += 1,
                ErrorCategory::SchemaValidation => categories.schema_validation_errors += 1,
                ErrorCategory::Other => categories.other_errors += 1,
            }
        }
        ValidationSummary {
            total_errors: self.errors.len(),
            validation_success: self.is_valid,
            error_categories: categories,
        }
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization errors.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.file_path {
            write!(f, "{}: ", path.display())?;
        }
        if self.is_valid {
            write!(f, "valid")
        } else {
            write!(f, "invalid ({} error(s))", self.errors.len())
        }
    }
}

/// Totals over an [`AggregatedValidationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregatedStats {
    /// Number of documents.
    pub total_files: usize,
    /// Documents that validated.
    pub valid_files: usize,
    /// Documents that failed.
    pub invalid_files: usize,
    /// Errors across all documents.
    pub total_errors: usize,
    /// Records evaluated across all documents.
    pub validated_objects: usize,
}

/// Ordered collection of per-document results with derived counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedValidationResult {
    is_valid: bool,
    total: usize,
    valid: usize,
    invalid: usize,
    results: Vec<ValidationResult>,
}

impl AggregatedValidationResult {
    /// An empty aggregate. It is valid: zero documents failed.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            total: 0,
            valid: 0,
            invalid: 0,
            results: Vec::new(),
        }
    }

    /// Append a document result and recompute the derived counts.
    pub fn add_result(&mut self, result: ValidationResult) {
        self.results.push(result);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total = self.results.len();
        self.valid = self.results.iter().filter(|r| r.is_valid()).count();
        self.invalid = self.total - self.valid;
        self.is_valid = self.invalid == 0;
    }

    /// True iff no contained document failed.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn valid(&self) -> usize {
        self.valid
    }

    pub fn invalid(&self) -> usize {
        self.invalid
    }

    /// Per-document results in insertion order.
    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    /// Consume the aggregate and return its per-document results.
    pub fn into_results(self) -> Vec<ValidationResult> {
        self.results
    }

    /// Every error of every document, flattened in order.
    pub fn all_errors(&self) -> Vec<&str> {
        self.results
            .iter()
            .flat_map(|r| r.errors().iter().map(String::as_str))
            .collect()
    }

    pub fn total_stats(&self) -> AggregatedStats {
        AggregatedStats {
            total_files: self.total,
            valid_files: self.valid,
            invalid_files: self.invalid,
            total_errors: self.results.iter().map(ValidationResult::error_count).sum(),
            validated_objects: self
                .results
                .iter()
                .map(ValidationResult::validated_objects)
                .sum(),
        }
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization errors.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl Default for AggregatedValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<ValidationResult> for AggregatedValidationResult {
    fn extend<I: IntoIterator<Item = ValidationResult>>(&mut self, iter: I) {
        self.results.extend(iter);
        self.recompute();
    }
}

impl fmt::Display for AggregatedValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} document(s) valid, {} invalid",
            self.valid, self.total, self.invalid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_valid_and_flips_on_error() {
        let mut r = ValidationResult::new();
        assert!(r.is_valid());
        assert!(!r.has_errors());
        r.add_error("object_type attribute missing");
        assert!(!r.is_valid());
        assert_eq!(r.error_count(), 1);
    }

    #[test]
    fn warnings_do_not_affect_validity() {
        let mut r = ValidationResult::new();
        r.add_warning("deprecated attribute");
        assert!(r.is_valid());
        assert!(r.has_warnings());
    }

    #[test]
    fn failure_with_no_errors_is_valid() {
        let r = ValidationResult::failure("a.json", Vec::<String>::new());
        assert!(r.is_valid());
        let r = ValidationResult::failure("a.json", ["boom"]);
        assert!(!r.is_valid());
        assert_eq!(r.file_path(), Some(Path::new("a.json")));
    }

    #[test]
    fn merge_preserves_order() {
        let mut a = ValidationResult::new();
        a.add_error("first");
        a.set_validated_objects(2);
        let mut b = ValidationResult::new();
        b.add_error("second");
        b.add_warning("note");
        b.set_validated_objects(3);
        a.merge(b);
        assert_eq!(a.errors(), ["first", "second"]);
        assert_eq!(a.warnings(), ["note"]);
        assert_eq!(a.validated_objects(), 5);
    }

    #[test]
    fn summary_buckets_errors() {
        let mut r = ValidationResult::new();
        r.add_error("object validation error in items[0]: object_type attribute missing");
        r.add_error("no schema found for object_type 'INVALID_TYPE'");
        r.add_error("schema validation error at name: \"name\" is a required property");
        r.add_error("items must be an array");
        let s = r.summary();
        assert_eq!(s.total_errors, 4);
        assert!(!s.validation_success);
        assert_eq!(s.error_categories.object_validation_errors, 1);
        assert_eq!(s.error_categories.type_check_errors, 1);
        assert_eq!(s.error_categories.schema_validation_errors, 1);
        assert_eq!(s.error_categories.other_errors, 1);

        let by_type = r.errors_by_type();
        assert_eq!(by_type[&ErrorCategory::TypeCheck].len(), 1);
        assert!(!by_type.contains_key(&ErrorCategory::ObjectValidation) || by_type.len() == 4);
    }

    #[test]
    fn batch_prefix_counts_as_object_validation() {
        assert_eq!(
            ErrorCategory::classify("Item 3: no schema found for object_type 'X'"),
            ErrorCategory::ObjectValidation
        );
    }

    #[test]
    fn json_output_contains_validity_and_errors() {
        let r = ValidationResult::failure("doc.jocf.json", ["items attribute missing"]);
        let v: serde_json::Value = serde_json::from_str(&r.to_json(false).unwrap()).unwrap();
        assert_eq!(v["is_valid"], false);
        assert_eq!(v["errors"][0], "items attribute missing");
        assert_eq!(v["file_path"], "doc.jocf.json");
        assert!(v.get("warnings").is_none());
    }

    #[test]
    fn display_forms() {
        assert_eq!(ValidationResult::new().to_string(), "valid");
        let r = ValidationResult::failure("x.json", ["a", "b"]);
        assert_eq!(r.to_string(), "x.json: invalid (2 error(s))");
    }

    #[test]
    fn aggregate_counts_and_flattening() {
        let mut agg = AggregatedValidationResult::new();
        assert!(agg.is_valid());
        assert_eq!(agg.total(), 0);

        agg.add_result(ValidationResult::success("a.json", 4));
        agg.add_result(ValidationResult::failure("b.json", ["e1", "e2"]));
        agg.add_result(ValidationResult::failure("c.json", ["e3"]));

        assert_eq!(agg.total(), 3);
        assert_eq!(agg.valid(), 1);
        assert_eq!(agg.invalid(), 2);
        assert!(!agg.is_valid());
        assert_eq!(agg.all_errors(), ["e1", "e2", "e3"]);

        let stats = agg.total_stats();
        assert_eq!(stats.total_errors, 3);

        let mut merged = AggregatedValidationResult::new();
        merged.extend(agg.clone().into_results());
        assert_eq!(merged, agg);
        assert_eq!(stats.validated_objects, 4);
        assert_eq!(agg.to_string(), "1/3 document(s) valid, 2 invalid");
    }
}
