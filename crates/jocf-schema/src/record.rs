//! # Record Validator
//!
//! Validates one JSON value against the record schema its `object_type`
//! selects.
//!
//! `validate_record` runs three stages:
//!
//! 1. **Precheck**: `object_type` is present and a string. Otherwise the
//!    call ends with a structural error.
//! 2. **Resolution**: the tag is wrapped as an [`ObjectType`] and looked up.
//!    An unknown tag ends the call with a lookup error.
//! 3. **Evaluation**: full JSON Schema evaluation with `$ref` resolution
//!    through the loader's [`ResolutionRegistry`]. Every violation is
//!    collected, not just the first.
//!
//! Statistics are updated on every call, whatever the outcome.
//!
//! Compiled evaluators are memoized per `ObjectType`. The validator borrows
//! its [`SchemaLoader`], so the registry cannot be rebuilt underneath it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jocf_core::ObjectType;
use jsonschema::{ValidationError, Validator};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::document::{SchemaDocument, OBJECT_TYPE_KEY};
use crate::error::SchemaError;
use crate::loader::SchemaLoader;
use crate::registry::{RegistryRetriever, ResolutionRegistry};
use crate::result::ValidationResult;

/// Caller-supplied predicate over a record.
pub type CustomValidator = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Counters kept across `validate_record` calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationStats {
    pub total_validations: u64,
    pub successful_validations: u64,
    pub failed_validations: u64,
    /// Elapsed time of every validation, in call order.
    #[serde(serialize_with = "serialize_secs")]
    pub validation_times: Vec<Duration>,
    /// Occurrences per `object_type` string seen by the precheck.
    pub object_type_counts: BTreeMap<String, u64>,
}

impl ValidationStats {
    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &ValidationStats) {
        self.total_validations += other.total_validations;
        self.successful_validations += other.successful_validations;
        self.failed_validations += other.failed_validations;
        self.validation_times
            .extend(other.validation_times.iter().copied());
        for (tag, count) in &other.object_type_counts {
            *self.object_type_counts.entry(tag.clone()).or_default() += count;
        }
    }

    pub fn average_time(&self) -> Option<Duration> {
        let n = u32::try_from(self.validation_times.len()).ok()?;
        if n == 0 {
            return None;
        }
        Some(self.validation_times.iter().sum::<Duration>() / n)
    }

    /// Fraction of successful validations; `0.0` when nothing ran.
    pub fn success_rate(&self) -> f64 {
        if self.total_validations == 0 {
            0.0
        } else {
            self.successful_validations as f64 / self.total_validations as f64
        }
    }
}

fn serialize_secs<S: Serializer>(times: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(times.iter().map(Duration::as_secs_f64))
}

/// What the validator knows about a value before evaluating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationContext {
    pub object_type: Option<String>,
    pub strict_mode: bool,
    /// Number of top-level keys; `0` for non-objects.
    pub object_size: usize,
}

/// A schema violation rendered for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedError {
    pub error_message: String,
    pub error_path: String,
    pub object_type: Option<String>,
    pub context: ValidationContext,
}

/// Validates records against the record schemas of one [`SchemaLoader`].
pub struct RecordValidator<'a> {
    loader: &'a SchemaLoader,
    compiled: HashMap<ObjectType, Validator>,
    stats: ValidationStats,
    custom_validators: BTreeMap<String, CustomValidator>,
    strict_mode: bool,
}

impl<'a> RecordValidator<'a> {
    pub fn new(loader: &'a SchemaLoader) -> Self {
        Self {
            loader,
            compiled: HashMap::new(),
            stats: ValidationStats::default(),
            custom_validators: BTreeMap::new(),
            strict_mode: false,
        }
    }

    pub fn loader(&self) -> &'a SchemaLoader {
        self.loader
    }

    /// Validate one record. Never fails; see the module docs for the stages.
    pub fn validate_record(&mut self, value: &Value) -> ValidationResult {
        let started = Instant::now();
        let mut result = ValidationResult::new();

        match value.get(OBJECT_TYPE_KEY) {
            None => result.add_error("object_type attribute missing"),
            Some(Value::String(tag)) => {
                *self.stats.object_type_counts.entry(tag.clone()).or_default() += 1;
                match ObjectType::new(tag.as_str()) {
                    Err(e) => result.add_error(format!("invalid object_type: {e}")),
                    Ok(object_type) if !self.loader.has_record_schema(&object_type) => {
                        result.add_error(format!("no schema found for object_type '{object_type}'"));
                    }
                    Ok(object_type) => {
                        result.add_errors(self.evaluate(&object_type, value));
                    }
                }
            }
            Some(_) => result.add_error("object_type must be a string"),
        }

        result.set_validated_objects(1);
        self.record_outcome(result.is_valid(), started.elapsed());
        result
    }

    /// Validate every value independently. Errors of member `i` are
    /// prefixed with `Item i: `.
    pub fn validate_many(&mut self, values: &[Value]) -> ValidationResult {
        let mut combined = ValidationResult::new();
        for (i, value) in values.iter().enumerate() {
            let result = self.validate_record(value);
            combined.add_errors(
                result
                    .into_errors()
                    .into_iter()
                    .map(|e| format!("Item {i}: {e}")),
            );
        }
        combined.set_validated_objects(values.len());
        combined
    }

    /// Evaluate `value` against an explicitly supplied schema. Statistics
    /// are not touched.
    pub fn validate_record_with_schema(
        &self,
        value: &Value,
        schema: &SchemaDocument,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        match compile(&self.loader.get_resolution_registry(), schema) {
            Ok(validator) => result.add_errors(render_errors(&validator, value)),
            Err(e) => result.add_error(e.to_string()),
        }
        result.set_validated_objects(1);
        result
    }

    /// Cheap shape check: a non-empty object with a string `object_type`.
    pub fn validate_structure(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|map| {
            !map.is_empty() && map.get(OBJECT_TYPE_KEY).is_some_and(Value::is_string)
        })
    }

    fn evaluate(&mut self, object_type: &ObjectType, value: &Value) -> Vec<String> {
        match self.compiled_validator(object_type) {
            Ok(validator) => render_errors(validator, value),
            Err(e) => vec![e.to_string()],
        }
    }

    fn compiled_validator(&mut self, object_type: &ObjectType) -> Result<&Validator, SchemaError> {
        if !self.compiled.contains_key(object_type) {
            let loader = self.loader;
            let schema = loader
                .get_record_schema(object_type)
                .ok_or_else(|| SchemaError::Compile {
                    schema_id: object_type.to_string(),
                    reason: "record schema is not indexed".to_string(),
                })?;
            let validator = compile(&loader.get_resolution_registry(), schema)?;
            tracing::debug!(object_type = %object_type, "compiled record schema");
            self.compiled.insert(object_type.clone(), validator);
        }
        self.compiled
            .get(object_type)
            .ok_or_else(|| SchemaError::Compile {
                schema_id: object_type.to_string(),
                reason: "compiled evaluator missing".to_string(),
            })
    }

    fn record_outcome(&mut self, valid: bool, elapsed: Duration) {
        self.stats.total_validations += 1;
        if valid {
            self.stats.successful_validations += 1;
        } else {
            self.stats.failed_validations += 1;
        }
        self.stats.validation_times.push(elapsed);
    }

    /// The `object_type` of a value, if it is a valid discriminator.
    pub fn get_object_type(&self, value: &Value) -> Option<ObjectType> {
        value
            .get(OBJECT_TYPE_KEY)
            .and_then(|v| ObjectType::from_value(v).ok())
    }

    /// Whether a record schema is indexed for `tag`.
    pub fn is_valid_object_type(&self, tag: &str) -> bool {
        self.loader.has_record_schema(tag)
    }

    pub fn list_supported_object_types(&self) -> Vec<&'a ObjectType> {
        self.loader.list_object_types()
    }

    /// The record schema a value's `object_type` selects.
    pub fn get_schema_for_value(&self, value: &Value) -> Option<&'a SchemaDocument> {
        let tag = value.get(OBJECT_TYPE_KEY)?.as_str()?;
        self.loader.get_record_schema(tag)
    }

    pub fn validation_context(&self, value: &Value) -> ValidationContext {
        ValidationContext {
            object_type: value
                .get(OBJECT_TYPE_KEY)
                .and_then(Value::as_str)
                .map(str::to_string),
            strict_mode: self.strict_mode,
            object_size: value.as_object().map_or(0, |m| m.len()),
        }
    }

    pub fn format_validation_error(
        &self,
        error: &ValidationError<'_>,
        value: &Value,
    ) -> FormattedError {
        let context = self.validation_context(value);
        FormattedError {
            error_message: error.to_string(),
            error_path: extract_error_path(error),
            object_type: context.object_type.clone(),
            context,
        }
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ValidationStats::default();
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Set the strict-mode flag. `validate_record` does not consult it.
    pub fn set_strict_mode(&mut self, strict: bool) {
        self.strict_mode = strict;
    }

    /// Register a named predicate, replacing any previous one of that name.
    pub fn add_custom_validator<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.custom_validators.insert(name.into(), Box::new(predicate));
    }

    /// Returns whether a predicate of that name existed.
    pub fn remove_custom_validator(&mut self, name: &str) -> bool {
        self.custom_validators.remove(name).is_some()
    }

    /// Registered predicate names, sorted.
    pub fn list_custom_validators(&self) -> Vec<&str> {
        self.custom_validators.keys().map(String::as_str).collect()
    }

    /// Run every registered predicate against `value`. Not part of
    /// `validate_record`; callers invoke it explicitly.
    pub fn run_custom_validators(&self, value: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        for (name, predicate) in &self.custom_validators {
            if !predicate(value) {
                result.add_error(format!("custom validator '{name}' rejected the record"));
            }
        }
        result
    }
}

impl fmt::Debug for RecordValidator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordValidator")
            .field("loader", &self.loader)
            .field("compiled", &self.compiled.len())
            .field("stats", &self.stats)
            .field("custom_validators", &self.list_custom_validators())
            .field("strict_mode", &self.strict_mode)
            .finish()
    }
}

/// Compile a schema with `$ref` resolution through `registry`.
pub(crate) fn compile(
    registry: &Arc<ResolutionRegistry>,
    schema: &SchemaDocument,
) -> Result<Validator, SchemaError> {
    jsonschema::options()
        .with_retriever(RegistryRetriever::new(Arc::clone(registry)))
        .should_validate_formats(true)
        .build(schema.content())
        .map_err(|e| SchemaError::Compile {
            schema_id: schema
                .id()
                .map(String::from)
                .or_else(|| schema.title().map(str::to_string))
                .unwrap_or_else(|| schema.path().display().to_string()),
            reason: e.to_string(),
        })
}

fn render_errors(validator: &Validator, value: &Value) -> Vec<String> {
    validator
        .iter_errors(value)
        .map(|e| {
            format!(
                "schema validation error at {}: {}",
                extract_error_path(&e),
                e
            )
        })
        .collect()
}

/// Dot-joined instance path of a violation, or `root` at the top level.
pub fn extract_error_path(error: &ValidationError<'_>) -> String {
    pointer_to_dotted(&error.instance_path.to_string())
}

fn pointer_to_dotted(pointer: &str) -> String {
    let segments: Vec<String> = pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect();
    if segments.is_empty() {
        "root".to_string()
    } else {
        segments.join(".")
    }
}
