//! # Container Validator
//!
//! Validates a whole document: `{ file_type, items: [ record, ... ], ... }`.
//!
//! Phase A checks structure. An unknown or missing `file_type` ends the
//! call; required attributes and the shape of `items` are then checked
//! together, and any failure there skips Phase B.
//!
//! Phase B delegates every item, and every other top-level attribute that
//! is itself a record, to the [`RecordValidator`]. It also enforces the
//! record types a container schema allows and its `additionalProperties`.
//! Nothing in Phase B short-circuits: every item is evaluated and all of
//! its errors are kept.

use std::collections::BTreeSet;

use jocf_core::{FileType, ObjectType};
use serde_json::{Map, Value};

use crate::document::{extract_discriminator, SchemaDocument, FILE_TYPE_KEY, OBJECT_TYPE_KEY};
use crate::loader::SchemaLoader;
use crate::record::RecordValidator;
use crate::registry::{resolve_reference, split_fragment, ResolutionRegistry};
use crate::result::ValidationResult;

const ITEMS_KEY: &str = "items";

/// Two-phase validator for container documents.
#[derive(Debug)]
pub struct ContainerValidator<'a> {
    loader: &'a SchemaLoader,
    records: RecordValidator<'a>,
}

impl<'a> ContainerValidator<'a> {
    pub fn new(loader: &'a SchemaLoader) -> Self {
        Self::with_record_validator(RecordValidator::new(loader))
    }

    /// Use a preconfigured record validator (strict mode, custom validators).
    pub fn with_record_validator(records: RecordValidator<'a>) -> Self {
        Self {
            loader: records.loader(),
            records,
        }
    }

    pub fn record_validator(&self) -> &RecordValidator<'a> {
        &self.records
    }

    pub fn record_validator_mut(&mut self) -> &mut RecordValidator<'a> {
        &mut self.records
    }

    pub fn into_record_validator(self) -> RecordValidator<'a> {
        self.records
    }

    /// Validate a container document.
    pub fn validate(&mut self, document: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some((file_type, schema)) = self.resolve_container(document, &mut result) else {
            return result;
        };
        let Some(fields) = document.as_object() else {
            return result;
        };

        check_required(schema, fields, &mut result);
        let items = check_items(schema, fields, &mut result);
        if !result.is_valid() {
            return result;
        }
        let items = items.unwrap_or_default();

        let allowed = self.allowed_object_types(schema);
        let mut validated = 0;
        for (i, item) in items.iter().enumerate() {
            if !allowed.is_empty() {
                let tag = item.get(OBJECT_TYPE_KEY).and_then(Value::as_str).unwrap_or_default();
                if !allowed.contains(tag) {
                    result.add_error(format!(
                        "object_type '{tag}' is not allowed in file_type '{file_type}'"
                    ));
                }
            }
            let record = self.records.validate_record(item);
            result.add_errors(
                record
                    .into_errors()
                    .into_iter()
                    .map(|e| format!("object validation error in items[{i}]: {e}")),
            );
            validated += 1;
        }

        for (key, value) in fields {
            if key == FILE_TYPE_KEY || key == ITEMS_KEY {
                continue;
            }
            if value.get(OBJECT_TYPE_KEY).is_some_and(Value::is_string) {
                let record = self.records.validate_record(value);
                result.add_errors(
                    record
                        .into_errors()
                        .into_iter()
                        .map(|e| format!("object validation error in {key}: {e}")),
                );
                validated += 1;
            }
        }

        check_additional_properties(schema, fields, &mut result);

        result.set_validated_objects(validated);
        result
    }

    /// Phase A, first step: find the container schema.
    fn resolve_container(
        &self,
        document: &Value,
        result: &mut ValidationResult,
    ) -> Option<(FileType, &'a SchemaDocument)> {
        let raw = match document.get(FILE_TYPE_KEY) {
            None => {
                result.add_error("file_type attribute missing");
                return None;
            }
            Some(Value::String(s)) => s,
            Some(_) => {
                result.add_error("file_type must be a string");
                return None;
            }
        };
        let file_type = match FileType::new(raw.as_str()) {
            Ok(t) => t,
            Err(e) => {
                result.add_error(format!("invalid file_type: {e}"));
                return None;
            }
        };
        match self.loader.get_container_schema(&file_type) {
            Some(schema) => Some((file_type, schema)),
            None => {
                result.add_error(format!("no schema found for file_type '{file_type}'"));
                None
            }
        }
    }

    /// `object_type` constants of the record schemas that
    /// `properties.items.items` references, directly or through `oneOf`.
    /// Empty when the schema does not restrict its items or no reference
    /// resolves.
    pub fn allowed_object_types(&self, schema: &SchemaDocument) -> BTreeSet<ObjectType> {
        let Some(item_schema) = schema
            .content()
            .pointer("/properties/items/items")
        else {
            return BTreeSet::new();
        };

        let mut refs: Vec<&str> = Vec::new();
        if let Some(r) = item_schema.get("$ref").and_then(Value::as_str) {
            refs.push(r);
        }
        if let Some(options) = item_schema.get("oneOf").and_then(Value::as_array) {
            refs.extend(
                options
                    .iter()
                    .filter_map(|o| o.get("$ref").and_then(Value::as_str)),
            );
        }
        if refs.is_empty() {
            return BTreeSet::new();
        }

        let base = schema.id().map(String::from).unwrap_or_default();
        let registry = self.loader.get_resolution_registry();
        refs.into_iter()
            .filter_map(|r| {
                let target = resolve_reference(&base, r);
                let found = referenced_object_type(&registry, &target);
                if found.is_none() {
                    tracing::debug!(reference = %target, "item $ref does not name a record schema");
                }
                found
            })
            .collect()
    }
}

/// `object_type` of the record schema a resolved `$ref` points at. A JSON
/// pointer fragment selects a subschema inside the referenced document.
fn referenced_object_type(registry: &ResolutionRegistry, target: &str) -> Option<ObjectType> {
    let (uri, fragment) = split_fragment(target);
    let doc = registry.get(uri)?;
    if fragment.is_empty() {
        return doc.object_type();
    }
    let subschema = doc.content().pointer(fragment)?;
    extract_discriminator(subschema, OBJECT_TYPE_KEY).and_then(|s| ObjectType::new(s).ok())
}

fn check_required(schema: &SchemaDocument, fields: &Map<String, Value>, result: &mut ValidationResult) {
    for attr in schema.required() {
        if !fields.contains_key(attr) {
            result.add_error(format!("missing required attribute '{attr}'"));
        }
    }
}

/// Phase A shape check of `items`. Returns the items when they are an array.
fn check_items<'v>(
    schema: &SchemaDocument,
    fields: &'v Map<String, Value>,
    result: &mut ValidationResult,
) -> Option<&'v [Value]> {
    let items = match fields.get(ITEMS_KEY) {
        None => {
            if !schema.required().contains(&ITEMS_KEY) {
                result.add_error("items attribute missing");
            }
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            result.add_error("items must be an array");
            return None;
        }
    };

    for (i, item) in items.iter().enumerate() {
        match item.as_object() {
            None => result.add_error(format!("items[{i}] must be an object")),
            Some(obj) => match obj.get(OBJECT_TYPE_KEY) {
                None => result.add_error(format!("items[{i}] is missing object_type")),
                Some(Value::String(_)) => {}
                Some(_) => result.add_error(format!("items[{i}].object_type must be a string")),
            },
        }
    }
    Some(items.as_slice())
}

fn check_additional_properties(
    schema: &SchemaDocument,
    fields: &Map<String, Value>,
    result: &mut ValidationResult,
) {
    if schema.content().get("additionalProperties") != Some(&Value::Bool(false)) {
        return;
    }
    let declared = schema.property_names();
    let mut extra: Vec<String> = fields
        .keys()
        .filter(|k| !declared.contains(&k.as_str()))
        .map(|k| format!("'{k}'"))
        .collect();
    if !extra.is_empty() {
        extra.sort_unstable();
        result.add_error(format!(
            "additional properties are not allowed: {}",
            extra.join(", ")
        ));
    }
}
