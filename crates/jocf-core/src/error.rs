//! # Error Types
//!
//! Errors raised when a discriminator value cannot be constructed.
//! Validators never surface these to callers directly; they render them
//! into result error strings instead.

use thiserror::Error;

/// A discriminator value could not be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscriminatorError {
    /// The input string was empty.
    #[error("{kind} value cannot be empty")]
    Empty {
        /// Name of the discriminator type (e.g. `ObjectType`).
        kind: &'static str,
    },

    /// The input JSON value was not a string.
    #[error("{kind} value must be a string, found {found}")]
    NotAString {
        /// Name of the discriminator type.
        kind: &'static str,
        /// JSON type name of the rejected value.
        found: &'static str,
    },
}

/// JSON type name of a value, as used in error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
