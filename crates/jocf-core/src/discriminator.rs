//! # Discriminator Newtypes
//!
//! [`FileType`], [`ObjectType`] and [`SchemaId`] wrap the `const` strings
//! that select a schema. Each is a distinct type: a `FileType` cannot be
//! passed where an `ObjectType` is expected, even though both are strings
//! on the wire.
//!
//! ## Validation
//!
//! Construction fails on an empty string ([`DiscriminatorError::Empty`]) and,
//! when built from a JSON value, on anything that is not a string
//! ([`DiscriminatorError::NotAString`]). Values are immutable afterwards.
//!
//! `Borrow<str>` is implemented so that indices keyed by a discriminator can
//! be looked up with a plain `&str`; derived `Hash`/`Eq` on the inner `String`
//! keep that lookup consistent.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{json_type_name, DiscriminatorError};

macro_rules! discriminator_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a string, rejecting the empty string.
            ///
            /// # Errors
            ///
            /// Returns [`DiscriminatorError::Empty`] if `value` is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, DiscriminatorError> {
                let s = value.into();
                if s.is_empty() {
                    return Err(DiscriminatorError::Empty {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(s))
            }

            /// Build from an arbitrary JSON value.
            ///
            /// # Errors
            ///
            /// Returns [`DiscriminatorError::NotAString`] for non-string
            /// values and [`DiscriminatorError::Empty`] for `""`.
            pub fn from_value(value: &Value) -> Result<Self, DiscriminatorError> {
                match value {
                    Value::String(s) => Self::new(s.as_str()),
                    other => Err(DiscriminatorError::NotAString {
                        kind: stringify!($name),
                        found: json_type_name(other),
                    }),
                }
            }

            /// Access the wrapped string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = DiscriminatorError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = DiscriminatorError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = DiscriminatorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

discriminator_newtype!(
    /// The `file_type` tag identifying a container document
    /// (e.g. `JOCF_TRANSACTIONS_FILE`).
    FileType
);

discriminator_newtype!(
    /// The `object_type` tag identifying a record
    /// (e.g. `TX_STOCK_ISSUANCE`, `SECURITY_HOLDER`).
    ObjectType
);

discriminator_newtype!(
    /// The `$id` URI of a schema document. Globally unique across a corpus.
    SchemaId
);

impl SchemaId {
    /// The identifier without a trailing empty fragment (`...json#`).
    ///
    /// `$ref` targets are resolved without their fragment, so registries
    /// key documents by this form.
    pub fn without_fragment(&self) -> &str {
        self.0.strip_suffix('#').unwrap_or(&self.0)
    }
}
