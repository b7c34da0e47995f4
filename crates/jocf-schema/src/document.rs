//! A parsed schema file and the discriminators it declares.

use std::path::{Path, PathBuf};

use jocf_core::{FileType, ObjectType, SchemaId};
use serde_json::Value;

use crate::error::SchemaError;

/// Discriminator key of container schemas.
pub const FILE_TYPE_KEY: &str = "file_type";
/// Discriminator key of record schemas.
pub const OBJECT_TYPE_KEY: &str = "object_type";

/// One schema document: where it came from and what it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    path: PathBuf,
    content: Value,
}

impl SchemaDocument {
    pub fn new(path: impl Into<PathBuf>, content: Value) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }

    /// Read and parse a schema file. The root must be a JSON object.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Read`], [`SchemaError::Parse`] or
    /// [`SchemaError::NotAnObject`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content: Value = serde_json::from_str(&raw).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if !content.is_object() {
            return Err(SchemaError::NotAnObject {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::new(path, content))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    /// The `$id` of this schema, if present and non-empty.
    pub fn id(&self) -> Option<SchemaId> {
        self.content
            .get("$id")
            .and_then(|v| SchemaId::from_value(v).ok())
    }

    pub fn title(&self) -> Option<&str> {
        self.content.get("title").and_then(Value::as_str)
    }

    /// Entries of the top-level `required` array that are strings.
    pub fn required(&self) -> Vec<&str> {
        self.content
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Keys of the top-level `properties` mapping, sorted.
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .content
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub fn file_type(&self) -> Option<FileType> {
        extract_discriminator(&self.content, FILE_TYPE_KEY).and_then(|s| FileType::new(s).ok())
    }

    pub fn object_type(&self) -> Option<ObjectType> {
        extract_discriminator(&self.content, OBJECT_TYPE_KEY)
            .and_then(|s| ObjectType::new(s).ok())
    }

    /// Whether the document declares either discriminator.
    pub fn is_discriminated(&self) -> bool {
        self.file_type().is_some() || self.object_type().is_some()
    }
}

/// Find the constant a schema declares for `tag`.
///
/// Root level first, as `{tag: {"const": "X"}}` or the bare `{tag: "X"}`;
/// then `properties.<tag>.const`.
pub fn extract_discriminator<'a>(schema: &'a Value, tag: &str) -> Option<&'a str> {
    let root = schema.get(tag).and_then(|v| match v {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("const").and_then(Value::as_str),
        _ => None,
    });
    root.or_else(|| {
        schema
            .get("properties")
            .and_then(|p| p.get(tag))
            .and_then(|d| d.get("const"))
            .and_then(Value::as_str)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_const_wins_over_properties() {
        let schema = json!({
            "object_type": {"const": "ROOT"},
            "properties": {"object_type": {"const": "NESTED"}}
        });
        assert_eq!(extract_discriminator(&schema, "object_type"), Some("ROOT"));
    }

    #[test]
    fn bare_root_string_is_accepted() {
        let schema = json!({"file_type": "JOCF_TRANSACTIONS_FILE"});
        assert_eq!(
            extract_discriminator(&schema, "file_type"),
            Some("JOCF_TRANSACTIONS_FILE")
        );
    }

    #[test]
    fn falls_back_to_properties_when_root_has_no_const() {
        let schema = json!({
            "object_type": {"type": "string"},
            "properties": {"object_type": {"const": "SECURITY_HOLDER"}}
        });
        assert_eq!(
            extract_discriminator(&schema, "object_type"),
            Some("SECURITY_HOLDER")
        );
    }

    #[test]
    fn no_discriminator() {
        let schema = json!({"properties": {"object_type": {"type": "string"}}});
        assert_eq!(extract_discriminator(&schema, "object_type"), None);
        assert_eq!(extract_discriminator(&json!({}), "file_type"), None);
        assert_eq!(
            extract_discriminator(&json!({"file_type": {"const": 7}}), "file_type"),
            None
        );
    }

    #[test]
    fn accessors() {
        let doc = SchemaDocument::new(
            "objects/SecurityHolder.schema.json",
            json!({
                "$id": "https://example.org/schema/objects/SecurityHolder.schema.json",
                "title": "Security Holder",
                "required": ["object_type", "id", 3],
                "properties": {
                    "object_type": {"const": "SECURITY_HOLDER"},
                    "id": {"type": "string"}
                }
            }),
        );
        assert_eq!(
            doc.id().unwrap().as_str(),
            "https://example.org/schema/objects/SecurityHolder.schema.json"
        );
        assert_eq!(doc.title(), Some("Security Holder"));
        assert_eq!(doc.required(), ["object_type", "id"]);
        assert_eq!(doc.property_names(), ["id", "object_type"]);
        assert_eq!(doc.object_type().unwrap().as_str(), "SECURITY_HOLDER");
        assert!(doc.file_type().is_none());
        assert!(doc.is_discriminated());
    }

    #[test]
    fn empty_const_is_not_a_discriminator() {
        let doc = SchemaDocument::new("x", json!({"properties": {"object_type": {"const": ""}}}));
        assert!(doc.object_type().is_none());
        assert!(!doc.is_discriminated());
    }

    #[test]
    fn from_file_rejects_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.schema.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            SchemaDocument::from_file(&path),
            Err(SchemaError::NotAnObject { .. })
        ));

        let path = dir.path().join("broken.schema.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            SchemaDocument::from_file(&path),
            Err(SchemaError::Parse { .. })
        ));
    }
}
