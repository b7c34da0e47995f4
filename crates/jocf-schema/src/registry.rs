//! # Resolution Registry
//!
//! Every schema document of a corpus that carries an `$id`, keyed by that
//! `$id` with any fragment removed. Compiled evaluators resolve `$ref`
//! targets through [`RegistryRetriever`], which only ever consults this map:
//! there is no network fetch path.
//!
//! References are resolved lazily by the evaluation engine, so cyclic and
//! self-referential schema graphs are fine. Nothing is inlined.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use url::Url;

use crate::document::SchemaDocument;

/// Schema resources addressable by `$id`.
#[derive(Debug, Default)]
pub struct ResolutionRegistry {
    resources: HashMap<String, Arc<SchemaDocument>>,
}

impl ResolutionRegistry {
    /// Build a registry from documents. Documents without an `$id` are
    /// ignored; on a duplicate `$id` the later document wins.
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = Arc<SchemaDocument>>,
    {
        let mut resources = HashMap::new();
        for doc in documents {
            let Some(id) = doc.id() else {
                continue;
            };
            let key = normalize_uri(id.as_str()).to_string();
            if let Some(previous) = resources.insert(key, Arc::clone(&doc)) {
                if previous.path() != doc.path() {
                    tracing::debug!(
                        id = %id,
                        kept = %doc.path().display(),
                        replaced = %previous.path().display(),
                        "duplicate schema $id"
                    );
                }
            }
        }
        Self { resources }
    }

    /// Look up a resource by URI. A fragment, if any, is ignored.
    pub fn get(&self, uri: &str) -> Option<&Arc<SchemaDocument>> {
        self.resources.get(normalize_uri(uri))
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// `$ref` retriever backed by a [`ResolutionRegistry`].
pub(crate) struct RegistryRetriever {
    registry: Arc<ResolutionRegistry>,
}

impl RegistryRetriever {
    pub(crate) fn new(registry: Arc<ResolutionRegistry>) -> Self {
        Self { registry }
    }
}

impl Retrieve for RegistryRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        match self.registry.get(uri) {
            Some(doc) => Ok(doc.content().clone()),
            None => Err(format!("schema not found in local corpus: {uri}").into()),
        }
    }
}

/// Resolve a `$ref` against the `$id` of the referring schema.
///
/// A reference that already parses as an absolute URI (`https:`, `urn:`,
/// ...) is returned unchanged. Relative references are joined onto `base`
/// per RFC 3986. When `base` is empty or cannot serve as a base, the
/// reference is returned as written. Fragments are preserved.
pub fn resolve_reference(base: &str, reference: &str) -> String {
    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }
    match Url::parse(base).and_then(|base| base.join(reference)) {
        Ok(joined) => joined.into(),
        Err(_) => reference.to_string(),
    }
}

/// Split a URI into its document part and its fragment (without `#`).
pub fn split_fragment(uri: &str) -> (&str, &str) {
    uri.split_once('#').unwrap_or((uri, ""))
}

fn normalize_uri(uri: &str) -> &str {
    split_fragment(uri).0
}
