//! # Schema Loader
//!
//! Discovers, parses and classifies every schema document of a corpus, and
//! owns the resolution registry built from them.
//!
//! ## Corpus layout
//!
//! ```text
//! <root>/
//!   files/        container schemas (file_type), one level
//!   objects/      record schemas (object_type), any depth
//!   types/        shared definitions, referenced only
//!   primitives/
//!   enums/
//! ```
//!
//! Only files ending in [`SCHEMA_SUFFIX`] are considered. A missing subtree
//! contributes zero schemas. A file that cannot be read or parsed is logged
//! and skipped; it never aborts a load.
//!
//! ## Lifecycle
//!
//! The discriminator indices are rebuilt only by [`SchemaLoader::load_all`].
//! The [`ResolutionRegistry`] is built on first access and cached until
//! [`SchemaLoader::clear_cache`]. Mutating operations take `&mut self`, so a
//! loader that is shared by reference is read-only for its borrowers.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use jocf_core::{FileType, ObjectType};
use serde::Serialize;

use crate::config::ValidatorConfig;
use crate::document::SchemaDocument;
use crate::registry::ResolutionRegistry;

/// File-name suffix of schema documents.
pub const SCHEMA_SUFFIX: &str = ".schema.json";

const FILES_DIR: &str = "files";
const OBJECTS_DIR: &str = "objects";
const AUXILIARY_DIRS: [&str; 3] = ["types", "primitives", "enums"];

/// Outcome of a bulk load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Entries in the `file_type` index.
    pub file_schemas: usize,
    /// Entries in the `object_type` index.
    pub object_schemas: usize,
    /// Candidate files that could not be read or parsed.
    pub skipped: usize,
}

/// Descriptive view of one indexed schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub id: Option<String>,
    pub title: Option<String>,
    pub path: PathBuf,
    pub required: Vec<String>,
    pub properties: Vec<String>,
}

impl SchemaSummary {
    fn of(doc: &SchemaDocument) -> Self {
        Self {
            id: doc.id().map(String::from),
            title: doc.title().map(str::to_string),
            path: doc.path().to_path_buf(),
            required: doc.required().into_iter().map(str::to_string).collect(),
            properties: doc.property_names().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Result of [`SchemaLoader::schema_info`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_schema: Option<SchemaSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_schema: Option<SchemaSummary>,
}

/// Schema corpus indices and the lazily built resolution registry.
pub struct SchemaLoader {
    schema_root: PathBuf,
    file_schemas: HashMap<FileType, Arc<SchemaDocument>>,
    object_schemas: HashMap<ObjectType, Arc<SchemaDocument>>,
    /// Non-discriminated documents registered through `preload_subset`.
    extra_resources: Vec<Arc<SchemaDocument>>,
    registry: OnceLock<Arc<ResolutionRegistry>>,
}

impl SchemaLoader {
    /// Create an empty loader for the corpus at `schema_root`. Nothing is
    /// read until [`load_all`](Self::load_all).
    pub fn new(schema_root: impl Into<PathBuf>) -> Self {
        Self {
            schema_root: schema_root.into(),
            file_schemas: HashMap::new(),
            object_schemas: HashMap::new(),
            extra_resources: Vec::new(),
            registry: OnceLock::new(),
        }
    }

    /// Create a loader for the configured corpus root.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(config.schema_root_path())
    }

    /// Create a loader and load the corpus.
    pub fn load(schema_root: impl Into<PathBuf>) -> Self {
        let mut loader = Self::new(schema_root);
        loader.load_all();
        loader
    }

    pub fn schema_root(&self) -> &Path {
        &self.schema_root
    }

    /// Rebuild both discriminator indices from the corpus.
    ///
    /// Previously preloaded documents and the cached registry are dropped.
    /// Files are visited in sorted path order, so when two documents declare
    /// the same discriminator the result is deterministic (the later path wins).
    pub fn load_all(&mut self) -> LoadSummary {
        self.file_schemas.clear();
        self.object_schemas.clear();
        self.extra_resources.clear();
        self.registry.take();

        let mut skipped = 0;
        let files_dir = self.schema_root.join(FILES_DIR);
        let objects_dir = self.schema_root.join(OBJECTS_DIR);
        let candidates = collect_schema_files(&files_dir, false)
            .into_iter()
            .chain(collect_schema_files(&objects_dir, true));

        for path in candidates {
            match SchemaDocument::from_file(&path) {
                Ok(doc) => {
                    self.register(Arc::new(doc));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping schema file");
                    skipped += 1;
                }
            }
        }

        let summary = LoadSummary {
            file_schemas: self.file_schemas.len(),
            object_schemas: self.object_schemas.len(),
            skipped,
        };
        tracing::info!(
            root = %self.schema_root.display(),
            file_schemas = summary.file_schemas,
            object_schemas = summary.object_schemas,
            skipped = summary.skipped,
            "loaded schema corpus"
        );
        summary
    }

    /// Index a document under every discriminator it declares. Returns
    /// whether it was indexed at all.
    fn register(&mut self, doc: Arc<SchemaDocument>) -> bool {
        let mut indexed = false;
        if let Some(file_type) = doc.file_type() {
            tracing::debug!(file_type = %file_type, path = %doc.path().display(), "registered container schema");
            self.file_schemas.insert(file_type, Arc::clone(&doc));
            indexed = true;
        }
        if let Some(object_type) = doc.object_type() {
            tracing::debug!(object_type = %object_type, path = %doc.path().display(), "registered record schema");
            self.object_schemas.insert(object_type, doc);
            indexed = true;
        }
        indexed
    }

    /// Container schema for a `file_type`, if one is indexed.
    pub fn get_container_schema<Q>(&self, file_type: &Q) -> Option<&SchemaDocument>
    where
        FileType: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.file_schemas.get(file_type).map(Arc::as_ref)
    }

    /// Record schema for an `object_type`, if one is indexed.
    pub fn get_record_schema<Q>(&self, object_type: &Q) -> Option<&SchemaDocument>
    where
        ObjectType: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.object_schemas.get(object_type).map(Arc::as_ref)
    }

    pub fn has_record_schema<Q>(&self, object_type: &Q) -> bool
    where
        ObjectType: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.object_schemas.contains_key(object_type)
    }

    /// Indexed `file_type` values, sorted.
    pub fn list_file_types(&self) -> Vec<&FileType> {
        let mut types: Vec<&FileType> = self.file_schemas.keys().collect();
        types.sort_unstable();
        types
    }

    /// Indexed `object_type` values, sorted.
    pub fn list_object_types(&self) -> Vec<&ObjectType> {
        let mut types: Vec<&ObjectType> = self.object_schemas.keys().collect();
        types.sort_unstable();
        types
    }

    /// The resolution registry, built on first call and shared afterwards.
    ///
    /// It holds every indexed schema, every preloaded schema, and every schema
    /// under the auxiliary `types/`, `primitives/` and `enums/` trees.
    pub fn get_resolution_registry(&self) -> Arc<ResolutionRegistry> {
        Arc::clone(
            self.registry
                .get_or_init(|| Arc::new(self.build_registry())),
        )
    }

    fn build_registry(&self) -> ResolutionRegistry {
        let mut documents: Vec<Arc<SchemaDocument>> = Vec::new();
        for dir in AUXILIARY_DIRS {
            for path in collect_schema_files(&self.schema_root.join(dir), true) {
                match SchemaDocument::from_file(&path) {
                    Ok(doc) => documents.push(Arc::new(doc)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping auxiliary schema file");
                    }
                }
            }
        }
        documents.extend(self.extra_resources.iter().cloned());

        let mut indexed: Vec<&Arc<SchemaDocument>> = self
            .file_schemas
            .values()
            .chain(self.object_schemas.values())
            .collect();
        indexed.sort_by(|a, b| a.path().cmp(b.path()));
        documents.extend(indexed.into_iter().cloned());

        let registry = ResolutionRegistry::from_documents(documents);
        tracing::debug!(
            root = %self.schema_root.display(),
            resources = registry.len(),
            "built resolution registry"
        );
        registry
    }

    /// Whether the registry is currently cached.
    pub fn is_registry_cached(&self) -> bool {
        self.registry.get().is_some()
    }

    /// Any schema in the resolution registry by `$id`. Unknown, empty or
    /// malformed identifiers yield `None`.
    pub fn get_schema_by_id(&self, id: impl AsRef<str>) -> Option<Arc<SchemaDocument>> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return None;
        }
        self.get_resolution_registry().get(id).cloned()
    }

    /// Drop the cached registry. The indices are untouched.
    pub fn clear_cache(&mut self) {
        if self.registry.take().is_some() {
            tracing::debug!(root = %self.schema_root.display(), "cleared resolution registry");
        }
    }

    /// Load an explicit list of schema files.
    ///
    /// Discriminated documents are indexed; documents with only an `$id`
    /// become extra registry resources. Failures are logged and skipped.
    /// The cached registry is dropped so the next access includes the new
    /// documents. Returns the number of files loaded.
    pub fn preload_subset<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut loaded = 0;
        for path in paths {
            let path = path.as_ref();
            match SchemaDocument::from_file(path) {
                Ok(doc) => {
                    let doc = Arc::new(doc);
                    if !self.register(Arc::clone(&doc)) && doc.id().is_some() {
                        self.extra_resources.push(doc);
                    }
                    loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping preloaded schema");
                }
            }
        }
        self.registry.take();
        tracing::debug!(loaded, "preloaded schema subset");
        loaded
    }

    /// Describe the schemas selected by the given discriminators.
    pub fn schema_info(&self, file_type: Option<&str>, object_type: Option<&str>) -> SchemaInfo {
        SchemaInfo {
            file_schema: file_type
                .and_then(|t| self.get_container_schema(t))
                .map(SchemaSummary::of),
            object_schema: object_type
                .and_then(|t| self.get_record_schema(t))
                .map(SchemaSummary::of),
        }
    }
}

impl fmt::Display for SchemaLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SchemaLoader({}: {} file schemas, {} object schemas, registry {})",
            self.schema_root.display(),
            self.file_schemas.len(),
            self.object_schemas.len(),
            if self.is_registry_cached() { "cached" } else { "not built" }
        )
    }
}

impl fmt::Debug for SchemaLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaLoader")
            .field("schema_root", &self.schema_root)
            .field("file_schemas", &self.file_schemas.len())
            .field("object_schemas", &self.object_schemas.len())
            .field("extra_resources", &self.extra_resources.len())
            .field("registry_cached", &self.is_registry_cached())
            .finish()
    }
}

/// Schema files under `dir`, sorted. A missing or unreadable directory
/// yields nothing.
fn collect_schema_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(dir, recursive, &mut files);
    files.sort();
    files
}

fn walk(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                tracing::warn!(dir = %dir.display(), error = %e, "cannot read schema directory");
            }
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                walk(&path, true, out);
            }
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SCHEMA_SUFFIX))
        {
            out.push(path);
        }
    }
}
