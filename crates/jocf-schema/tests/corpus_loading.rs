//! Integration test: load the checked-in fixture corpus and check the
//! loader's index and registry properties against it.
//!
//! The fixture corpus under `tests/fixtures/schema/` mirrors the layout of
//! a real JOCF schema tree, including a malformed schema file and a
//! non-schema file that must be skipped.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use jocf_schema::{extract_discriminator, SchemaDocument, SchemaLoader};

const BASE: &str = "https://jocf.example.org/schema";

fn schema_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/schema")
}

/// Parse every `*.schema.json` under `dir` that parses, recursively.
fn parsed_schemas(dir: &std::path::Path, recursive: bool) -> Vec<SchemaDocument> {
    let mut out = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if recursive {
                    out.extend(parsed_schemas(&path, true));
                }
            } else if path.to_string_lossy().ends_with(".schema.json") {
                if let Ok(doc) = SchemaDocument::from_file(&path) {
                    out.push(doc);
                }
            }
        }
    }
    out
}

#[test]
fn test_load_fixture_corpus() {
    let mut loader = SchemaLoader::new(schema_root());
    let summary = loader.load_all();

    assert_eq!(summary.file_schemas, 2);
    assert_eq!(summary.object_schemas, 4);
    assert_eq!(summary.skipped, 1, "Broken.schema.json must be skipped");

    let file_types: Vec<&str> = loader.list_file_types().iter().map(|t| t.as_str()).collect();
    assert_eq!(file_types, ["JOCF_STAKEHOLDERS_FILE", "JOCF_TRANSACTIONS_FILE"]);

    let object_types: Vec<&str> = loader.list_object_types().iter().map(|t| t.as_str()).collect();
    assert_eq!(
        object_types,
        ["ISSUER", "SECURITY_HOLDER", "TX_STOCK_ISSUANCE", "TX_STOCK_TRANSFER"]
    );
}

#[test]
fn load_all_is_idempotent() {
    let mut loader = SchemaLoader::new(schema_root());
    let first = loader.load_all();
    let file_types: Vec<String> = loader.list_file_types().iter().map(|t| t.to_string()).collect();
    let object_types: Vec<String> = loader.list_object_types().iter().map(|t| t.to_string()).collect();

    let second = loader.load_all();
    assert_eq!(first, second);
    let again_files: Vec<String> = loader.list_file_types().iter().map(|t| t.to_string()).collect();
    let again_objects: Vec<String> = loader.list_object_types().iter().map(|t| t.to_string()).collect();
    assert_eq!(file_types, again_files);
    assert_eq!(object_types, again_objects);

    for tag in &object_types {
        assert_eq!(
            loader.get_record_schema(tag.as_str()).unwrap().path(),
            SchemaLoader::load(schema_root()).get_record_schema(tag.as_str()).unwrap().path()
        );
    }
}

#[test]
fn record_schema_discriminator_round_trips() {
    let loader = SchemaLoader::load(schema_root());
    for tag in loader.list_object_types() {
        let doc = loader.get_record_schema(tag).unwrap();
        assert_eq!(
            extract_discriminator(doc.content(), "object_type"),
            Some(tag.as_str())
        );
        assert_eq!(doc.object_type().as_ref(), Some(tag));
    }
    for tag in loader.list_file_types() {
        let doc = loader.get_container_schema(tag).unwrap();
        assert_eq!(doc.file_type().as_ref(), Some(tag));
    }
}

#[test]
fn index_size_matches_distinct_discriminators() {
    let root = schema_root();
    let loader = SchemaLoader::load(&root);

    let object_tags: BTreeSet<String> = parsed_schemas(&root.join("objects"), true)
        .iter()
        .filter_map(|d| d.object_type().map(String::from))
        .collect();
    let file_tags: BTreeSet<String> = parsed_schemas(&root.join("files"), false)
        .iter()
        .filter_map(|d| d.file_type().map(String::from))
        .collect();

    assert_eq!(loader.list_object_types().len(), object_tags.len());
    assert_eq!(loader.list_file_types().len(), file_tags.len());
}

#[test]
fn registry_spans_every_family() {
    let loader = SchemaLoader::load(schema_root());
    let registry = loader.get_resolution_registry();

    // 2 container + 4 record + 1 primitive + 4 type + 1 enum schemas.
    assert_eq!(registry.len(), 12, "{:?}", registry.ids());
    for id in [
        format!("{BASE}/files/TransactionsFile.schema.json"),
        format!("{BASE}/objects/SecurityHolder.schema.json"),
        format!("{BASE}/primitives/Transaction.schema.json"),
        format!("{BASE}/types/Monetary.schema.json"),
        format!("{BASE}/enums/IssuanceType.schema.json"),
    ] {
        assert!(registry.contains(&id), "missing {id}");
    }
}

#[test]
fn get_schema_by_id_covers_auxiliary_schemas() {
    let loader = SchemaLoader::load(schema_root());
    let date = loader
        .get_schema_by_id(format!("{BASE}/types/Date.schema.json"))
        .unwrap();
    assert_eq!(date.title(), Some("Date"));
    assert!(date.object_type().is_none());

    assert!(loader.get_schema_by_id(format!("{BASE}/types/Nope.schema.json")).is_none());
    assert!(loader.get_schema_by_id("").is_none());
    assert!(loader.get_schema_by_id("::not-a-uri::").is_none());
}

#[test]
fn clear_cache_rebuilds_registry_and_keeps_indices() {
    let mut loader = SchemaLoader::load(schema_root());
    let before = loader.get_resolution_registry();
    let file_types: Vec<String> = loader.list_file_types().iter().map(|t| t.to_string()).collect();
    let object_types: Vec<String> = loader.list_object_types().iter().map(|t| t.to_string()).collect();

    loader.clear_cache();
    let after = loader.get_resolution_registry();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.ids(), after.ids());
    let file_types_after: Vec<String> = loader.list_file_types().iter().map(|t| t.to_string()).collect();
    let object_types_after: Vec<String> =
        loader.list_object_types().iter().map(|t| t.to_string()).collect();
    assert_eq!(file_types, file_types_after);
    assert_eq!(object_types, object_types_after);
}

#[test]
fn preload_subset_bootstraps_a_partial_corpus() {
    let root = schema_root();
    let mut loader = SchemaLoader::new(&root);
    let loaded = loader.preload_subset([
        root.join("objects/SecurityHolder.schema.json"),
        root.join("objects/Broken.schema.json"),
        root.join("objects/README.md"),
        root.join("files/StakeholdersFile.schema.json"),
    ]);
    assert_eq!(loaded, 2);
    assert!(loader.has_record_schema("SECURITY_HOLDER"));
    assert!(!loader.has_record_schema("TX_STOCK_ISSUANCE"));
    assert!(loader.get_container_schema("JOCF_STAKEHOLDERS_FILE").is_some());
}

#[test]
fn schema_info_reports_required_and_properties() {
    let loader = SchemaLoader::load(schema_root());
    let info = loader.schema_info(Some("JOCF_TRANSACTIONS_FILE"), Some("SECURITY_HOLDER"));

    let file = info.file_schema.unwrap();
    assert_eq!(file.title.as_deref(), Some("JOCF Transactions File"));
    assert_eq!(file.required, ["file_type", "items"]);

    let object = info.object_schema.unwrap();
    assert_eq!(object.properties, ["id", "name", "object_type"]);
    assert!(object.path.ends_with("objects/SecurityHolder.schema.json"));
}
