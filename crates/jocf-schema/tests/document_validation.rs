//! Integration test: validate the sample documents under
//! `tests/fixtures/documents/` against the fixture corpus, end to end
//! through [`JsonValidator`].

use std::path::PathBuf;

use jocf_schema::{
    ContainerValidator, JsonValidator, RecordValidator, SchemaLoader, ValidatorConfig,
};
use serde_json::json;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn validator() -> JsonValidator {
    let mut config = ValidatorConfig::default();
    config.schema.root_path = fixtures().join("schema");
    JsonValidator::from_config(&config)
}

#[test]
fn security_holder_with_exact_attributes_is_valid() {
    let loader = SchemaLoader::load(fixtures().join("schema"));
    let mut records = RecordValidator::new(&loader);
    let result =
        records.validate_record(&json!({"object_type": "SECURITY_HOLDER", "id": "h1", "name": "Acme"}));
    assert!(result.is_valid(), "{:?}", result.errors());
}

#[test]
fn unknown_object_type_is_a_lookup_failure() {
    let loader = SchemaLoader::load(fixtures().join("schema"));
    let mut records = RecordValidator::new(&loader);
    let failed_before = records.stats().failed_validations;

    let result = records.validate_record(&json!({"object_type": "UNKNOWN_X"}));
    assert!(!result.is_valid());
    assert_eq!(result.error_count(), 1);
    assert!(result.errors()[0].contains("UNKNOWN_X"));
    assert_eq!(records.stats().failed_validations, failed_before + 1);
}

#[test]
fn validate_many_reports_only_the_failing_member() {
    let loader = SchemaLoader::load(fixtures().join("schema"));
    let mut records = RecordValidator::new(&loader);
    let result = records.validate_many(&[
        json!({"object_type": "SECURITY_HOLDER", "id": "h1", "name": "Acme"}),
        json!({"object_type": "UNKNOWN_X"}),
    ]);
    assert!(!result.is_valid());
    assert_eq!(result.error_count(), 1);
    assert!(result.errors()[0].starts_with("Item 1: "));
}

#[test]
fn refs_resolve_across_files_and_relative_paths() {
    let loader = SchemaLoader::load(fixtures().join("schema"));
    let mut records = RecordValidator::new(&loader);

    let transfer = json!({
        "object_type": "TX_STOCK_TRANSFER",
        "id": "tr-1",
        "date": "2024-03-01",
        "security_id": "CS-1",
        "quantity": "250",
        "resulting_security_ids": ["CS-2"]
    });
    let ok = records.validate_record(&transfer);
    assert!(ok.is_valid(), "{:?}", ok.errors());

    let mut bad = transfer.clone();
    bad["quantity"] = json!("two hundred");
    bad.as_object_mut().unwrap().remove("security_id");
    let result = records.validate_record(&bad);
    assert_eq!(result.error_count(), 2, "{:?}", result.errors());
    assert!(result.errors().iter().any(|e| e.contains("at quantity:")));
    assert!(result.errors().iter().any(|e| e.contains("at root:")));
}

#[test]
fn test_valid_transactions_file() {
    let mut validator = validator();
    let result = validator.validate(fixtures().join("documents/valid_transactions.jocf.json"));
    assert!(result.is_valid(), "{:?}", result.errors());
    assert_eq!(result.validated_objects(), 2);
}

#[test]
fn test_invalid_transactions_file_reports_every_item() {
    let mut validator = validator();
    let result = validator.validate(fixtures().join("documents/invalid_transactions.jocf.json"));
    assert!(!result.is_valid());

    let errors = result.errors();
    assert_eq!(errors.len(), 5, "{errors:#?}");
    assert!(errors.iter().any(|e| e.starts_with("object validation error in items[1]: ")
        && e.contains("at quantity:")));
    assert!(errors.iter().any(|e| e.starts_with("object validation error in items[1]: ")
        && e.contains("at share_price.currency:")));
    assert!(errors
        .iter()
        .any(|e| e == "object_type 'UNKNOWN_X' is not allowed in file_type 'JOCF_TRANSACTIONS_FILE'"));
    assert!(errors.iter().any(|e| e
        == "object validation error in items[2]: no schema found for object_type 'UNKNOWN_X'"));
    assert!(errors.iter().any(|e| e.starts_with("object validation error in items[3]: ")
        && e.contains("at date:")));
    assert!(!errors.iter().any(|e| e.contains("items[0]")));

    let summary = result.summary();
    assert_eq!(summary.total_errors, 5);
    assert_eq!(summary.error_categories.object_validation_errors, 4);
    assert_eq!(summary.error_categories.type_check_errors, 1);
}

#[test]
fn stakeholders_with_nested_issuer() {
    let mut validator = validator();
    let result = validator.validate(fixtures().join("documents/stakeholders.jocf.json"));
    assert!(result.is_valid(), "{:?}", result.errors());
    assert_eq!(result.validated_objects(), 3);
}

#[test]
fn yaml_document_is_validated() {
    let mut validator = validator();
    let result = validator.validate(fixtures().join("documents/stakeholders.yaml"));
    assert_eq!(result.error_count(), 1, "{:?}", result.errors());
    assert!(result.errors()[0].starts_with("object validation error in items[1]: "));
}

#[test]
fn validation_is_deterministic() {
    let mut validator = validator();
    let path = fixtures().join("documents/invalid_transactions.jocf.json");
    let first = validator.validate(&path);
    let second = validator.validate(&path);
    assert_eq!(first.is_valid(), second.is_valid());
    assert_eq!(first.errors(), second.errors());
}

#[test]
fn directory_aggregate() {
    let mut validator = validator();
    let aggregate = validator.validate_directory(fixtures().join("documents"), None);

    // The YAML sample does not match the default `.jocf.json` suffix.
    assert_eq!(aggregate.total(), 4);
    assert_eq!(aggregate.valid(), 2);
    assert_eq!(aggregate.invalid(), 2);
    assert_eq!(aggregate.total(), aggregate.valid() + aggregate.invalid());
    assert!(!aggregate.is_valid());
    assert_eq!(
        aggregate.all_errors().len(),
        aggregate.total_stats().total_errors
    );

    let json: serde_json::Value = serde_json::from_str(&aggregate.to_json(false).unwrap()).unwrap();
    assert_eq!(json["total"], 4);
    assert_eq!(json["results"].as_array().unwrap().len(), 4);
}

#[test]
fn container_validator_over_shared_loader() {
    let loader = SchemaLoader::load(fixtures().join("schema"));
    let mut a = ContainerValidator::new(&loader);
    let mut b = ContainerValidator::new(&loader);
    let doc = json!({"file_type": "JOCF_STAKEHOLDERS_FILE", "items": []});
    assert!(a.validate(&doc).is_valid());
    assert!(b.validate(&doc).is_valid());
}
