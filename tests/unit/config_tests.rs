//! Unit tests for config loading and registries

use pretty_assertions::assert_eq;
use std::io::Write;

use tempfile::NamedTempFile;

use pg_autodoc::config::{load_config, FilterPattern};
use pg_autodoc::AutodocError;

/// Helper to create a temp config file with content
fn create_config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = create_config_file(
        r#"{
            "schemas_whitelist_regex": "^(public|geo)$",
            "schemas_blacklist_regex": ["^pg_", "temp"],
            "schema_tweaks": {
                "public": { "tables_blacklist_regex": "_old$" }
            },
            "layers": {
                "url": "http://maps/wms",
                "arguments_names": ["layers"],
                "arguments_values": { "Roads": ["roads"] }
            },
            "services": { "Billing": "http://billing" }
        }"#,
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(
        config.schemas_blacklist_regex,
        Some(FilterPattern::Parts(vec!["^pg_".to_string(), "temp".to_string()]))
    );
    let schemas = config.schema_filter().unwrap();
    assert!(schemas.accepts("public"));
    assert!(!schemas.accepts("audit"));

    let tables = config.table_filter("public").unwrap();
    assert!(!tables.accepts("orders_old"));
    assert!(config.table_filter("geo").unwrap().accepts("orders_old"));

    let registries = config.registries();
    assert_eq!(registries.layer("roads").unwrap().url, "http://maps/wms?layers=roads");
    assert_eq!(registries.service("billing").unwrap().name, "Billing");
}

#[test]
fn test_empty_config_accepts_everything() {
    let file = create_config_file("{}");
    let config = load_config(file.path()).unwrap();

    assert!(config.schema_filter().unwrap().accepts("anything"));
    assert_eq!(config.registries().layer_count(), 0);
}

#[test]
fn test_missing_config_file() {
    let err = load_config(std::path::Path::new("/nonexistent/autodoc.json")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutodocError>(),
        Some(AutodocError::ConfigReadError { .. })
    ));
}

#[test]
fn test_malformed_config_file() {
    let file = create_config_file("{ \"services\": [1, 2] }");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutodocError>(),
        Some(AutodocError::ConfigParseError { .. })
    ));
}
