//! End-to-end documentation runs over on-disk snapshots

use pg_autodoc::render::Locale;
use pg_autodoc::{document_database, lint, AutodocError, DocumentOptions, OutputFormat};

use crate::common::{SnapshotBuilder, TestContext};

const CONFIG: &str = r#"{
    "layers": {
        "url": "http://maps/wms",
        "arguments_names": ["layers"],
        "arguments_values": { "geo": ["geo_layer"] }
    },
    "services": { "svc": "http://svc.example" }
}"#;

fn shop_snapshot() -> pg_autodoc::catalog::CatalogSnapshot {
    SnapshotBuilder::new("shop")
        .schema("public")
        .table(
            "public",
            "orders",
            Some("Orders.\n\\affects SERVICE:svc \\depends TABLE:public.customers"),
        )
        .column("public", "orders", "id", "integer")
        .table("public", "customers", Some("\\affects LAYER:geo"))
        .function("public", "calc", &["integer"], Some("\\param amount"))
        .build()
}

fn options(ctx: &TestContext, format: OutputFormat) -> DocumentOptions {
    DocumentOptions {
        catalog_path: ctx.write_catalog(&shop_snapshot()),
        config_path: Some(ctx.write_file("autodoc.json", CONFIG)),
        output_prefix: Some(ctx.output_prefix()),
        format,
        locale: Locale::En,
    }
}

// ============================================================================
// Document
// ============================================================================

#[test]
fn test_document_writes_json_and_dependencies() {
    let ctx = TestContext::new();
    let json_path = document_database(options(&ctx, OutputFormat::Html)).unwrap();

    assert_eq!(json_path, ctx.dir.join("out.json"));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();

    assert_eq!(json["database"], "shop");
    assert!(json["dumped_on"].as_str().is_some());
    assert_eq!(json["model"]["tables"].as_array().unwrap().len(), 2);
    assert!(json["forest"]["roots"]["service..svc"].is_object());
    assert!(json["forest"]["roots"]["layer..geo"].is_object());
    assert!(json["rendered_comments"]["table.public.orders"]
        .as_str()
        .unwrap()
        .contains("<a href=\"http://svc.example\">svc</a>"));

    let dependencies = std::fs::read_to_string(ctx.dir.join("out.dependencies.html")).unwrap();
    assert!(dependencies.starts_with("<ul>"));
    assert!(dependencies.contains("http://maps/wms?layers=geo_layer"));
}

#[test]
fn test_document_plain_format_extension() {
    let ctx = TestContext::new();
    document_database(options(&ctx, OutputFormat::Plain)).unwrap();

    let dependencies = std::fs::read_to_string(ctx.dir.join("out.dependencies.txt")).unwrap();
    assert!(dependencies.starts_with("- layer geo <http://maps/wms?layers=geo_layer>"));
    assert!(dependencies.contains("\n- service svc <http://svc.example>\n  - table public.orders"));
}

#[test]
fn test_document_without_dependencies_skips_section() {
    let ctx = TestContext::new();
    let snapshot = SnapshotBuilder::new("empty")
        .schema("public")
        .table("public", "t", Some("Nothing to see"))
        .build();
    let options = DocumentOptions {
        catalog_path: ctx.write_catalog(&snapshot),
        config_path: None,
        output_prefix: Some(ctx.output_prefix()),
        format: OutputFormat::DocBook,
        locale: Locale::Ru,
    };

    document_database(options).unwrap();
    assert!(ctx.dir.join("out.json").exists());
    assert!(!ctx.dir.join("out.dependencies.xml").exists());
}

#[test]
fn test_document_reports_broken_catalog() {
    let ctx = TestContext::new();
    let options = DocumentOptions {
        catalog_path: ctx.write_file("catalog.json", "{ not json"),
        config_path: None,
        output_prefix: Some(ctx.output_prefix()),
        format: OutputFormat::Html,
        locale: Locale::En,
    };

    let err = document_database(options).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutodocError>(),
        Some(AutodocError::CatalogParseError { .. })
    ));
}

#[test]
fn test_cyclic_annotations_abort_the_run() {
    let ctx = TestContext::new();
    let snapshot = SnapshotBuilder::new("loop")
        .schema("public")
        .table(
            "public",
            "a",
            Some("\\affects SERVICE:svc \\depends TABLE:public.b"),
        )
        .table("public", "b", Some("\\depends TABLE:public.a"))
        .build();
    let options = DocumentOptions {
        catalog_path: ctx.write_catalog(&snapshot),
        config_path: Some(ctx.write_file("autodoc.json", CONFIG)),
        output_prefix: Some(ctx.output_prefix()),
        format: OutputFormat::Html,
        locale: Locale::En,
    };

    let err = document_database(options).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutodocError>(),
        Some(AutodocError::CyclicDependency { .. })
    ));
    assert!(!ctx.dir.join("out.json").exists());
}

// ============================================================================
// Lint
// ============================================================================

#[test]
fn test_lint_lists_broken_annotations() {
    let ctx = TestContext::new();
    let snapshot = SnapshotBuilder::new("shop")
        .schema("public")
        .table(
            "public",
            "orders",
            Some("\\depends TABLE:public.gone \\depends LAYER:roads \\param x"),
        )
        .build();
    let catalog = ctx.write_catalog(&snapshot);
    let config = ctx.write_file("autodoc.json", CONFIG);

    let issues = lint(&catalog, Some(config.as_path())).unwrap();
    let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "public.orders: \\depends at 0: NO_SUCH_TABLE_OR_VIEW",
            "public.orders: \\depends at 27: NO_SUCH_LAYER",
            "public.orders: \\param at 48: UNEXPECTED_KEYWORD",
        ]
    );
}

#[test]
fn test_lint_clean_catalog() {
    let ctx = TestContext::new();
    let catalog = ctx.write_catalog(&shop_snapshot());
    let config = ctx.write_file("autodoc.json", CONFIG);

    assert!(lint(&catalog, Some(config.as_path())).unwrap().is_empty());
}
