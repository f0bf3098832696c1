//! Unit tests for annotation parsing and target resolution

use pretty_assertions::assert_eq;

use pg_autodoc::annotation::{
    annotate_comment, annotate_model, parse_comment, KeywordError, ObjectType, ResolvedTarget,
    TargetResolver,
};
use pg_autodoc::config::Registries;
use pg_autodoc::model::{DatabaseModel, TableKind};
use pg_autodoc::render::split_comment;

use crate::common::{model_of, test_registries, SnapshotBuilder};

fn test_model() -> DatabaseModel {
    let snapshot = SnapshotBuilder::new("shop")
        .schema("public")
        .table("public", "t1", Some("Orders. \\depends TABLE:public.t2"))
        .table("public", "t2", None)
        .relation("public", "v", "view", None)
        .function("public", "calc", &[], Some("Totals. \\param amount"))
        .build();
    model_of(&snapshot)
}

fn errors(comment: &str, model: &DatabaseModel, registries: &Registries) -> Vec<Option<KeywordError>> {
    let resolver = TargetResolver::new(model, registries);
    annotate_comment(Some(comment), true, &resolver)
        .iter()
        .map(|k| k.error)
        .collect()
}

// ============================================================================
// Parser Properties
// ============================================================================

#[test]
fn test_one_record_per_backslash_token() {
    let comment = "A \\depends TABLE:public.t1, \\nonsense and \\affects LAYER:geo \\param";
    let keywords = parse_comment(Some(comment), false);

    let expected: Vec<usize> = comment.match_indices('\\').map(|(i, _)| i).collect();
    let positions: Vec<usize> = keywords.iter().map(|k| k.position).collect();
    assert_eq!(positions, expected);
}

#[test]
fn test_segments_reconstruct_comment() {
    let comment = "Used by \\depends SERVICE:svc.\n\\param x is \\bogus; \\depends TABLE:";
    let keywords = parse_comment(Some(comment), true);

    let rebuilt: String = split_comment(comment, &keywords)
        .iter()
        .map(|s| s.raw())
        .collect();
    assert_eq!(rebuilt, comment);
}

#[test]
fn test_failed_arguments_cover_token_only() {
    let comment = "\\depends TABLE:";
    let keywords = parse_comment(Some(comment), false);

    assert_eq!(keywords[0].error, Some(KeywordError::ArgsParseError));
    assert_eq!(keywords[0].length_with_args, keywords[0].length);
    assert_eq!(keywords[0].length, "\\depends".len());
}

#[test]
fn test_argument_offsets_are_absolute() {
    let comment = "See \\depends VIEW: sales.summary";
    let keywords = parse_comment(Some(comment), false);
    let args = keywords[0].reference().unwrap();

    let schema = args.schema.as_ref().unwrap();
    assert_eq!(&comment[schema.position..schema.position + schema.length], "sales");
    assert_eq!(
        &comment[args.object.position..args.object.position + args.object.length],
        "summary"
    );
    assert_eq!(keywords[0].span().end, comment.len());
}

// ============================================================================
// Relation Resolution
// ============================================================================

#[test]
fn test_relation_errors() {
    let model = test_model();
    let registries = test_registries();

    assert_eq!(
        errors("\\depends TABLE: foo", &model, &registries),
        vec![Some(KeywordError::SchemaRequired)]
    );
    assert_eq!(
        errors("\\depends TABLE:bogus_schema.foo", &model, &registries),
        vec![Some(KeywordError::NoSuchSchema)]
    );
    assert_eq!(
        errors("\\depends TABLE:public.nonexistent", &model, &registries),
        vec![Some(KeywordError::NoSuchTableOrView)]
    );
}

#[test]
fn test_stored_kind_wins_over_annotated_tag() {
    let model = test_model();
    let registries = test_registries();
    let resolver = TargetResolver::new(&model, &registries);

    let keywords = annotate_comment(Some("\\depends TABLE:Public.V"), false, &resolver);
    assert_eq!(keywords[0].error, None);
    assert_eq!(
        keywords[0].target,
        Some(ResolvedTarget::Relation {
            kind: TableKind::View,
            schema: "public".to_string(),
            name: "v".to_string(),
        })
    );
    assert_eq!(keywords[0].target_type(), Some(ObjectType::View));
}

#[test]
fn test_unknown_object_type() {
    let model = test_model();
    let registries = test_registries();

    assert_eq!(
        errors("\\depends INDEX:public.t1", &model, &registries),
        vec![Some(KeywordError::UnexpectedObjectType)]
    );
    // tags are case-sensitive
    assert_eq!(
        errors("\\depends table:public.t1", &model, &registries),
        vec![Some(KeywordError::UnexpectedObjectType)]
    );
}

// ============================================================================
// Function Resolution
// ============================================================================

#[test]
fn test_function_resolves_to_signature() {
    let model = test_model();
    let registries = test_registries();
    let resolver = TargetResolver::new(&model, &registries);

    let keywords = annotate_comment(Some("\\affects FUNCTION:public.calc"), false, &resolver);
    assert_eq!(
        keywords[0].target,
        Some(ResolvedTarget::Function {
            schema: "public".to_string(),
            signature: "calc()".to_string(),
        })
    );
}

#[test]
fn test_function_errors() {
    let model = test_model();
    let registries = test_registries();

    assert_eq!(
        errors(
            "\\depends FUNCTION:calc \\depends FUNCTION:public.missing",
            &model,
            &registries
        ),
        vec![
            Some(KeywordError::SchemaRequired),
            Some(KeywordError::NoSuchFunction)
        ]
    );
}

// ============================================================================
// Layer and Service Resolution
// ============================================================================

#[test]
fn test_layer_resolves_from_registry() {
    let model = test_model();
    let registries = test_registries();
    let resolver = TargetResolver::new(&model, &registries);

    let keywords = annotate_comment(Some("\\depends LAYER:geo"), false, &resolver);
    assert_eq!(keywords[0].error, None);
    assert_eq!(keywords[0].target.as_ref().and_then(|t| t.url()), Some("http://x"));

    assert_eq!(
        errors("\\depends LAYER:roads", &model, &registries),
        vec![Some(KeywordError::NoSuchLayer)]
    );
}

#[test]
fn test_service_lookup_ignores_case() {
    let model = test_model();
    let registries = test_registries();

    assert_eq!(
        errors("\\affects SERVICE:SVC \\affects SERVICE:mail", &model, &registries),
        vec![None, Some(KeywordError::NoSuchService)]
    );
}

// ============================================================================
// Whole-Model Annotation
// ============================================================================

#[test]
fn test_annotate_model_assigns_keywords_to_owners() {
    let mut model = test_model();
    annotate_model(&mut model, &test_registries());

    let t1 = model.table("public", "t1").unwrap();
    assert_eq!(t1.keywords.len(), 1);
    assert!(t1.keywords[0].target.is_some());

    let calc = model.function_named("public", "calc").unwrap();
    assert_eq!(calc.keywords.len(), 1);
    assert_eq!(calc.keywords[0].error, None);
    assert_eq!(calc.keywords[0].param().unwrap().name.value, "amount");
}

#[test]
fn test_param_in_table_description_is_unexpected() {
    let snapshot = SnapshotBuilder::new("shop")
        .schema("public")
        .table("public", "t", Some("\\param x"))
        .build();
    let mut model = model_of(&snapshot);
    annotate_model(&mut model, &Registries::new());

    let keywords = &model.table("public", "t").unwrap().keywords;
    assert_eq!(keywords[0].error, Some(KeywordError::UnexpectedKeyword));
}

#[test]
fn test_annotation_is_idempotent() {
    let mut model = test_model();
    let registries = test_registries();

    annotate_model(&mut model, &registries);
    let first: Vec<_> = model.tables().map(|t| t.keywords.clone()).collect();
    annotate_model(&mut model, &registries);
    let second: Vec<_> = model.tables().map(|t| t.keywords.clone()).collect();

    assert_eq!(first, second);
}
