//! Unit tests for dependency edges and the dependency forest

use pretty_assertions::assert_eq;

use pg_autodoc::annotation::{annotate_model, KeywordError, ObjectType};
use pg_autodoc::config::Registries;
use pg_autodoc::dependency::{
    build_dependency_forest, build_forest, collect_edges, DependencyEdge, DependencyEndpoint,
    SchemaObjectRef,
};
use pg_autodoc::model::DatabaseModel;
use pg_autodoc::AutodocError;

use crate::common::{model_of, test_registries, SnapshotBuilder};

fn endpoint(object_type: ObjectType, schema: Option<&str>, object: &str) -> DependencyEndpoint {
    DependencyEndpoint::object(SchemaObjectRef::new(object_type, schema, object))
}

fn edge(source: &DependencyEndpoint, target: &DependencyEndpoint) -> DependencyEdge {
    DependencyEdge {
        source: source.clone(),
        target: target.clone(),
    }
}

fn annotated(snapshot: SnapshotBuilder, registries: &Registries) -> DatabaseModel {
    let mut model = model_of(&snapshot.build());
    annotate_model(&mut model, registries);
    model
}

// ============================================================================
// Object Identity
// ============================================================================

#[test]
fn test_ids_are_lowercase_triples() {
    let table = SchemaObjectRef::new(ObjectType::Table, Some("Public"), "Orders");
    assert_eq!(table.id, "table.public.orders");

    let matview = SchemaObjectRef::new(ObjectType::MaterializedView, Some("s"), "m");
    assert_eq!(matview.id, "materialized view.s.m");
}

#[test]
fn test_external_ids_have_empty_schema() {
    let layer = SchemaObjectRef::new(ObjectType::Layer, Some("ignored"), "Geo");
    assert_eq!(layer.schema, None);
    assert_eq!(layer.id, "layer..geo");
}

// ============================================================================
// Edges
// ============================================================================

#[test]
fn test_affects_reverses_edge() {
    let snapshot = SnapshotBuilder::new("db")
        .schema("public")
        .table("public", "a", Some("\\affects FUNCTION:public.calc"))
        .function("public", "calc", &[], None);
    let model = annotated(snapshot, &Registries::new());

    let edges = collect_edges(&model);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source.id(), "function.public.calc()");
    assert_eq!(edges[0].target.id(), "table.public.a");
}

#[test]
fn test_depends_keeps_direction() {
    let snapshot = SnapshotBuilder::new("db")
        .schema("public")
        .table("public", "a", Some("\\depends LAYER:geo"));
    let model = annotated(snapshot, &test_registries());

    let edges = collect_edges(&model);
    assert_eq!(edges[0].source.id(), "table.public.a");
    assert_eq!(edges[0].target.id(), "layer..geo");
    assert_eq!(edges[0].target.url.as_deref(), Some("http://x"));
}

#[test]
fn test_repeated_annotations_collapse() {
    let snapshot = SnapshotBuilder::new("db")
        .schema("public")
        .table(
            "public",
            "a",
            Some("\\affects SERVICE:svc and again \\affects SERVICE:Svc"),
        );
    let model = annotated(snapshot, &test_registries());

    assert_eq!(collect_edges(&model).len(), 1);
}

#[test]
fn test_keywords_without_arguments_make_no_edge() {
    let snapshot = SnapshotBuilder::new("db")
        .schema("public")
        .table("public", "a", Some("\\depends nothing \\note"));
    let model = annotated(snapshot, &Registries::new());

    assert!(collect_edges(&model).is_empty());
}

// ============================================================================
// Forest
// ============================================================================

#[test]
fn test_forest_expands_transitively() {
    let svc = endpoint(ObjectType::Service, None, "svc");
    let t1 = endpoint(ObjectType::Table, Some("public"), "t1");
    let t2 = endpoint(ObjectType::Table, Some("public"), "t2");

    let forest = build_forest(&[edge(&svc, &t1), edge(&t1, &t2)]).unwrap();

    assert_eq!(forest.roots.len(), 1);
    let root = forest.root("service..svc").unwrap();
    let child = root.child("table.public.t1").unwrap();
    assert!(child.child("table.public.t2").is_some());
    assert_eq!(forest.node_count(), 3);
}

#[test]
fn test_only_external_sources_are_roots() {
    let t1 = endpoint(ObjectType::Table, Some("public"), "t1");
    let t2 = endpoint(ObjectType::Table, Some("public"), "t2");

    let forest = build_forest(&[edge(&t1, &t2)]).unwrap();
    assert!(forest.is_empty());
}

#[test]
fn test_error_targets_are_leaves() {
    let layer = endpoint(ObjectType::Layer, None, "geo");
    let mut broken = endpoint(ObjectType::Table, Some("public"), "gone");
    broken.error = Some(KeywordError::NoSuchTableOrView);
    let other = endpoint(ObjectType::Table, Some("public"), "t3");

    let forest = build_forest(&[edge(&layer, &broken), edge(&broken, &other)]).unwrap();

    let leaf = forest
        .root("layer..geo")
        .unwrap()
        .child("table.public.gone")
        .unwrap();
    assert_eq!(leaf.attr.error, Some(KeywordError::NoSuchTableOrView));
    assert!(leaf.children.is_empty());
}

#[test]
fn test_cycle_is_rejected() {
    let svc = endpoint(ObjectType::Service, None, "svc");
    let a = endpoint(ObjectType::Table, Some("public"), "a");
    let b = endpoint(ObjectType::Table, Some("public"), "b");

    let err = build_forest(&[edge(&svc, &a), edge(&a, &b), edge(&b, &a)]).unwrap_err();
    match err.downcast_ref::<AutodocError>() {
        Some(AutodocError::CyclicDependency { id, chain }) => {
            assert_eq!(id, "table.public.a");
            assert_eq!(
                chain,
                "service..svc -> table.public.a -> table.public.b -> table.public.a"
            );
        }
        other => panic!("Expected CyclicDependency, got {:?}", other),
    }
}

#[test]
fn test_shared_subtree_under_different_parents() {
    let svc = endpoint(ObjectType::Service, None, "svc");
    let a = endpoint(ObjectType::Table, Some("public"), "a");
    let b = endpoint(ObjectType::Table, Some("public"), "b");
    let shared = endpoint(ObjectType::Table, Some("public"), "shared");

    let forest = build_forest(&[
        edge(&svc, &a),
        edge(&svc, &b),
        edge(&a, &shared),
        edge(&b, &shared),
    ])
    .unwrap();

    let root = forest.root("service..svc").unwrap();
    assert!(root.child("table.public.a").unwrap().child("table.public.shared").is_some());
    assert!(root.child("table.public.b").unwrap().child("table.public.shared").is_some());
}

#[test]
fn test_duplicate_child_is_rejected() {
    let svc = endpoint(ObjectType::Service, None, "svc");
    let a = endpoint(ObjectType::Table, Some("public"), "a");

    let err = build_forest(&[edge(&svc, &a), edge(&svc, &a)]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutodocError>(),
        Some(AutodocError::DuplicateChild { .. })
    ));
}

#[test]
fn test_forest_from_model_is_idempotent() {
    let snapshot = SnapshotBuilder::new("db")
        .schema("public")
        .table(
            "public",
            "t1",
            Some("\\affects SERVICE:svc \\depends TABLE:public.t2 \\depends TABLE:public.nope"),
        )
        .table("public", "t2", None);
    let registries = test_registries();
    let mut model = annotated(snapshot, &registries);

    let first = build_dependency_forest(&model).unwrap();
    annotate_model(&mut model, &registries);
    let second = build_dependency_forest(&model).unwrap();

    assert_eq!(first, second);
    let t1 = first
        .root("service..svc")
        .unwrap()
        .child("table.public.t1")
        .unwrap();
    assert!(t1.child("table.public.t2").is_some());
    assert_eq!(
        t1.child("table.public.nope").unwrap().attr.error,
        Some(KeywordError::NoSuchTableOrView)
    );
}
