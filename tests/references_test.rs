//! Tests for `$ref` resolution: pointer fragments, definitions, external
//! documents, and scope handling.

use std::sync::Arc;

use caliper::{InMemoryResolver, KeywordRegistry, SchemaFactory};
use serde_json::{json, Value};
use stillwater::Validation;
use url::Url;

fn factory() -> SchemaFactory {
    SchemaFactory::new(KeywordRegistry::standard())
}

fn compile(document: Value) -> caliper::CompiledSchema {
    factory().compile(&document).unwrap()
}

#[test]
fn test_ref_into_defs() {
    let schema = compile(json!({
        "$defs": {"name": {"type": "string", "minLength": 1}},
        "properties": {"name": {"$ref": "#/$defs/name"}}
    }));

    assert!(schema.validate(&json!({"name": "Ada"})).unwrap().is_success());

    let result = schema.validate(&json!({"name": ""})).unwrap();
    match result {
        Validation::Failure(errors) => {
            assert_eq!(errors.first().keyword, "minLength");
            assert_eq!(errors.first().path.to_string(), "name");
        }
        Validation::Success(()) => panic!("expected failure"),
    }
}

#[test]
fn test_legacy_definitions_container() {
    let schema = compile(json!({
        "definitions": {"port": {"type": "integer", "minimum": 1, "maximum": 65535}},
        "properties": {"port": {"$ref": "#/definitions/port"}}
    }));

    assert!(schema.validate(&json!({"port": 8080})).unwrap().is_success());
    assert!(schema.validate(&json!({"port": 0})).unwrap().is_failure());
}

#[test]
fn test_sibling_branches_share_a_definition() {
    // Two properties referencing the same definition is legitimate reuse,
    // not a cycle.
    let schema = compile(json!({
        "$defs": {"id": {"type": "integer", "minimum": 1}},
        "properties": {
            "owner": {"$ref": "#/$defs/id"},
            "assignee": {"$ref": "#/$defs/id"}
        }
    }));

    assert!(schema
        .validate(&json!({"owner": 1, "assignee": 2}))
        .unwrap()
        .is_success());

    let result = schema
        .validate(&json!({"owner": 0, "assignee": 0}))
        .unwrap();
    match result {
        Validation::Failure(errors) => {
            // Both branches report independently.
            assert_eq!(errors.len(), 2);
        }
        Validation::Success(()) => panic!("expected failure"),
    }
}

#[test]
fn test_external_reference_through_resolver() {
    let resolver = InMemoryResolver::new().with_document(
        "https://example.com/schemas/address",
        json!({
            "type": "object",
            "properties": {"city": {"type": "string"}},
            "required": ["city"]
        }),
    );

    let schema = factory()
        .with_resolver(Arc::new(resolver))
        .compile(&json!({
            "properties": {"address": {"$ref": "https://example.com/schemas/address"}}
        }))
        .unwrap();

    assert!(schema
        .validate(&json!({"address": {"city": "Oslo"}}))
        .unwrap()
        .is_success());
    assert!(schema
        .validate(&json!({"address": {}}))
        .unwrap()
        .is_failure());
}

#[test]
fn test_relative_reference_against_base_scope() {
    let resolver = InMemoryResolver::new()
        .with_document("https://example.com/schemas/item", json!({"type": "integer"}));

    let base = Url::parse("https://example.com/schemas/list").unwrap();
    let schema = factory()
        .with_resolver(Arc::new(resolver))
        .compile_at(&json!({"items": {"$ref": "item"}}), base)
        .unwrap();

    assert!(schema.validate(&json!([1, 2])).unwrap().is_success());
    assert!(schema.validate(&json!(["x"])).unwrap().is_failure());
}

#[test]
fn test_id_rescopes_subtree() {
    // The nested `$id` changes the scope, so the inner `$ref` resolves
    // against it rather than the root.
    let resolver = InMemoryResolver::new()
        .with_document("https://other.example/leaf", json!({"type": "boolean"}));

    let base = Url::parse("https://example.com/root").unwrap();
    let schema = factory()
        .with_resolver(Arc::new(resolver))
        .compile_at(
            &json!({
                "properties": {
                    "flag": {
                        "$id": "https://other.example/nested",
                        "$ref": "leaf"
                    }
                }
            }),
            base,
        )
        .unwrap();

    assert!(schema.validate(&json!({"flag": true})).unwrap().is_success());
    assert!(schema.validate(&json!({"flag": 1})).unwrap().is_failure());
}

#[test]
fn test_ref_to_id_named_definition() {
    let schema = compile(json!({
        "$id": "https://example.com/root",
        "$defs": {
            "item": {"$id": "https://example.com/item", "type": "integer"}
        },
        "items": {"$ref": "item"}
    }));

    assert!(schema.validate(&json!([1, 2, 3])).unwrap().is_success());
    assert!(schema.validate(&json!(["a"])).unwrap().is_failure());
}

#[test]
fn test_external_pointer_fragment() {
    let resolver = InMemoryResolver::new().with_document(
        "https://example.com/common",
        json!({
            "$defs": {"uuid": {"type": "string", "minLength": 36, "maxLength": 36}}
        }),
    );

    let schema = factory()
        .with_resolver(Arc::new(resolver))
        .compile(&json!({
            "properties": {"id": {"$ref": "https://example.com/common#/$defs/uuid"}}
        }))
        .unwrap();

    assert!(schema
        .validate(&json!({"id": "123e4567-e89b-42d3-a456-426614174000"}))
        .unwrap()
        .is_success());
    assert!(schema.validate(&json!({"id": "short"})).unwrap().is_failure());
}

#[test]
fn test_ref_siblings_also_apply() {
    let schema = compile(json!({
        "$defs": {"num": {"type": "integer"}},
        "$ref": "#/$defs/num",
        "minimum": 10
    }));

    assert!(schema.validate(&json!(15)).unwrap().is_success());
    assert!(schema.validate(&json!(5)).unwrap().is_failure());
    assert!(schema.validate(&json!("15")).unwrap().is_failure());
}

#[test]
fn test_unresolvable_reference_fails_compilation() {
    let result = factory().compile(&json!({"$ref": "https://example.com/absent"}));
    assert!(result.is_err());
}

#[test]
fn test_compiled_schema_has_no_unresolved_references() {
    let schema = compile(json!({
        "$defs": {
            "a": {"$ref": "#/$defs/b"},
            "b": {"type": "string"}
        },
        "$ref": "#/$defs/a"
    }));

    assert!(schema.unresolved_references().is_empty());
    assert!(schema.validate(&json!("ok")).unwrap().is_success());
    assert!(schema.validate(&json!(1)).unwrap().is_failure());
}
