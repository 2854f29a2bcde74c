//! Tests for the boolean composition keywords.

use caliper::{KeywordRegistry, SchemaFactory, ValidationErrors};
use serde_json::{json, Value};
use stillwater::Validation;

fn compile(document: Value) -> caliper::CompiledSchema {
    SchemaFactory::new(KeywordRegistry::standard())
        .compile(&document)
        .unwrap()
}

fn failure(schema: &caliper::CompiledSchema, instance: Value) -> ValidationErrors {
    match schema.validate(&instance).unwrap() {
        Validation::Failure(errors) => errors,
        Validation::Success(()) => panic!("expected {} to fail", instance),
    }
}

// ====== allOf ======

#[test]
fn test_all_of_succeeds_iff_every_branch_succeeds() {
    let schema = compile(json!({
        "allOf": [
            {"type": "integer"},
            {"minimum": 0}
        ]
    }));

    assert!(schema.validate(&json!(5)).unwrap().is_success());
    assert!(schema.validate(&json!(-1)).unwrap().is_failure());
    assert!(schema.validate(&json!("5")).unwrap().is_failure());
}

#[test]
fn test_all_of_aggregates_both_branch_failures() {
    let schema = compile(json!({
        "allOf": [
            {"type": "integer"},
            {"minLength": 10}
        ]
    }));

    // "abc" fails both branches; both errors are reported.
    let errors = failure(&schema, json!("abc"));
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.with_keyword("type").len(), 1);
    assert_eq!(errors.with_keyword("minLength").len(), 1);
}

// ====== anyOf ======

#[test]
fn test_any_of_accepts_either_branch() {
    let schema = compile(json!({
        "anyOf": [
            {"type": "string"},
            {"type": "integer"}
        ]
    }));

    assert!(schema.validate(&json!("hello")).unwrap().is_success());
    assert!(schema.validate(&json!(42)).unwrap().is_success());
}

#[test]
fn test_any_of_failure_reports_every_branch() {
    let schema = compile(json!({
        "anyOf": [
            {"type": "string"},
            {"type": "integer"}
        ]
    }));

    let errors = failure(&schema, json!(null));
    assert_eq!(errors.len(), 1);
    let error = errors.first();
    assert_eq!(error.keyword, "anyOf");
    assert_eq!(error.code, "any_of_none_matched");
    assert_eq!(error.children.len(), 2);
}

// ====== oneOf ======

#[test]
fn test_one_of_exactly_one_match() {
    let schema = compile(json!({
        "oneOf": [
            {"type": "string", "minLength": 1},
            {"type": "integer", "minimum": 1}
        ]
    }));

    assert!(schema.validate(&json!("hello")).unwrap().is_success());
    assert!(schema.validate(&json!(42)).unwrap().is_success());
}

#[test]
fn test_one_of_none_matched_lists_branch_failures() {
    let schema = compile(json!({
        "oneOf": [
            {"type": "string"},
            {"type": "integer"}
        ]
    }));

    let errors = failure(&schema, json!(true));
    let error = errors.first();
    assert_eq!(error.keyword, "oneOf");
    assert_eq!(error.code, "one_of_none_matched");
    assert_eq!(error.children.len(), 2);
}

#[test]
fn test_one_of_multiple_matched_is_distinct_failure() {
    let schema = compile(json!({
        "oneOf": [
            {"type": "integer"},
            {"minimum": 0}
        ]
    }));

    // 5 matches both branches.
    let errors = failure(&schema, json!(5));
    let error = errors.first();
    assert_eq!(error.code, "one_of_multiple_matched");
    assert!(error.message.contains("matched 2 schemas"));
}

// ====== not ======

#[test]
fn test_not_inverts_subschema() {
    let schema = compile(json!({"not": {"type": "string"}}));

    assert!(schema.validate(&json!(42)).unwrap().is_success());

    let errors = failure(&schema, json!("rejected"));
    assert_eq!(errors.first().keyword, "not");
}

// ====== composition ======

#[test]
fn test_combinators_compose_with_sibling_keywords() {
    let schema = compile(json!({
        "type": "integer",
        "anyOf": [
            {"minimum": 100},
            {"maximum": 0}
        ]
    }));

    assert!(schema.validate(&json!(150)).unwrap().is_success());
    assert!(schema.validate(&json!(-5)).unwrap().is_success());

    // 50 satisfies the type but neither branch.
    let errors = failure(&schema, json!(50));
    assert_eq!(errors.with_keyword("anyOf").len(), 1);

    // Strings pass both numeric branches (bounds only constrain numbers), so
    // only the type keyword reports.
    let errors = failure(&schema, json!("50"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().keyword, "type");
}

#[test]
fn test_nested_combinators() {
    let schema = compile(json!({
        "allOf": [
            {"not": {"type": "null"}},
            {"oneOf": [
                {"type": "string"},
                {"type": "boolean"}
            ]}
        ]
    }));

    assert!(schema.validate(&json!("ok")).unwrap().is_success());
    assert!(schema.validate(&json!(true)).unwrap().is_success());
    assert!(schema.validate(&json!(null)).unwrap().is_failure());
    assert!(schema.validate(&json!(3)).unwrap().is_failure());
}

#[test]
fn test_empty_combinator_array_is_a_compile_error() {
    let result = SchemaFactory::new(KeywordRegistry::standard()).compile(&json!({"allOf": []}));
    assert!(result.is_err());
}
