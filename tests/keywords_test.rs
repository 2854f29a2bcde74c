//! Tests for the built-in keyword families against compiled documents.

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

#[test]
fn test_integer_minimum_example() {
    let schema = compile(json!({"type": "integer", "minimum": 0}));

    assert!(schema.validate(&json!(5)).unwrap().is_success());

    let errors = failure(&schema, json!(-1));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().keyword, "minimum");
    assert!(errors.first().path.is_root());

    let errors = failure(&schema, json!("5"));
    assert_eq!(errors.first().keyword, "type");
    assert!(errors.first().path.is_root());
}

#[test]
fn test_properties_required_example() {
    let schema = compile(json!({
        "properties": {"a": {"type": "string"}},
        "required": ["a"]
    }));

    let errors = failure(&schema, json!({"a": 1}));
    assert_eq!(errors.first().keyword, "type");
    assert_eq!(errors.first().path.to_string(), "a");

    let errors = failure(&schema, json!({}));
    assert_eq!(errors.first().keyword, "required");
    assert!(errors.first().path.is_root());
}

#[test]
fn test_multiple_violations_all_reported() {
    let schema = compile(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "minLength": 3},
            "age": {"type": "integer", "minimum": 0}
        },
        "required": ["name", "age", "email"]
    }));

    let errors = failure(&schema, json!({"name": "ab", "age": -1}));
    assert_eq!(errors.with_keyword("minLength").len(), 1);
    assert_eq!(errors.with_keyword("minimum").len(), 1);
    assert_eq!(errors.with_keyword("required").len(), 1);
}

#[test]
fn test_enum_and_const() {
    let schema = compile(json!({"enum": ["red", "green", "blue"]}));
    assert!(schema.validate(&json!("green")).unwrap().is_success());
    assert_eq!(failure(&schema, json!("teal")).first().keyword, "enum");

    let schema = compile(json!({"const": {"version": 1}}));
    assert!(schema.validate(&json!({"version": 1})).unwrap().is_success());
    assert_eq!(failure(&schema, json!({"version": 2})).first().keyword, "const");
}

#[test]
fn test_numeric_bounds() {
    let schema = compile(json!({
        "exclusiveMinimum": 0,
        "exclusiveMaximum": 100,
        "multipleOf": 5
    }));

    assert!(schema.validate(&json!(25)).unwrap().is_success());
    assert_eq!(failure(&schema, json!(0)).first().keyword, "exclusiveMinimum");
    assert_eq!(failure(&schema, json!(100)).first().keyword, "exclusiveMaximum");
    assert_eq!(failure(&schema, json!(7)).first().keyword, "multipleOf");
    // Non-numbers are the type keyword's concern.
    assert!(schema.validate(&json!("7")).unwrap().is_success());
}

#[test]
fn test_string_constraints() {
    let schema = compile(json!({
        "type": "string",
        "minLength": 2,
        "maxLength": 5,
        "pattern": "^[a-z]+$"
    }));

    assert!(schema.validate(&json!("abc")).unwrap().is_success());
    assert_eq!(failure(&schema, json!("a")).first().keyword, "minLength");
    assert_eq!(failure(&schema, json!("abcdef")).first().keyword, "maxLength");
    assert_eq!(failure(&schema, json!("ABC")).first().keyword, "pattern");
}

#[test]
fn test_array_items_and_bounds() {
    let schema = compile(json!({
        "type": "array",
        "items": {"type": "integer"},
        "minItems": 1,
        "maxItems": 3,
        "uniqueItems": true
    }));

    assert!(schema.validate(&json!([1, 2, 3])).unwrap().is_success());
    assert_eq!(failure(&schema, json!([])).first().keyword, "minItems");
    assert_eq!(failure(&schema, json!([1, 2, 3, 4])).first().keyword, "maxItems");
    assert_eq!(failure(&schema, json!([1, 1])).first().keyword, "uniqueItems");

    let errors = failure(&schema, json!([1, "two"]));
    assert_eq!(errors.first().keyword, "type");
    assert_eq!(errors.first().path.to_string(), "[1]");
}

#[test]
fn test_prefix_items_then_items() {
    let schema = compile(json!({
        "prefixItems": [{"type": "string"}, {"type": "integer"}],
        "items": {"type": "boolean"}
    }));

    assert!(schema
        .validate(&json!(["name", 3, true, false]))
        .unwrap()
        .is_success());

    let errors = failure(&schema, json!(["name", 3, "not a bool"]));
    assert_eq!(errors.first().path.to_string(), "[2]");
}

#[test]
fn test_contains() {
    let schema = compile(json!({"contains": {"type": "integer", "minimum": 10}}));

    assert!(schema.validate(&json!([1, "x", 12])).unwrap().is_success());

    let errors = failure(&schema, json!([1, 2]));
    assert_eq!(errors.first().keyword, "contains");
    assert!(!errors.first().children.is_empty());
}

#[test]
fn test_additional_properties_false() {
    let schema = compile(json!({
        "properties": {"known": {"type": "integer"}},
        "additionalProperties": false
    }));

    assert!(schema.validate(&json!({"known": 1})).unwrap().is_success());

    let errors = failure(&schema, json!({"known": 1, "extra": 2}));
    assert_eq!(errors.first().keyword, "additionalProperties");
    assert_eq!(errors.first().path.to_string(), "extra");
}

#[test]
fn test_additional_properties_schema() {
    let schema = compile(json!({
        "properties": {"id": {"type": "integer"}},
        "additionalProperties": {"type": "string"}
    }));

    assert!(schema
        .validate(&json!({"id": 1, "note": "fine"}))
        .unwrap()
        .is_success());

    let errors = failure(&schema, json!({"id": 1, "note": 2}));
    assert_eq!(errors.first().path.to_string(), "note");
    assert_eq!(errors.first().keyword, "type");
}

#[test]
fn test_pattern_properties() {
    let schema = compile(json!({
        "patternProperties": {"^x-": {"type": "string"}},
        "additionalProperties": false
    }));

    assert!(schema.validate(&json!({"x-tag": "v"})).unwrap().is_success());
    assert_eq!(
        failure(&schema, json!({"x-tag": 3})).first().keyword,
        "type"
    );
    assert_eq!(
        failure(&schema, json!({"plain": "v"})).first().keyword,
        "additionalProperties"
    );
}

#[test]
fn test_deeply_nested_paths() {
    let schema = compile(json!({
        "properties": {
            "users": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"email": {"type": "string"}},
                    "required": ["email"]
                }
            }
        }
    }));

    let errors = failure(
        &schema,
        json!({"users": [{"email": "a@b"}, {"email": 42}]}),
    );
    assert_eq!(errors.first().path.to_string(), "users[1].email");
}

#[test]
fn test_driving_the_engine_with_an_explicit_context() {
    let schema = compile(json!({"type": "string"}));

    let mut context = schema.new_context();
    let result = schema
        .root()
        .validate_in_context(&json!("ok"), &caliper::JsonPath::root(), &mut context)
        .unwrap();
    assert!(result.is_success());

    // The context is reusable within one logical validation pass and ends
    // balanced.
    let result = schema
        .root()
        .validate_in_context(&json!(3), &caliper::JsonPath::root(), &mut context)
        .unwrap();
    assert!(result.is_failure());
}

#[test]
fn test_validation_does_not_mutate_instance() {
    let schema = compile(json!({"type": "object", "required": ["a"]}));
    let instance = json!({"b": [1, 2, 3]});
    let snapshot = instance.clone();

    let _ = schema.validate(&instance).unwrap();
    assert_eq!(instance, snapshot);
}
