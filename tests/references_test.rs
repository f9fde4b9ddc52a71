//! Tests for sibling and context references.

use serde_json::json;
use valuate::{BuildError, Reference, Schema, ValidationOptions, Value, When};

#[test]
fn test_sibling_reference_resolves_regardless_of_key_order() {
    let schema = Schema::object().keys([
        ("confirm", Schema::any().valid([Reference::new("password")])),
        ("password", Schema::string().min(3)),
    ]);

    assert!(schema.validate(json!({"password": "secret", "confirm": "secret"})).is_ok());

    let error = schema
        .validate(json!({"password": "secret", "confirm": "other"}))
        .error
        .unwrap();
    assert_eq!(error.details[0].code, "any.allowOnly");
    assert_eq!(error.details[0].path.to_string(), "confirm");
}

#[test]
fn test_reference_sees_converted_sibling() {
    let schema = Schema::object().keys([
        ("low", Schema::number()),
        ("high", Schema::number().greater(Reference::new("low"))),
    ]);
    assert!(schema.validate(json!({"low": "2", "high": 3})).is_ok());
    let error = schema.validate(json!({"low": "4", "high": 3})).error.unwrap();
    assert_eq!(error.details[0].code, "number.greater");
    assert_eq!(error.details[0].message, "\"high\" must be greater than 4");
}

#[test]
fn test_dotted_reference() {
    let schema = Schema::object().keys([
        ("limits", Schema::object().keys([("max", Schema::number())])),
        ("value", Schema::number().max(Reference::new("limits.max"))),
    ]);
    assert!(schema.validate(json!({"limits": {"max": 10}, "value": 10})).is_ok());
    assert_eq!(
        schema
            .validate(json!({"limits": {"max": 10}, "value": 11}))
            .error
            .unwrap()
            .details[0]
            .code,
        "number.max"
    );
}

#[test]
fn test_reference_to_non_number_is_reported() {
    let schema = Schema::object().keys([
        ("a", Schema::any()),
        ("b", Schema::number().min(Reference::new("a"))),
    ]);
    let error = schema.validate(json!({"a": "x", "b": 1})).error.unwrap();
    assert_eq!(error.details[0].code, "number.ref");
    assert_eq!(error.details[0].context.get("ref"), Some(&Value::from("a")));
}

#[test]
fn test_context_references() {
    let schema = Schema::number().max(Reference::context("limit"));
    let options = ValidationOptions::default().with_context(json!({"limit": 3}));

    assert!(schema.validate_with(3, &options).is_ok());
    let error = schema.validate_with(4, &options).error.unwrap();
    assert_eq!(error.details[0].context.get("limit"), Some(&Value::from(3)));

    let prefixed = Schema::number().max(Reference::new("$limit"));
    assert!(Reference::new("$limit").is_context());
    assert!(prefixed.validate_with(4, &options).error.is_some());
}

#[test]
fn test_context_reference_in_allowed_values() {
    let schema = Schema::object().keys([
        ("a", Schema::any().valid([Reference::context("a")])),
        ("b", Schema::any()),
    ]);
    let options = ValidationOptions::default().with_context(json!({"a": 1}));
    assert!(schema.validate_with(json!({"a": 1}), &options).is_ok());
}

#[test]
fn test_default_from_reference() {
    let schema = Schema::object().keys([
        ("name", Schema::string()),
        ("display", Schema::string().default_ref(Reference::new("name"))),
    ]);
    let result = schema.validate(json!({"name": "ada"}));
    assert_eq!(result.value, Value::from(json!({"name": "ada", "display": "ada"})));
}

#[test]
fn test_when_on_any_schema_with_context_condition() {
    let schema = Schema::number()
        .when(
            Reference::context("strict"),
            When::is(true).then(Schema::number().integer()),
        )
        .unwrap();

    let strict = ValidationOptions::default().with_context(json!({"strict": true}));
    let lax = ValidationOptions::default().with_context(json!({"strict": false}));
    assert!(schema.validate_with(1.5, &lax).is_ok());
    assert_eq!(
        schema.validate_with(1.5, &strict).error.unwrap().details[0].code,
        "number.integer"
    );
}

#[test]
fn test_assert_requires_nested_reference() {
    let result = Schema::object().assert(Reference::new("a"), Schema::any(), None);
    assert_eq!(result.unwrap_err(), BuildError::RootAssertion("a".to_string()));
}

#[test]
fn test_assert_against_whole_object() {
    let schema = Schema::object()
        .keys([
            ("a", Schema::object().keys([("b", Schema::string())])),
            ("c", Schema::string()),
        ])
        .assert(Reference::new("a.b"), Reference::new("c"), None)
        .unwrap();

    assert!(schema.validate(json!({"a": {"b": "x"}, "c": "x"})).is_ok());
    let error = schema.validate(json!({"a": {"b": "x"}, "c": "y"})).error.unwrap();
    assert_eq!(error.details[0].code, "object.assert");
    assert_eq!(
        error.details[0].message,
        "\"a.b\" validation failed because \"a.b\" failed to pass the assertion test"
    );
}

#[test]
fn test_empty_reference_key_is_rejected() {
    assert!(matches!(Reference::try_new(""), Err(BuildError::InvalidArgument(_))));
}
