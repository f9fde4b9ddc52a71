//! End-to-end validation scenarios.

use serde_json::json;
use valuate::{Reference, Schema, Unique, ValidationOptions, Value, When};

fn codes(result: &valuate::ValidationResult) -> Vec<String> {
    result
        .error
        .as_ref()
        .map(|error| error.details.iter().map(|d| d.code.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_basic_object() {
    let schema = Schema::object().keys([
        ("a", Schema::number().required()),
        ("b", Schema::string().default("x")),
    ]);

    let result = schema.validate(json!({"a": 5}));
    assert!(result.error.is_none());
    assert_eq!(result.value, Value::from(json!({"a": 5, "b": "x"})));

    let error = schema.validate(json!({})).error.unwrap();
    let detail = error.with_code("any.required")[0];
    assert_eq!(detail.path.to_string(), "a");
    assert_eq!(detail.message, "\"a\" is required");
}

#[test]
fn test_array_uniqueness() {
    let schema = Schema::array().items([Schema::number()]).unique(Unique::default());

    let error = schema.validate(json!([1, 2, 2])).error.unwrap();
    assert_eq!(error.details.len(), 1);
    let detail = &error.details[0];
    assert_eq!(detail.code, "array.unique");
    assert_eq!(detail.context.get("dupePos"), Some(&Value::from(1)));
    assert_eq!(detail.context.get("pos"), Some(&Value::from(2)));
    assert_eq!(detail.path.to_string(), "[2]");

    assert!(schema.validate(json!([1, 2, 3])).is_ok());
}

#[test]
fn test_alternatives_when() {
    let schema = Schema::object().keys([
        ("kind", Schema::string()),
        (
            "val",
            Schema::alternatives()
                .when(
                    "kind",
                    When::is("num").then(Schema::number()).otherwise(Schema::string()),
                )
                .unwrap(),
        ),
    ]);

    assert!(schema.validate(json!({"kind": "num", "val": 5})).is_ok());
    assert!(schema.validate(json!({"kind": "text", "val": "x"})).is_ok());

    let result = schema.validate(json!({"kind": "num", "val": "x"}));
    assert_eq!(codes(&result), vec!["number.base"]);
    assert_eq!(result.error.unwrap().details[0].path.to_string(), "val");
}

#[test]
fn test_string_pipeline_order() {
    let schema = Schema::string().trim().uppercase();
    let options = ValidationOptions::default().with_convert(true);

    let result = schema.validate_with("  ab  ", &options);
    assert!(result.is_ok());
    assert_eq!(result.value, Value::from("AB"));
}

#[test]
fn test_string_pipeline_without_conversion() {
    let schema = Schema::string().trim();
    let options = ValidationOptions::default().with_convert(false);

    let result = schema.validate_with("  ab  ", &options);
    assert_eq!(codes(&result), vec!["string.trim"]);
}

#[test]
fn test_reference_bound_comparison() {
    let schema = Schema::object().keys([
        ("min", Schema::number()),
        ("max", Schema::number().min(Reference::new("min"))),
    ]);

    let error = schema.validate(json!({"min": 5, "max": 3})).error.unwrap();
    assert_eq!(error.details[0].code, "number.min");
    assert_eq!(error.details[0].context.get("limit"), Some(&Value::from(5)));
    assert_eq!(error.details[0].path.to_string(), "max");

    assert!(schema.validate(json!({"min": 5, "max": 5})).is_ok());
}

#[test]
fn test_default_round_trip() {
    let schema = Schema::string().default("fallback");
    let result = schema.validate(Value::Undefined);
    assert!(result.is_ok());
    assert_eq!(result.value, Value::from("fallback"));

    let computed = Schema::number().default_fn("answer", |_, _| Ok(Value::from(42)));
    assert_eq!(computed.validate(Value::Undefined).value, Value::from(42));
}

#[test]
fn test_defaults_are_skipped_with_no_defaults() {
    let schema = Schema::object().keys([("b", Schema::string().default("x"))]);
    let options = ValidationOptions::default().with_no_defaults(true);
    let result = schema.validate_with(json!({}), &options);
    assert_eq!(result.value, Value::from(json!({})));
}

#[test]
fn test_concat_disjoint_keys() {
    let a = Schema::object().keys([("a", Schema::number().required())]);
    let b = Schema::object().keys([("b", Schema::string().required())]);
    let both = a.clone().concat(b.clone()).unwrap();

    assert!(a.validate(json!({"a": 1})).is_ok());
    assert!(b.validate(json!({"b": "x"})).is_ok());
    assert!(both.validate(json!({"a": 1, "b": "x"})).is_ok());

    assert!(both.validate(json!({"a": "x", "b": "x"})).error.is_some());
    assert!(both.validate(json!({"a": 1})).error.is_some());
}

#[test]
fn test_nested_errors_collect_with_abort_early_disabled() {
    let schema = Schema::object().keys([
        (
            "user",
            Schema::object().keys([
                ("name", Schema::string().min(2)),
                ("tags", Schema::array().items([Schema::string()])),
            ]),
        ),
        ("count", Schema::number().integer()),
    ]);
    let options = ValidationOptions::default().with_abort_early(false);
    let input = json!({"user": {"name": "a", "tags": ["ok", 3]}, "count": 1.5});

    let error = schema.validate_with(input, &options).error.unwrap();
    let found: Vec<(String, String)> = error
        .details
        .iter()
        .map(|d| (d.path.to_string(), d.code.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("user.name".to_string(), "string.min".to_string()),
            ("user.tags[1]".to_string(), "string.base".to_string()),
            ("count".to_string(), "number.integer".to_string()),
        ]
    );
}

#[test]
fn test_conversion_is_reflected_in_output() {
    let schema = Schema::object().keys([
        ("when", Schema::date()),
        ("flag", Schema::boolean()),
        ("n", Schema::number()),
        ("list", Schema::array().items([Schema::number()]).single(true)),
    ]);
    let result = schema.validate(json!({
        "when": "2020-01-02T03:04:05.000Z",
        "flag": "true",
        "n": "12",
        "list": "7"
    }));
    assert!(result.is_ok());
    let Value::Object(map) = &result.value else {
        panic!("expected an object");
    };
    assert!(matches!(map.get("when"), Some(Value::Date(_))));
    assert_eq!(map.get("flag"), Some(&Value::Bool(true)));
    assert_eq!(map.get("n"), Some(&Value::from(12)));
    assert_eq!(map.get("list"), Some(&Value::from(json!([7]))));
}
