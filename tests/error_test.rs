//! Integration tests for the validation error surface.

use serde_json::json;
use stillwater::Validation;
use valuate::{
    context, CustomError, ErrorReplacement, Schema, Settings, ValidationOptions, Value,
};

fn user() -> Schema {
    Schema::object().keys([
        ("name", Schema::string().min(2).required()),
        ("age", Schema::number().integer().min(0)),
    ])
}

#[test]
fn test_message_joins_top_level_errors() {
    let options = ValidationOptions::default().with_abort_early(false);
    let error = user()
        .validate_with(json!({"name": "a", "age": -1}), &options)
        .error
        .unwrap();

    assert_eq!(
        error.message,
        "child \"name\" fails because [\"name\" length must be at least 2 characters long]. \
         child \"age\" fails because [\"age\" must be larger than or equal to 0]"
    );
    assert_eq!(error.details.len(), 2);
    assert_eq!(error.details[0].message, "\"name\" length must be at least 2 characters long");
    assert_eq!(error.details[1].path.to_string(), "age");
    assert_eq!(error.name(), "ValidationError");
    assert_eq!(error.to_string(), error.message);
}

#[test]
fn test_error_keeps_original_input() {
    let input = json!({"name": 5, "age": "3"});
    let error = user().validate(input.clone()).error.unwrap();
    assert_eq!(error.object(), &Value::from(input));
}

#[test]
fn test_detail_context_carries_label_and_key() {
    let error = user().validate(json!({"name": 5})).error.unwrap();
    let detail = &error.details[0];
    assert_eq!(detail.code, "string.base");
    assert_eq!(detail.context.get("key"), Some(&Value::from("name")));
    assert_eq!(detail.context.get("label"), Some(&Value::from("name")));
    assert_eq!(detail.context.get("value"), Some(&Value::from(5)));
}

#[test]
fn test_label_replaces_key_in_messages() {
    let schema = Schema::object().keys([("n", Schema::number().label("Count"))]);
    let error = schema.validate(json!({"n": "x"})).error.unwrap();
    assert_eq!(error.details[0].message, "\"Count\" must be a number");
    assert_eq!(error.details[0].path.to_string(), "n");
}

#[test]
fn test_escape_html_applies_to_labels_only() {
    let schema = Schema::any().valid(["<x>"]).label("a<b & c");

    let plain = schema.validate("z").error.unwrap();
    assert_eq!(plain.message, "\"a<b & c\" must be one of [<x>]");

    let options = ValidationOptions::default().with_escape_html(true);
    let escaped = schema.validate_with("z", &options).error.unwrap();
    assert_eq!(escaped.details[0].code, "any.allowOnly");
    assert_eq!(escaped.message, "\"a&lt;b &amp; c\" must be one of [<x>]");
}

#[test]
fn test_language_override_from_options() {
    let options = ValidationOptions::default().with_language(json!({
        "root": "input",
        "number": {"base": "should be numeric"}
    }));
    let error = Schema::number().validate_with("x", &options).error.unwrap();
    assert_eq!(error.message, "\"input\" should be numeric");
}

#[test]
fn test_language_override_on_node() {
    let schema = Schema::object().keys([(
        "code",
        Schema::string()
            .length(3)
            .options(Settings::new().language(json!({"string": {"length": "!!needs {{limit}} letters"}}))),
    )]);
    let error = schema.validate(json!({"code": "ab"})).error.unwrap();
    assert_eq!(error.details[0].message, "needs 3 letters");
}

#[test]
fn test_static_override_replaces_message() {
    let schema = Schema::object().keys([("a", Schema::number().error("a is broken"))]);
    let error = schema.validate(json!({"a": "x"})).error.unwrap();
    assert_eq!(error.message, "a is broken");
    assert_eq!(error.details.len(), 1);
}

#[test]
fn test_error_fn_custom_errors() {
    let schema = Schema::number().min(10).error_fn(|errors| {
        ErrorReplacement::Custom(
            errors
                .iter()
                .map(|error| CustomError {
                    code: Some("custom.small".to_string()),
                    context: context([("was", Value::from(error.code.as_str()))]),
                    template: Some("is too small ({{was}})".to_string()),
                    ..CustomError::default()
                })
                .collect(),
        )
    });
    let error = schema.validate(3).error.unwrap();
    assert_eq!(error.details[0].code, "custom.small");
    assert_eq!(error.details[0].message, "\"value\" is too small (number.min)");
}

#[test]
fn test_result_conversions() {
    let schema = Schema::number();

    assert_eq!(schema.validate("4").into_result(), Ok(Value::from(4)));
    assert!(schema.validate("x").into_result().is_err());

    match schema.validate("x").into_validation() {
        Validation::Failure(error) => assert_eq!(error.details[0].code, "number.base"),
        Validation::Success(value) => panic!("unexpected success: {value:?}"),
    }

    let seen = schema.validate_callback("5", &ValidationOptions::default(), |error, value| {
        (error.is_none(), value)
    });
    assert_eq!(seen, (true, Value::from(5)));
}

#[test]
fn test_annotate() {
    let error = user().validate(json!({"age": 1})).error.unwrap();
    let annotated = error.annotate(true);
    assert!(annotated.contains("\"name\" [1]: -- missing --"));
    assert!(annotated.ends_with("[1] \"name\" is required"));
}

#[test]
fn test_alternatives_report_every_candidate() {
    let schema = Schema::alternatives().try_all([Schema::number(), Schema::boolean()]);
    let error = schema.validate("x").error.unwrap();
    let codes: Vec<&str> = error.details.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["number.base", "boolean.base"]);
}
