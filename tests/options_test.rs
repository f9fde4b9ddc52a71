//! Tests for validation options and node-level settings.

use serde_json::json;
use valuate::{
    BuildError, Function, Presence, RenameOptions, Schema, Settings, StripUnknown, ValidationOptions,
    Value,
};

fn person() -> Schema {
    Schema::object().keys([
        ("name", Schema::string()),
        ("age", Schema::number()),
    ])
}

#[test]
fn test_options_from_config_document() {
    let options = ValidationOptions::from_json(json!({
        "abortEarly": false,
        "convert": false,
        "allowUnknown": true,
        "stripUnknown": {"objects": true},
        "presence": "required",
        "language": {"root": "payload"},
        "noDefaults": true
    }))
    .unwrap();

    assert!(!options.abort_early);
    assert!(!options.convert);
    assert!(options.allow_unknown);
    assert!(options.strip_unknown.objects());
    assert!(!options.strip_unknown.arrays());
    assert_eq!(options.presence, Presence::Required);
    assert!(options.no_defaults);
    assert!(!options.escape_html);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = ValidationOptions::from_json(json!({"abortEarly": "sometimes"}));
    assert!(matches!(result, Err(BuildError::InvalidOptions(_))));
}

#[test]
fn test_presence_option_applies_to_unflagged_schemas() {
    let options = ValidationOptions::default()
        .with_presence(Presence::Required)
        .with_abort_early(false);
    let schema = Schema::object().keys([
        ("name", Schema::string()),
        ("nick", Schema::string().optional()),
    ]);

    let error = schema.validate_with(json!({}), &options).error.unwrap();
    let paths: Vec<String> = error.details.iter().map(|d| d.path.to_string()).collect();
    assert_eq!(paths, vec!["name"]);
}

#[test]
fn test_unknown_keys() {
    let input = json!({"name": "ada", "extra": 1});

    let error = person().validate(input.clone()).error.unwrap();
    assert_eq!(error.details[0].code, "object.allowUnknown");
    assert_eq!(error.details[0].message, "\"extra\" is not allowed");

    let allowed = ValidationOptions::default().with_allow_unknown(true);
    let result = person().validate_with(input.clone(), &allowed);
    assert_eq!(result.value, Value::from(input.clone()));

    let stripped = ValidationOptions::default().with_strip_unknown(StripUnknown::All(true));
    let result = person().validate_with(input.clone(), &stripped);
    assert_eq!(result.value, Value::from(json!({"name": "ada"})));

    assert!(person().unknown(true).validate(input).is_ok());
}

#[test]
fn test_strip_unknown_array_items() {
    let schema = Schema::array().items([Schema::number()]);
    let options = ValidationOptions::default().with_strip_unknown(StripUnknown::Targets {
        arrays: true,
        objects: false,
    });
    let result = schema.validate_with(json!([1, "x", 2]), &options);
    assert!(result.is_ok());
    assert_eq!(result.value, Value::from(json!([1, 2])));
}

#[test]
fn test_skip_functions() {
    let mut input = valuate::Map::new();
    input.insert("name".to_string(), Value::from("ada"));
    input.insert(
        "callback".to_string(),
        Value::Function(Function::new("callback", 0, |_| Value::Null)),
    );
    let input = Value::Object(input);

    assert!(person().validate(input.clone()).error.is_some());
    let options = ValidationOptions::default().with_skip_functions(true);
    assert!(person().validate_with(input, &options).is_ok());
}

#[test]
fn test_strict_node_disables_conversion_below() {
    let schema = Schema::object().keys([
        ("loose", Schema::number()),
        ("exact", Schema::object().keys([("n", Schema::number())]).strict()),
    ]);

    assert!(schema.validate(json!({"loose": "1"})).is_ok());
    let error = schema.validate(json!({"exact": {"n": "1"}})).error.unwrap();
    assert_eq!(error.details[0].code, "number.base");
    assert_eq!(error.details[0].path.to_string(), "exact.n");
}

#[test]
fn test_node_settings_override_abort_early() {
    let schema = person().options(Settings::new().abort_early(false));
    let error = schema.validate(json!({"name": 1, "age": "x"})).error.unwrap();
    assert_eq!(error.details.len(), 2);
}

#[test]
fn test_rename() {
    let schema = person().rename("fullName", "name", RenameOptions::default());
    let result = schema.validate(json!({"fullName": "ada", "age": 36}));
    assert!(result.is_ok());
    assert_eq!(result.value, Value::from(json!({"age": 36, "name": "ada"})));

    let aliased = person().rename(
        "fullName",
        "name",
        RenameOptions {
            alias: true,
            ..RenameOptions::default()
        },
    );
    let result = aliased.unknown(true).validate(json!({"fullName": "ada"}));
    assert_eq!(result.value, Value::from(json!({"fullName": "ada", "name": "ada"})));
}

#[test]
fn test_raw_output() {
    let schema = Schema::object().keys([("n", Schema::number().raw())]);
    let result = schema.validate(json!({"n": "5"}));
    assert!(result.is_ok());
    assert_eq!(result.value, Value::from(json!({"n": "5"})));
}
