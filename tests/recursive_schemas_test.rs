//! Tests for recursive schema structures built with lazy schemas.

use serde_json::json;
use valuate::{Schema, ValidationOptions};

fn comment() -> Schema {
    Schema::object().keys([
        ("text", Schema::string().required()),
        ("replies", Schema::array().items([Schema::lazy(comment)])),
    ])
}

#[test]
fn test_self_referencing_schema() {
    let result = comment().validate(json!({
        "text": "Top comment",
        "replies": [
            {"text": "Reply 1"},
            {
                "text": "Reply 2",
                "replies": [{"text": "Nested reply"}]
            }
        ]
    }));
    assert!(result.is_ok());
}

#[test]
fn test_deep_error_path() {
    let error = comment()
        .validate(json!({
            "text": "root",
            "replies": [{"text": "ok"}, {"text": "ok", "replies": [{"text": 42}]}]
        }))
        .error
        .unwrap();

    assert_eq!(error.details[0].code, "string.base");
    assert_eq!(error.details[0].path.to_string(), "replies[1].replies[0].text");
}

#[test]
fn test_all_nested_errors_are_collected() {
    let options = ValidationOptions::default().with_abort_early(false);
    let error = comment()
        .validate_with(
            json!({"replies": [{"replies": [{}]}, {"text": 1}]}),
            &options,
        )
        .error
        .unwrap();

    let paths: Vec<String> = error.details.iter().map(|d| d.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "text",
            "replies[0].text",
            "replies[0].replies[0].text",
            "replies[1].text"
        ]
    );
}

#[test]
fn test_mutually_recursive_schemas() {
    fn folder() -> Schema {
        Schema::object().keys([
            ("name", Schema::string().required()),
            ("entries", Schema::array().items([Schema::lazy(entry)])),
        ])
    }

    fn entry() -> Schema {
        Schema::alternatives().try_all([
            Schema::lazy(folder),
            Schema::object().keys([("file", Schema::string().required())]),
        ])
    }

    let tree = json!({
        "name": "root",
        "entries": [
            {"file": "a.txt"},
            {"name": "docs", "entries": [{"file": "b.md"}]}
        ]
    });
    assert!(folder().validate(tree).is_ok());
    assert!(folder().validate(json!({"name": "root", "entries": [{"size": 1}]})).error.is_some());
}

#[test]
fn test_lazy_output_is_converted() {
    fn list() -> Schema {
        Schema::object().keys([
            ("value", Schema::number()),
            ("next", Schema::lazy(list)),
        ])
    }
    let result = list().validate(json!({"value": "1", "next": {"value": "2"}}));
    assert_eq!(result.value.to_json(), json!({"value": 1, "next": {"value": 2}}));
}
