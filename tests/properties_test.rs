//! Property-based tests for the validation engine.

use proptest::prelude::*;
use serde_json::{json, Map, Value as Json};
use valuate::{Schema, ValidationOptions, Value};

/// Random JSON documents with integers only, so every generated value
/// compares equal to itself.
fn json_value_strategy() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i32>().prop_map(|n| Json::from(n)),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Json::String),
    ];

    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Json::Array),
            proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Json::Object(m.into_iter().collect())),
        ]
    })
}

/// Either a JSON document or `undefined`.
fn maybe_value_strategy() -> impl Strategy<Value = Value> {
    proptest::option::of(json_value_strategy()).prop_map(|value| match value {
        Some(json) => Value::from(json),
        None => Value::Undefined,
    })
}

/// A handful of schemas built from random parameters.
fn schema_strategy() -> impl Strategy<Value = Schema> {
    prop_oneof![
        (0usize..10, 10usize..20, any::<bool>()).prop_map(|(min, max, required)| {
            let schema = Schema::string().min(min).max(max).trim();
            if required {
                schema.required()
            } else {
                schema
            }
        }),
        (-100i32..100, "[a-z]{1,8}").prop_map(|(limit, label)| {
            Schema::number().integer().greater(limit).label(label)
        }),
        proptest::collection::vec("[a-z]{1,5}", 1..4).prop_map(|keys| {
            Schema::object().keys(keys.into_iter().map(|key| (key, Schema::number())))
        }),
        proptest::collection::vec(any::<i32>(), 1..4)
            .prop_map(|values| Schema::any().valid(values).description("enumeration")),
    ]
}

proptest! {
    #[test]
    fn prop_forbidden_accepts_only_undefined(value in maybe_value_strategy()) {
        let undefined = value.is_undefined();
        let result = Schema::any().forbidden().validate(value);
        prop_assert_eq!(result.is_ok(), undefined);
    }

    #[test]
    fn prop_required_rejects_only_undefined(value in maybe_value_strategy()) {
        let undefined = value.is_undefined();
        let result = Schema::any().required().validate(value);
        prop_assert_eq!(result.error.is_some(), undefined);
    }

    #[test]
    fn prop_allowed_values_short_circuit(json in json_value_strategy()) {
        let schemas = [
            Schema::number().integer().max(-1_000_000).allow([json.clone()]),
            Schema::string().min(1000).allow([json.clone()]),
            Schema::object()
                .keys([("never", Schema::any().required())])
                .allow([json.clone()]),
        ];
        for schema in schemas {
            let result = schema.validate(json.clone());
            prop_assert!(result.is_ok(), "rejected an allowed value: {:?}", result.error);
        }
    }

    #[test]
    fn prop_clone_is_idempotent(schema in schema_strategy()) {
        let described = schema.describe();
        let copy = schema.clone();
        prop_assert_eq!(copy.describe(), described.clone());

        let _changed = copy.label("changed").optional().description("other");
        prop_assert_eq!(schema.describe(), described);
    }

    #[test]
    fn prop_abort_early_reports_no_more_errors(bad in proptest::collection::vec(any::<bool>(), 1..8)) {
        let keys: Vec<String> = (0..bad.len()).map(|i| format!("k{i}")).collect();
        let schema = Schema::object().keys(keys.iter().map(|key| (key.clone(), Schema::number())));
        let mut input = Map::new();
        for (key, is_bad) in keys.iter().zip(&bad) {
            input.insert(key.clone(), if *is_bad { json!("x") } else { json!(1) });
        }
        let input = Json::Object(input);
        let expected = bad.iter().filter(|b| **b).count();

        let early = schema.validate(input.clone());
        let all = schema.validate_with(input, &ValidationOptions::default().with_abort_early(false));

        let early_count = early.error.as_ref().map_or(0, |e| e.details.len());
        let all_count = all.error.as_ref().map_or(0, |e| e.details.len());
        prop_assert!(early_count <= 1);
        prop_assert_eq!(all_count, expected);
        prop_assert!(all_count >= early_count);
        if let (Some(early), Some(all)) = (&early.error, &all.error) {
            prop_assert_eq!(&early.details[0], &all.details[0]);
        }
    }

    #[test]
    fn prop_concat_of_disjoint_keys(a in json_value_strategy(), b in json_value_strategy()) {
        let left = Schema::object().keys([("a", Schema::number().integer())]);
        let right = Schema::object().keys([("b", Schema::string().max(10))]);
        let both = left.clone().concat(right.clone()).unwrap();

        let separately = left.validate(json!({"a": a.clone()})).is_ok()
            && right.validate(json!({"b": b.clone()})).is_ok();
        prop_assert_eq!(both.validate(json!({"a": a, "b": b})).is_ok(), separately);
    }

    #[test]
    fn prop_default_round_trip(json in json_value_strategy()) {
        let result = Schema::any().default(json.clone()).validate(Value::Undefined);
        prop_assert!(result.is_ok());
        prop_assert_eq!(result.value, Value::from(json));
    }
}
