//! Property-based tests for the naming conversions
//!
//! Round trips must hold for every well-formed name and for objects of any
//! shape, not only the handful of names used elsewhere.

use proptest::prelude::*;
use serde_json::Value;

use ilytat_casing::{camel_to_snake, object_camel_to_snake, object_snake_to_camel, snake_to_camel};

/// Strategy for snake_case keys: lowercase words joined by single underscores
fn snake_key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(_[a-z]{1,8}){0,4}"
}

/// Strategy for JSON values whose object keys are all snake_case
fn snake_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9_ ]{0,20}".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        6,  // max depth
        64, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                proptest::collection::hash_map(snake_key_strategy(), inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

proptest! {
    #[test]
    fn prop_snake_round_trip(name in "[a-z]+(_[a-z]+)*") {
        prop_assert_eq!(camel_to_snake(&snake_to_camel(&name)), name);
    }

    #[test]
    fn prop_camel_round_trip(name in "[A-Z]?[a-z]{1,8}([A-Z][a-z]{1,8}){0,4}[A-Z]?") {
        prop_assert_eq!(snake_to_camel(&camel_to_snake(&name)), name);
    }

    #[test]
    fn prop_camel_output_has_no_convertible_underscores(name in "[a-z]+(_[a-z]+)*") {
        prop_assert!(!snake_to_camel(&name).contains('_'));
    }

    #[test]
    fn prop_deep_round_trip(value in snake_json_strategy()) {
        let camel = object_snake_to_camel(&value);
        prop_assert_eq!(object_camel_to_snake(&camel), value);
    }

    #[test]
    fn prop_top_level_non_objects_unchanged(value in snake_json_strategy()) {
        if !value.is_object() {
            prop_assert_eq!(object_snake_to_camel(&value), value.clone());
            prop_assert_eq!(object_camel_to_snake(&value), value);
        }
    }
}
