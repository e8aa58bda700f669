//! Integration tests for the Simplex evaluator.
//!
//! Documents are parsed with `simplex-parser`, then evaluated against the
//! built-in keys composed under a small test resolver:
//! - interpolation and filter pipelines
//! - conditionals, `@when`, `@value`
//! - `@repeat` bindings and nesting
//! - `@container` merges
//! - evaluation errors and retry
//! - resolver composition laws (proptest)

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use simplex_eval::{evaluate, keys, Context, EvalError, FilterRegistry, KeyResolver};
use simplex_types::expr::Expr;
use simplex_types::{Key, Value};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn people() -> Value {
    Value::from(json!([
        {"name": "Fred"},
        {"name": "Barney"},
        {"name": "Wilma"},
        {"name": "Betty"}
    ]))
}

fn resolver() -> KeyResolver {
    KeyResolver::new()
        .with_const(Key::new("ns", "key1"), "value1")
        .with_const(Key::new("ns", "key2"), "value2")
        .with_const(Key::new("ns", "people"), people())
        .compose(&keys::standard())
}

/// Parse a document (panics on parse errors).
fn parse(doc: serde_json::Value) -> Expr {
    match simplex_parser::parse_document(&doc) {
        Ok(expr) => expr,
        Err(errors) => panic!("parse errors:\n{errors}"),
    }
}

fn eval_with(doc: serde_json::Value, keys: &KeyResolver, context: &Context) -> Result<Value, EvalError> {
    evaluate(&parse(doc), keys, &FilterRegistry::standard(), context)
}

fn eval(doc: serde_json::Value) -> Value {
    eval_with(doc, &resolver(), &Context::new()).expect("evaluation failed")
}

fn eval_err(doc: serde_json::Value) -> EvalError {
    eval_with(doc, &resolver(), &Context::new()).expect_err("expected evaluation error")
}

// ══════════════════════════════════════════════════════════════════════════════
// Interpolation & filters
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_single_marker_with_filter() {
    assert_eq!(eval(json!("${ns:key1 | upperCase}")), Value::from("VALUE1"));
}

#[test]
fn test_single_marker_keeps_native_type() {
    assert_eq!(eval(json!("${ns:people}")), people());
    assert_eq!(eval(json!("${Number:2 | plus:1}")), Value::from(3));
    assert_eq!(eval(json!("${Bool:true}")), Value::Bool(true));
}

#[test]
fn test_mixed_text_stringifies() {
    assert_eq!(eval(json!("${ns:key1} ${ns:key2}")), Value::from("value1 value2"));
    assert_eq!(eval(json!("n=${Number:2 | plus:1}")), Value::from("n=3"));
    assert_eq!(eval(json!("[${repeat:item}]")), Value::from("[]"));
}

#[test]
fn test_object_fields_and_order() {
    let value = eval(json!({
        "obj": {
            "v1": "${ns:key1 | capitalize}",
            "v2": "${ns:key2 | upperCase}"
        },
        "value": "${ns:key1} ${ns:key2}"
    }));
    assert_eq!(
        serde_json::Value::from(value),
        json!({"obj": {"v1": "Value1", "v2": "VALUE2"}, "value": "value1 value2"})
    );
}

#[test]
fn test_filters_apply_left_to_right() {
    let keys = KeyResolver::new()
        .with_const(Key::new("ns", "greeting"), "hi")
        .compose(&keys::standard());
    let value = eval_with(json!("${ns:greeting | upperCase | capitalize}"), &keys, &Context::new());
    assert_eq!(value, Ok(Value::from("Hi")));
}

#[test]
fn test_cond_string_equals() {
    assert_eq!(
        eval(json!("${ns:key1 | cond:StringEquals:value1}")),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!("${ns:key2 | cond:StringEquals:value1}")),
        Value::Bool(false)
    );
}

#[test]
fn test_dotted_key_into_constant() {
    assert_eq!(eval(json!("${ns:people.2.name}")), Value::from("Wilma"));
}

#[test]
fn test_context_handler_over_caller_bindings() {
    let keys = KeyResolver::new()
        .with_handler(Key::wildcard("user"), simplex_eval::ContextKeyHandler)
        .compose(&keys::standard());
    let context = Context::new().with("user", Value::mapping([("name", Value::from("Betty"))]));
    assert_eq!(
        eval_with(json!("Hello ${user:name}!"), &keys, &context),
        Ok(Value::from("Hello Betty!"))
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Conditionals
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_when_first_match_wins() {
    let value = eval(json!({
        "@when": [
            {"@if": "${Bool:false}", "@value": 1},
            {"@if": "${Bool:true}", "@value": 2},
            {"@if": "${Bool:true}", "@value": 3}
        ]
    }));
    assert_eq!(value, Value::from(2));
}

#[test]
fn test_first_match_skips_later_failing_clause() {
    // The third clause would fail with UnknownFilter if it were evaluated.
    let value = eval(json!({
        "@when": [
            {"@if": "${Bool:false}", "@value": 1},
            {"@value": 2},
            {"@if": "${ns:key1 | explode}", "@value": 3}
        ]
    }));
    assert_eq!(value, Value::from(2));
}

#[test]
fn test_unmatched_field_is_omitted() {
    let value = eval(json!({
        "kept": 1,
        "dropped": {"@if": "${Bool:false}", "x": 1}
    }));
    assert_eq!(serde_json::Value::from(value), json!({"kept": 1}));
}

#[test]
fn test_unmatched_list_element_is_omitted() {
    let value = eval(json!([
        {"@if": "${Bool:true}", "@value": 1},
        {"@if": "${Bool:false}", "@value": 2},
        3
    ]));
    assert_eq!(serde_json::Value::from(value), json!([1, 3]));
}

#[test]
fn test_unmatched_root_fails() {
    assert_eq!(
        eval_err(json!({"@when": [{"@if": "${Bool:false}", "@value": 1}]})),
        EvalError::NoMatchingClause
    );
}

#[test]
fn test_condition_object() {
    let value = eval(json!({
        "Goodbye": {
            "@if": {"StringEquals": {"ns:key1": "value1"}},
            "@value": "Space"
        },
        "Never": {
            "@if": {
                "StringEquals": {"ns:key1": "value1"},
                "StringLike": {"ns:key2": ["x*", "y*"]}
            },
            "@value": "Nope"
        },
        "Either": {
            "@if": {"StringLike": {"ns:key2": ["x*", "val*"]}},
            "@value": "Yes"
        }
    }));
    assert_eq!(
        serde_json::Value::from(value),
        json!({"Goodbye": "Space", "Either": "Yes"})
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Repeat
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_repeat_four_people() {
    let value = eval(json!({
        "@repeat": "${ns:people}",
        "name": "${repeat:item.name}",
        "index": "${repeat:index}"
    }));
    assert_eq!(
        serde_json::Value::from(value),
        json!([
            {"name": "Fred", "index": 0},
            {"name": "Barney", "index": 1},
            {"name": "Wilma", "index": 2},
            {"name": "Betty", "index": 3}
        ])
    );
}

#[test]
fn test_repeat_positional_flags() {
    let value = eval(json!({
        "@repeat": "${ns:people}",
        "first": "${repeat:first}",
        "last": "${repeat:last}",
        "odd": "${repeat:odd}",
        "even": "${repeat:even}"
    }));
    let flags: Vec<[bool; 4]> = value
        .coerce::<Vec<std::collections::HashMap<String, bool>>>()
        .expect("flags coerce")
        .into_iter()
        .map(|m| [m["first"], m["last"], m["odd"], m["even"]])
        .collect();
    assert_eq!(
        flags,
        vec![
            [true, false, false, true],
            [false, false, true, false],
            [false, false, false, true],
            [false, true, true, false],
        ]
    );
}

#[test]
fn test_repeat_over_empty_sequence() {
    let keys = KeyResolver::new()
        .with_const(Key::new("ns", "none"), Value::Sequence(vec![]))
        .compose(&keys::standard());
    assert_eq!(
        eval_with(json!({"@repeat": "${ns:none}", "x": 1}), &keys, &Context::new()),
        Ok(Value::Sequence(vec![]))
    );
}

#[test]
fn test_repeat_over_non_sequence() {
    assert!(matches!(
        eval_err(json!({"@repeat": "${ns:key1}", "x": 1})),
        EvalError::NotIterable(_)
    ));
}

#[test]
fn test_repeat_body_absent_contributes_nothing() {
    let value = eval(json!({
        "@repeat": "${ns:people}",
        "@when": [{"@if": "${repeat:even}", "@value": "${repeat:item.name}"}]
    }));
    assert_eq!(serde_json::Value::from(value), json!(["Fred", "Wilma"]));
}

#[test]
fn test_nested_repeat_shadows_outer_binding() {
    let keys = KeyResolver::new()
        .with_const(Key::new("ns", "rows"), Value::from(json!([["a", "b"], ["c"]])))
        .compose(&keys::standard());
    let value = eval_with(
        json!({
            "@repeat": "${ns:rows}",
            "row": "${repeat:index}",
            "cells": {
                "@repeat": "${repeat:item}",
                "cell": "${repeat:item}",
                "at": "${repeat:index}"
            },
            "after": "${repeat:index}"
        }),
        &keys,
        &Context::new(),
    )
    .expect("evaluation failed");
    assert_eq!(
        serde_json::Value::from(value),
        json!([
            {"row": 0, "cells": [{"cell": "a", "at": 0}, {"cell": "b", "at": 1}], "after": 0},
            {"row": 1, "cells": [{"cell": "c", "at": 0}], "after": 1}
        ])
    );
}

#[test]
fn test_if_gates_whole_repetition() {
    let gated = |predicate: &str| {
        eval(json!({
            "list": {
                "@if": predicate,
                "@repeat": "${ns:people}",
                "n": "${repeat:index}"
            }
        }))
    };
    let shown = gated("${ns:key1 | cond:StringEquals:value1}");
    assert_eq!(shown.get_path("list").and_then(Value::as_sequence).map(<[Value]>::len), Some(4));
    let hidden = gated("${ns:key1 | cond:StringEquals:other}");
    assert_eq!(serde_json::Value::from(hidden), json!({}));
}

// ══════════════════════════════════════════════════════════════════════════════
// Container
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_container_when() {
    let value = eval(json!({
        "foo": "bar",
        "@container": {
            "@when": [
                {"@if": "${Bool:false}", "value": 1},
                {"value": 2}
            ]
        }
    }));
    assert_eq!(serde_json::Value::from(value), json!({"foo": "bar", "value": 2}));
}

#[test]
fn test_container_later_branch_overwrites() {
    let value = eval(json!({
        "@container": [
            {"@if": "${Bool:true}", "a": 1},
            {"@if": "${Bool:true}", "a": 2},
            {"@if": "${Bool:false}", "a": 3}
        ]
    }));
    assert_eq!(serde_json::Value::from(value), json!({"a": 2}));
}

#[test]
fn test_container_branch_must_be_mapping() {
    assert!(matches!(
        eval_err(json!({"@container": {"@value": 5}})),
        EvalError::TypeMismatch(_)
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors & retry
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_unresolved_key_then_retry() {
    let expr = parse(json!({"greeting": "hello ${ns:who}"}));
    let filters = FilterRegistry::standard();

    let err = evaluate(&expr, &resolver(), &filters, &Context::new());
    assert_eq!(err, Err(EvalError::UnresolvedKey(Key::new("ns", "who"))));

    let fixed = KeyResolver::new()
        .with_const(Key::new("ns", "who"), "world")
        .compose(&resolver());
    let value = evaluate(&expr, &fixed, &filters, &Context::new()).expect("retry failed");
    assert_eq!(serde_json::Value::from(value), json!({"greeting": "hello world"}));
}

#[test]
fn test_unknown_filter() {
    assert_eq!(
        eval_err(json!("${ns:key1 | shout}")),
        EvalError::UnknownFilter("shout".into())
    );
}

#[test]
fn test_type_mismatch_in_comparison() {
    assert!(matches!(
        eval_err(json!("${ns:people | cond:StringEquals:x}")),
        EvalError::TypeMismatch(_)
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Resolver composition laws
// ══════════════════════════════════════════════════════════════════════════════

const NAMES: [&str; 4] = ["a", "b", "c", "*"];
const QUERIES: [&str; 4] = ["a", "b", "c", "d"];

fn layer(entries: &[(usize, i64)]) -> KeyResolver {
    entries.iter().fold(KeyResolver::new(), |r, &(name, value)| {
        r.with_const(Key::new("ns", NAMES[name]), value)
    })
}

fn entries() -> impl Strategy<Value = Vec<(usize, i64)>> {
    prop::collection::vec((0usize..NAMES.len(), any::<i64>()), 0..4)
}

proptest! {
    #[test]
    fn compose_prefers_primary(primary in entries(), delegate in entries(), query in 0usize..QUERIES.len()) {
        let (primary, delegate) = (layer(&primary), layer(&delegate));
        let key = Key::new("ns", QUERIES[query]);
        let ctx = Context::new();
        let expected = if primary.owns(&key) {
            primary.resolve(&key, &ctx)
        } else {
            delegate.resolve(&key, &ctx)
        };
        prop_assert_eq!(primary.compose(&delegate).resolve(&key, &ctx), expected);
    }

    #[test]
    fn compose_is_associative(a in entries(), b in entries(), c in entries(), query in 0usize..QUERIES.len()) {
        let (a, b, c) = (layer(&a), layer(&b), layer(&c));
        let key = Key::new("ns", QUERIES[query]);
        let ctx = Context::new();
        prop_assert_eq!(
            a.compose(&b).compose(&c).resolve(&key, &ctx),
            a.compose(&b.compose(&c)).resolve(&key, &ctx)
        );
    }
}
