//! `text` filters.
//!
//! Every text filter accepts any scalar (rendered as text) and rejects
//! collections.

use simplex_types::Value;

use super::{arg, scalar_text, FilterRegistry, FilterScope};
use crate::error::EvalResult;

pub const NAMESPACE: &str = "text";

pub(crate) fn register(registry: &mut FilterRegistry) {
    registry
        .register(NAMESPACE, "upperCase", upper_case)
        .register(NAMESPACE, "lowerCase", lower_case)
        .register(NAMESPACE, "capitalize", capitalize)
        .register(NAMESPACE, "trim", trim)
        .register(NAMESPACE, "append", append)
        .register(NAMESPACE, "prepend", prepend)
        .register(NAMESPACE, "replace", replace)
        .register(NAMESPACE, "default", default);
}

fn upper_case(value: Value, _args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    Ok(Value::Text(scalar_text(&value, "upperCase")?.to_uppercase()))
}

fn lower_case(value: Value, _args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    Ok(Value::Text(scalar_text(&value, "lowerCase")?.to_lowercase()))
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(value: Value, _args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let text = scalar_text(&value, "capitalize")?;
    let mut chars = text.chars();
    let capitalized = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };
    Ok(Value::Text(capitalized))
}

fn trim(value: Value, _args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    Ok(Value::Text(scalar_text(&value, "trim")?.trim().to_string()))
}

// Arguments are split on `:`; rejoin them so `append:http://x` works.

fn append(value: Value, args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let mut text = scalar_text(&value, "append")?;
    text.push_str(&args.join(":"));
    Ok(Value::Text(text))
}

fn prepend(value: Value, args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let text = scalar_text(&value, "prepend")?;
    Ok(Value::Text(format!("{}{text}", args.join(":"))))
}

/// `replace:from[:to]`, every occurrence.
fn replace(value: Value, args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let text = scalar_text(&value, "replace")?;
    let from = arg(args, 0, "replace")?;
    if from.is_empty() {
        return Ok(Value::Text(text));
    }
    let to = args.get(1).map(String::as_str).unwrap_or_default();
    Ok(Value::Text(text.replace(from, to)))
}

/// Substitute for `null` or empty text. Other values pass through.
fn default(value: Value, args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let empty = match &value {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        _ => false,
    };
    Ok(if empty {
        Value::Text(args.join(":"))
    } else {
        value
    })
}
