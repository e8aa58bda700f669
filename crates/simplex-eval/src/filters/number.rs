//! `number` filters. A `null` input passes through unchanged, so pipelines
//! over missing repeat bindings stay quiet.

use simplex_types::{Number, Value};

use super::{arg, number_operand, FilterRegistry, FilterScope};
use crate::error::{EvalError, EvalResult};

pub const NAMESPACE: &str = "number";

pub(crate) fn register(registry: &mut FilterRegistry) {
    registry
        .register(NAMESPACE, "plus", |v, args, _| {
            arithmetic(v, args, "plus", i64::checked_add, |a, b| a + b)
        })
        .register(NAMESPACE, "minus", |v, args, _| {
            arithmetic(v, args, "minus", i64::checked_sub, |a, b| a - b)
        })
        .register(NAMESPACE, "multiply", |v, args, _| {
            arithmetic(v, args, "multiply", i64::checked_mul, |a, b| a * b)
        })
        .register(NAMESPACE, "divide", divide)
        .register(NAMESPACE, "round", round)
        .register(NAMESPACE, "number", to_number);
}

fn arg_number(args: &[String], index: usize, filter: &str) -> EvalResult<Number> {
    let text = arg(args, index, filter)?;
    Number::parse(text)
        .ok_or_else(|| EvalError::TypeMismatch(format!("{filter}: '{text}' is not a number")))
}

fn finite(f: f64, filter: &str) -> EvalResult<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| EvalError::TypeMismatch(format!("{filter} produced a non-finite result")))
}

/// Integer math when both sides are integers and the result fits, float otherwise.
fn arithmetic(
    value: Value,
    args: &[String],
    filter: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    let Some(left) = number_operand(&value, filter)? else {
        return Ok(Value::Null);
    };
    let right = arg_number(args, 0, filter)?;
    if let (Number::Int(a), Number::Int(b)) = (left, right) {
        if let Some(result) = int_op(a, b) {
            return Ok(Value::Number(Number::Int(result)));
        }
    }
    finite(float_op(left.as_f64(), right.as_f64()), filter)
}

fn divide(value: Value, args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let Some(left) = number_operand(&value, "divide")? else {
        return Ok(Value::Null);
    };
    let right = arg_number(args, 0, "divide")?;
    if right.is_zero() {
        return Err(EvalError::TypeMismatch("divide by zero".to_string()));
    }
    finite(left.as_f64() / right.as_f64(), "divide")
}

/// `round[:digits]`
fn round(value: Value, args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let Some(n) = number_operand(&value, "round")? else {
        return Ok(Value::Null);
    };
    let digits = match args.first() {
        Some(_) => arg_number(args, 0, "round")?
            .as_i64()
            .filter(|d| (0..=15).contains(d))
            .ok_or_else(|| EvalError::TypeMismatch("round expects 0..=15 digits".to_string()))?,
        None => 0,
    };
    if let Number::Int(_) = n {
        return Ok(Value::Number(n));
    }
    let factor = 10f64.powi(digits as i32);
    finite((n.as_f64() * factor).round() / factor, "round")
}

/// Numeric text to a number.
fn to_number(value: Value, _args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    Ok(number_operand(&value, "number")?.map_or(Value::Null, Value::Number))
}
