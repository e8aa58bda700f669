//! `logic` filters: negation and collection size.

use simplex_types::Value;

use super::{FilterRegistry, FilterScope};
use crate::error::{EvalError, EvalResult};

pub const NAMESPACE: &str = "logic";

pub(crate) fn register(registry: &mut FilterRegistry) {
    registry
        .register(NAMESPACE, "not", not)
        .register(NAMESPACE, "size", size);
}

fn not(value: Value, _args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    Ok(Value::Bool(!value.is_truthy()))
}

/// Element count, field count, or character count. `null` has size 0.
fn size(value: Value, _args: &[String], _scope: &FilterScope<'_>) -> EvalResult<Value> {
    let n = match &value {
        Value::Null => 0,
        Value::Text(s) => s.chars().count(),
        Value::Sequence(items) => items.len(),
        Value::Mapping(fields) => fields.len(),
        other => {
            return Err(EvalError::TypeMismatch(format!(
                "size expects text or a collection, got {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::from(n))
}
