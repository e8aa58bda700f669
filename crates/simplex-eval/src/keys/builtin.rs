//! Built-in key namespaces.

use simplex_types::{Key, Number, Value};

use super::{ContextKeyHandler, KeyHandler, KeyResolver};
use crate::context::Context;
use crate::error::{EvalError, EvalResult};

/// `Bool:true`, `Bool:false`
pub const BOOL_NAMESPACE: &str = "Bool";
/// `Number:<literal>`
pub const NUMBER_NAMESPACE: &str = "Number";
/// `Math:PI`, `Math:E`
pub const MATH_NAMESPACE: &str = "Math";
/// Per-iteration bindings of `@repeat`.
pub const REPEAT_NAMESPACE: &str = "repeat";

/// Parses the key name as a numeric literal.
struct NumberLiteral;

impl KeyHandler for NumberLiteral {
    fn call(&self, key: &Key, _context: &Context) -> EvalResult<Value> {
        Number::parse(&key.name)
            .map(Value::Number)
            .ok_or_else(|| EvalError::TypeMismatch(format!("'{}' is not a number", key.name)))
    }
}

/// The resolver every engine falls back to.
pub fn standard() -> KeyResolver {
    KeyResolver::new()
        .with_const(Key::new(BOOL_NAMESPACE, "true"), true)
        .with_const(Key::new(BOOL_NAMESPACE, "false"), false)
        .with_handler(Key::wildcard(NUMBER_NAMESPACE), NumberLiteral)
        .with_const(Key::new(MATH_NAMESPACE, "PI"), std::f64::consts::PI)
        .with_const(Key::new(MATH_NAMESPACE, "E"), std::f64::consts::E)
        .with_handler(Key::wildcard(REPEAT_NAMESPACE), ContextKeyHandler)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(ns: &str, name: &str) -> EvalResult<Value> {
        standard().resolve(&Key::new(ns, name), &Context::new())
    }

    #[test]
    fn literals() {
        assert_eq!(resolve("Bool", "true"), Ok(Value::Bool(true)));
        assert_eq!(resolve("Bool", "false"), Ok(Value::Bool(false)));
        assert_eq!(resolve("Number", "42"), Ok(Value::from(42)));
        assert_eq!(resolve("Number", "2.5"), Ok(Value::from(2.5)));
        assert!(matches!(resolve("Number", "abc"), Err(EvalError::TypeMismatch(_))));
        assert!(matches!(resolve("Bool", "maybe"), Err(EvalError::UnresolvedKey(_))));
    }

    #[test]
    fn repeat_outside_repetition_is_null() {
        assert_eq!(resolve("repeat", "first"), Ok(Value::Null));
        let ctx = Context::new().with(REPEAT_NAMESPACE, Value::mapping([("index", Value::from(3))]));
        assert_eq!(
            standard().resolve(&Key::new("repeat", "index"), &ctx),
            Ok(Value::from(3))
        );
    }
}
