//! The `cond` comparison filter.
//!
//! `value | cond:<Op>:<literal>` compares the piped value against a literal.
//! `value | cond:<Op>:<ns>:<name>` compares against a resolved key when some
//! resolver layer owns `ns:name`; otherwise the trailing arguments are
//! rejoined into one literal (`cond:StringEquals:12:30`).

use std::cmp::Ordering;

use simplex_types::{Key, Value};

use super::{arg, number_operand, scalar_text, FilterRegistry, FilterScope};
use crate::error::{EvalError, EvalResult};

pub const NAMESPACE: &str = "cond";
const FILTER: &str = "cond";

pub(crate) fn register(registry: &mut FilterRegistry) {
    registry.register(NAMESPACE, FILTER, cond);
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    StringEquals,
    StringNotEquals,
    StringEqualsIgnoreCase,
    StringLike,
    NumberEquals,
    NumberNotEquals,
    NumberLessThan,
    NumberLessThanEquals,
    NumberGreaterThan,
    NumberGreaterThanEquals,
    Bool,
    Null,
}

impl Operator {
    pub fn parse(name: &str) -> Option<Operator> {
        Some(match name {
            "StringEquals" => Self::StringEquals,
            "StringNotEquals" => Self::StringNotEquals,
            "StringEqualsIgnoreCase" => Self::StringEqualsIgnoreCase,
            "StringLike" => Self::StringLike,
            "NumberEquals" => Self::NumberEquals,
            "NumberNotEquals" => Self::NumberNotEquals,
            "NumberLessThan" => Self::NumberLessThan,
            "NumberLessThanEquals" => Self::NumberLessThanEquals,
            "NumberGreaterThan" => Self::NumberGreaterThan,
            "NumberGreaterThanEquals" => Self::NumberGreaterThanEquals,
            "Bool" => Self::Bool,
            "Null" => Self::Null,
            _ => return None,
        })
    }

    /// Compare `left` (the piped value) with `right`.
    pub fn test(self, left: &Value, right: &Value) -> EvalResult<bool> {
        match self {
            Self::StringEquals => Ok(scalar_text(left, FILTER)? == scalar_text(right, FILTER)?),
            Self::StringNotEquals => Ok(scalar_text(left, FILTER)? != scalar_text(right, FILTER)?),
            Self::StringEqualsIgnoreCase => Ok(scalar_text(left, FILTER)?.to_lowercase()
                == scalar_text(right, FILTER)?.to_lowercase()),
            Self::StringLike => {
                let text: Vec<char> = scalar_text(left, FILTER)?.chars().collect();
                let pattern: Vec<char> = scalar_text(right, FILTER)?.chars().collect();
                Ok(glob_match(&pattern, &text))
            }
            Self::NumberEquals
            | Self::NumberNotEquals
            | Self::NumberLessThan
            | Self::NumberLessThanEquals
            | Self::NumberGreaterThan
            | Self::NumberGreaterThanEquals => {
                let (Some(a), Some(b)) = (number_operand(left, FILTER)?, number_operand(right, FILTER)?)
                else {
                    return Ok(false);
                };
                let Some(ordering) = a.as_f64().partial_cmp(&b.as_f64()) else {
                    return Ok(false);
                };
                Ok(match self {
                    Self::NumberEquals => a == b,
                    Self::NumberNotEquals => a != b,
                    Self::NumberLessThan => ordering == Ordering::Less,
                    Self::NumberLessThanEquals => ordering != Ordering::Greater,
                    Self::NumberGreaterThan => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })
            }
            Self::Bool => Ok(left.is_truthy() == right.is_truthy()),
            Self::Null => Ok(left.is_null() == right.is_truthy()),
        }
    }
}

fn cond(value: Value, args: &[String], scope: &FilterScope<'_>) -> EvalResult<Value> {
    let name = arg(args, 0, FILTER)?;
    let op = Operator::parse(name)
        .ok_or_else(|| EvalError::TypeMismatch(format!("unknown comparison operator '{name}'")))?;
    let right = match &args[1..] {
        [] => {
            return Err(EvalError::TypeMismatch(format!(
                "{FILTER}:{name} expects an operand"
            )))
        }
        [literal] => Value::Text(literal.clone()),
        [namespace, rest @ ..] => {
            let key = Key::new(namespace.as_str(), rest.join(":"));
            if scope.keys().owns(&key) {
                scope.resolve(&key)?
            } else {
                Value::Text(args[1..].join(":"))
            }
        }
    };
    op.test(&value, &right).map(Value::Bool)
}

/// `*` matches any run of characters, `?` exactly one.
fn glob_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some(&'*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::keys::KeyResolver;
    use simplex_types::expr::FilterInvocation;

    fn run_with(keys: &KeyResolver, args: &[&str], input: impl Into<Value>) -> EvalResult<Value> {
        let context = Context::new();
        FilterRegistry::standard().apply(
            &FilterInvocation::new("cond", args.iter().copied()),
            input.into(),
            &FilterScope::new(keys, &context),
        )
    }

    fn run(args: &[&str], input: impl Into<Value>) -> EvalResult<Value> {
        run_with(&KeyResolver::new(), args, input)
    }

    fn holds(args: &[&str], input: impl Into<Value>) -> bool {
        run(args, input) == Ok(Value::Bool(true))
    }

    #[test]
    fn string_equals() {
        assert!(holds(&["StringEquals", "value1"], "value1"));
        assert!(!holds(&["StringEquals", "value1"], "other"));
        assert!(holds(&["StringNotEquals", "value1"], "other"));
        assert!(holds(&["StringEqualsIgnoreCase", "VALUE1"], "value1"));
        assert!(holds(&["StringEquals", "2"], 2));
    }

    #[test]
    fn string_like() {
        assert!(holds(&["StringLike", "val*"], "value1"));
        assert!(holds(&["StringLike", "v?lue?"], "value1"));
        assert!(holds(&["StringLike", "*"], ""));
        assert!(holds(&["StringLike", "*a*b"], "xxaxxb"));
        assert!(!holds(&["StringLike", "*a*b"], "xxaxxbc"));
        assert!(!holds(&["StringLike", "v?"], "value"));
    }

    #[test]
    fn number_operators() {
        assert!(holds(&["NumberEquals", "2"], 2));
        assert!(holds(&["NumberEquals", "2.0"], "2"));
        assert!(holds(&["NumberNotEquals", "2"], 3));
        assert!(holds(&["NumberLessThan", "3"], 2));
        assert!(holds(&["NumberLessThanEquals", "2"], 2));
        assert!(holds(&["NumberGreaterThan", "1.5"], 2));
        assert!(holds(&["NumberGreaterThanEquals", "2"], 2));
        assert!(!holds(&["NumberGreaterThan", "2"], 2));
    }

    #[test]
    fn null_operand_is_false_for_numbers() {
        assert!(!holds(&["NumberEquals", "2"], Value::Null));
        assert!(!holds(&["NumberNotEquals", "2"], Value::Null));
    }

    #[test]
    fn bool_and_null_operators() {
        assert!(holds(&["Bool", "true"], true));
        assert!(holds(&["Bool", "false"], ""));
        assert!(holds(&["Null", "true"], Value::Null));
        assert!(holds(&["Null", "false"], "x"));
    }

    #[test]
    fn type_mismatches() {
        let mismatch = |r: EvalResult<Value>| matches!(r, Err(EvalError::TypeMismatch(_)));
        assert!(mismatch(run(&["Bogus", "x"], "x")));
        assert!(mismatch(run(&["StringEquals"], "x")));
        assert!(mismatch(run(&[], "x")));
        assert!(mismatch(run(&["NumberEquals", "2"], "two")));
        assert!(mismatch(run(&["StringEquals", "x"], Value::Sequence(vec![]))));
    }

    #[test]
    fn key_operand() {
        let keys = KeyResolver::new().with_const(Key::new("ns", "limit"), 10);
        assert_eq!(
            run_with(&keys, &["NumberLessThan", "ns", "limit"], 3),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            run_with(&keys, &["StringEquals", "12", "30"], "12:30"),
            Ok(Value::Bool(true))
        );
    }
}
