//! Simplex tree-walking evaluator.
//!
//! Evaluates a parsed [`Expr`] against a [`Context`], resolving `ns:name`
//! keys through a [`KeyResolver`] chain and running filter pipelines from a
//! [`FilterRegistry`].

pub mod context;
pub mod error;
pub mod evaluator;
pub mod filters;
pub mod keys;

pub use context::Context;
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use filters::{FilterFn, FilterRegistry, FilterScope};
pub use keys::{ConstKeyHandler, ContextKeyHandler, FnKeyHandler, KeyHandler, KeyResolver};

use simplex_types::expr::Expr;
use simplex_types::Value;

/// Evaluate with no gas limit.
pub fn evaluate(
    expr: &Expr,
    keys: &KeyResolver,
    filters: &FilterRegistry,
    context: &Context,
) -> EvalResult<Value> {
    Evaluator::new(keys, filters).evaluate(expr, context)
}
