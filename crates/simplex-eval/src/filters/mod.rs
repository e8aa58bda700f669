//! Filter registry and the built-in filter families.
//!
//! Filters live in namespaces (`text.upperCase`). Templates usually name
//! them bare (`upperCase`); a bare name resolves to the first namespace that
//! registered it.

pub mod cond;
pub mod logic;
pub mod number;
pub mod text;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use simplex_types::expr::FilterInvocation;
use simplex_types::{Key, Number, Value};

use crate::context::Context;
use crate::error::{EvalError, EvalResult};
use crate::keys::KeyResolver;

/// A stored filter: `(input, args, scope) -> output`.
pub type FilterFn =
    Arc<dyn Fn(Value, &[String], &FilterScope<'_>) -> EvalResult<Value> + Send + Sync>;

/// Read-only view of the running evaluation, handed to every filter.
#[derive(Debug, Clone, Copy)]
pub struct FilterScope<'a> {
    keys: &'a KeyResolver,
    context: &'a Context,
}

impl<'a> FilterScope<'a> {
    pub fn new(keys: &'a KeyResolver, context: &'a Context) -> Self {
        Self { keys, context }
    }

    pub fn keys(&self) -> &'a KeyResolver {
        self.keys
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Resolve a key in the current context.
    pub fn resolve(&self, key: &Key) -> EvalResult<Value> {
        self.keys.resolve(key, self.context)
    }
}

/// Named filters, grouped by namespace.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    namespaces: HashMap<String, HashMap<String, FilterFn>>,
    /// Bare name → namespace of its first registration.
    unqualified: HashMap<String, String>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in family.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        text::register(&mut registry);
        number::register(&mut registry);
        cond::register(&mut registry);
        logic::register(&mut registry);
        registry
    }

    /// Register `namespace.name`. Re-registering replaces the filter but
    /// keeps the bare name bound to its first namespace.
    pub fn register<F>(&mut self, namespace: &str, name: &str, filter: F) -> &mut Self
    where
        F: Fn(Value, &[String], &FilterScope<'_>) -> EvalResult<Value> + Send + Sync + 'static,
    {
        tracing::debug!(namespace, name, "filter registered");
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), Arc::new(filter));
        self.unqualified
            .entry(name.to_string())
            .or_insert_with(|| namespace.to_string());
        self
    }

    /// Look up a bare or `namespace.name` filter.
    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        let (namespace, name) = match name.split_once('.') {
            Some((namespace, name)) => (namespace, name),
            None => (self.unqualified.get(name)?.as_str(), name),
        };
        self.namespaces.get(namespace)?.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Apply one invocation.
    pub fn apply(
        &self,
        invocation: &FilterInvocation,
        input: Value,
        scope: &FilterScope<'_>,
    ) -> EvalResult<Value> {
        let filter = self
            .get(&invocation.name)
            .ok_or_else(|| EvalError::UnknownFilter(invocation.name.clone()))?;
        filter(input, &invocation.args, scope)
    }

    /// Apply a pipeline left to right.
    pub fn apply_all(
        &self,
        pipeline: &[FilterInvocation],
        input: Value,
        scope: &FilterScope<'_>,
    ) -> EvalResult<Value> {
        pipeline
            .iter()
            .try_fold(input, |value, invocation| self.apply(invocation, value, scope))
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .namespaces
            .iter()
            .flat_map(|(ns, filters)| filters.keys().map(move |name| format!("{ns}.{name}")))
            .collect();
        names.sort();
        f.debug_struct("FilterRegistry").field("filters", &names).finish()
    }
}

// ── Argument & operand helpers ───────────────────────────────────────────────

/// The `index`th argument, or a `TypeMismatch` naming the filter.
pub(crate) fn arg<'a>(args: &'a [String], index: usize, filter: &str) -> EvalResult<&'a str> {
    args.get(index).map(String::as_str).ok_or_else(|| {
        EvalError::TypeMismatch(format!("{filter} expects at least {} argument(s)", index + 1))
    })
}

/// Scalar input rendered as text. `null` becomes empty text.
pub(crate) fn scalar_text(value: &Value, filter: &str) -> EvalResult<String> {
    match value {
        Value::Sequence(_) | Value::Mapping(_) => Err(EvalError::TypeMismatch(format!(
            "{filter} expects a scalar, got {}",
            value.type_name()
        ))),
        scalar => Ok(scalar.to_text()),
    }
}

/// Numeric operand: a number or numeric text. `Ok(None)` for `null`.
pub(crate) fn number_operand(value: &Value, filter: &str) -> EvalResult<Option<Number>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(Some(*n)),
        Value::Text(s) => Number::parse(s)
            .map(Some)
            .ok_or_else(|| EvalError::TypeMismatch(format!("{filter}: '{s}' is not a number"))),
        other => Err(EvalError::TypeMismatch(format!(
            "{filter} expects a number, got {}",
            other.type_name()
        ))),
    }
}
