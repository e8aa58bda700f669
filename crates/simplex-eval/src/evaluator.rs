//! Tree-walking evaluator over parsed expressions.

use simplex_types::expr::{Call, Clause, Expr, Segment, TreeEntry};
use simplex_types::{Mapping, Value};

use crate::context::Context;
use crate::error::{EvalError, EvalResult};
use crate::filters::{FilterRegistry, FilterScope};
use crate::keys::{KeyResolver, REPEAT_NAMESPACE};

/// Walks an [`Expr`] against a [`Context`] and produces a [`Value`].
///
/// Borrows the resolver and the filter registry; make one per call.
pub struct Evaluator<'a> {
    keys: &'a KeyResolver,
    filters: &'a FilterRegistry,
    /// Steps taken by the current call.
    gas: u64,
    /// `None` means unlimited.
    gas_limit: Option<u64>,
}

impl<'a> Evaluator<'a> {
    pub fn new(keys: &'a KeyResolver, filters: &'a FilterRegistry) -> Self {
        Self {
            keys,
            filters,
            gas: 0,
            gas_limit: None,
        }
    }

    /// Bound the number of steps per `evaluate` call.
    pub fn with_gas_limit(mut self, limit: Option<u64>) -> Self {
        self.gas_limit = limit;
        self
    }

    /// Steps taken by the last `evaluate` call.
    pub fn gas_used(&self) -> u64 {
        self.gas
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        match self.gas_limit {
            Some(limit) if self.gas > limit => Err(EvalError::GasExhausted),
            _ => Ok(()),
        }
    }

    /// Evaluate a whole document. The root must produce a value.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate(&mut self, expr: &Expr, context: &Context) -> EvalResult<Value> {
        self.gas = 0;
        let result = self.eval_optional(expr, context);
        tracing::debug!(gas = self.gas, ok = result.is_ok(), "document evaluated");
        result?.ok_or(EvalError::NoMatchingClause)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a node. `None` means "absent": an unmatched conditional,
    /// omitted from its enclosing tree or list.
    fn eval_optional(&mut self, expr: &Expr, context: &Context) -> EvalResult<Option<Value>> {
        self.tick()?;
        match expr {
            Expr::Const(value) => Ok(Some(value.clone())),
            Expr::Interpolated(segments) => self.eval_interpolated(segments, context).map(Some),
            Expr::Call(call) => self.eval_call(call, context).map(Some),
            Expr::Tree(entries) => self.eval_tree(entries, context).map(Some),
            Expr::List(items) => self.eval_list(items, context).map(Some),
            Expr::Repeat { source, body } => self.eval_repeat(source, body, context).map(Some),
            Expr::Conditional(clauses) => self.eval_conditional(clauses, context),
            Expr::All(predicates) => {
                for predicate in predicates {
                    if !self.eval_value(predicate, context)?.is_truthy() {
                        return Ok(Some(Value::Bool(false)));
                    }
                }
                Ok(Some(Value::Bool(true)))
            }
            Expr::Any(predicates) => {
                for predicate in predicates {
                    if self.eval_value(predicate, context)?.is_truthy() {
                        return Ok(Some(Value::Bool(true)));
                    }
                }
                Ok(Some(Value::Bool(false)))
            }
        }
    }

    /// Evaluate a node where absence reads as `null`.
    fn eval_value(&mut self, expr: &Expr, context: &Context) -> EvalResult<Value> {
        Ok(self.eval_optional(expr, context)?.unwrap_or_default())
    }

    // ── Interpolation ─────────────────────────────────────────────────────

    /// A lone marker keeps its native type; anything else is spliced into text.
    fn eval_interpolated(&mut self, segments: &[Segment], context: &Context) -> EvalResult<Value> {
        if let [Segment::Call(call)] = segments {
            return self.eval_call(call, context);
        }
        let mut result = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => result.push_str(text),
                Segment::Call(call) => result.push_str(&self.eval_call(call, context)?.to_text()),
            }
        }
        Ok(Value::Text(result))
    }

    fn eval_call(&mut self, call: &Call, context: &Context) -> EvalResult<Value> {
        let value = self.keys.resolve(&call.key, context)?;
        let scope = FilterScope::new(self.keys, context);
        self.filters.apply_all(&call.filters, value, &scope)
    }

    // ── Structure ─────────────────────────────────────────────────────────

    fn eval_tree(&mut self, entries: &[TreeEntry], context: &Context) -> EvalResult<Value> {
        let mut fields = Mapping::with_capacity(entries.len());
        for entry in entries {
            match entry {
                TreeEntry::Field(name, expr) => {
                    if let Some(value) = self.eval_optional(expr, context)? {
                        fields.insert(name.clone(), value);
                    }
                }
                TreeEntry::Merge(expr) => match self.eval_optional(expr, context)? {
                    Some(Value::Mapping(branch)) => {
                        tracing::trace!(fields = branch.len(), "container branch merged");
                        fields.extend(branch);
                    }
                    Some(other) => {
                        return Err(EvalError::TypeMismatch(format!(
                            "@container branch produced {}, expected a mapping",
                            other.type_name()
                        )))
                    }
                    None => {}
                },
            }
        }
        Ok(Value::Mapping(fields))
    }

    fn eval_list(&mut self, items: &[Expr], context: &Context) -> EvalResult<Value> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            if let Some(value) = self.eval_optional(item, context)? {
                values.push(value);
            }
        }
        Ok(Value::Sequence(values))
    }

    // ── Directives ────────────────────────────────────────────────────────

    /// First clause whose predicate is absent or truthy wins.
    fn eval_conditional(&mut self, clauses: &[Clause], context: &Context) -> EvalResult<Option<Value>> {
        for (i, clause) in clauses.iter().enumerate() {
            let selected = match &clause.predicate {
                Some(predicate) => self.eval_value(predicate, context)?.is_truthy(),
                None => true,
            };
            if selected {
                tracing::trace!(clause = i, "clause selected");
                return self.eval_optional(&clause.result, context);
            }
        }
        tracing::trace!(clauses = clauses.len(), "no clause selected");
        Ok(None)
    }

    fn eval_repeat(&mut self, source: &Expr, body: &Expr, context: &Context) -> EvalResult<Value> {
        let items = match self.eval_value(source, context)? {
            Value::Sequence(items) => items,
            other => {
                return Err(EvalError::NotIterable(format!(
                    "@repeat source is {}, expected a sequence",
                    other.type_name()
                )))
            }
        };

        let len = items.len();
        tracing::trace!(len, "repeat");
        let mut results = Vec::with_capacity(len);
        for (index, item) in items.into_iter().enumerate() {
            let child = context.with(REPEAT_NAMESPACE, repeat_binding(item, index, len));
            if let Some(value) = self.eval_optional(body, &child)? {
                results.push(value);
            }
        }
        Ok(Value::Sequence(results))
    }
}

/// The `repeat` namespace for element `index` of `len`.
fn repeat_binding(item: Value, index: usize, len: usize) -> Value {
    Value::mapping([
        ("item", item),
        ("index", Value::from(index)),
        ("first", Value::Bool(index == 0)),
        ("last", Value::Bool(index + 1 == len)),
        ("odd", Value::Bool(index % 2 == 1)),
        ("even", Value::Bool(index % 2 == 0)),
    ])
}
