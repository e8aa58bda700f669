//! The `Simplex` engine: one resolver chain, one filter registry, one config.

use simplex_eval::{keys, Context, EvalResult, Evaluator, FilterRegistry, FilterScope, KeyResolver};
use simplex_parser::Parser;
use simplex_types::expr::Expr;
use simplex_types::{ParseErrors, Value};

use crate::config::SimplexConfig;
use crate::error::Error;

/// Parses documents once and evaluates them against many contexts.
///
/// Build it up front (keys, filters, config), then share it freely: parsing
/// and evaluation only read from it.
#[derive(Debug, Clone)]
pub struct Simplex {
    config: SimplexConfig,
    keys: KeyResolver,
    filters: FilterRegistry,
}

impl Simplex {
    /// An engine with the built-in keys and filters.
    pub fn new() -> Self {
        Self::with_config(SimplexConfig::default())
    }

    pub fn with_config(config: SimplexConfig) -> Self {
        Self {
            config,
            keys: keys::standard(),
            filters: FilterRegistry::standard(),
        }
    }

    /// Put `resolver` in front of the keys this engine already knows.
    pub fn keys(mut self, resolver: KeyResolver) -> Self {
        self.keys = resolver.compose(&self.keys);
        self
    }

    /// Register a custom filter as `namespace.name`.
    pub fn filter<F>(mut self, namespace: &str, name: &str, filter: F) -> Self
    where
        F: Fn(Value, &[String], &FilterScope<'_>) -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.filters.register(namespace, name, filter);
        self
    }

    pub fn config(&self) -> &SimplexConfig {
        &self.config
    }

    pub fn key_resolver(&self) -> &KeyResolver {
        &self.keys
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Parse a decoded document.
    pub fn parse(&self, document: &serde_json::Value) -> Result<Expr, ParseErrors> {
        Parser::new(self.config.parse_options())
            .parse(document)
            .into_result()
    }

    /// Decode JSON text, then parse it.
    pub fn parse_str(&self, text: &str) -> Result<Expr, Error> {
        let document: serde_json::Value = serde_json::from_str(text)?;
        Ok(self.parse(&document)?)
    }

    /// Evaluate a parsed document.
    pub fn evaluate(&self, expr: &Expr, context: &Context) -> EvalResult<Value> {
        Evaluator::new(&self.keys, &self.filters)
            .with_gas_limit(self.config.gas_limit)
            .evaluate(expr, context)
    }

    /// Decode, parse and evaluate in one step.
    pub fn render(&self, text: &str, context: &Context) -> Result<serde_json::Value, Error> {
        let expr = self.parse_str(text)?;
        let output = self.evaluate(&expr, context)?;
        tracing::debug!(output = output.type_name(), "document rendered");
        Ok(output.into())
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}
