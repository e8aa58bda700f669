//! Simplex: data-driven documents.
//!
//! ```text
//! JSON text → serde_json → Parser → Expr
//! Expr + KeyResolver + FilterRegistry + Context → Evaluator → Value
//! ```
//!
//! A document is ordinary JSON with `${ns:name | filter:arg}` markers in its
//! strings and `@if`, `@when`, `@value`, `@repeat`, `@container` directives
//! in its objects.
//!
//! ```
//! use simplex::{Context, Key, KeyResolver, Simplex, Value};
//!
//! let people = Value::from(serde_json::json!(["Fred", "Wilma"]));
//! let engine = Simplex::new().keys(KeyResolver::new().with_const(Key::new("ns", "people"), people));
//! let doc = r#"{ "@repeat": "${ns:people}", "name": "${repeat:item | upperCase}" }"#;
//! let out = engine.render(doc, &Context::new()).unwrap();
//! assert_eq!(out, serde_json::json!([{ "name": "FRED" }, { "name": "WILMA" }]));
//! ```

mod config;
mod engine;
mod error;

pub use config::SimplexConfig;
pub use engine::Simplex;
pub use error::Error;

pub use simplex_eval::{
    keys, Context, ConstKeyHandler, ContextKeyHandler, EvalError, EvalResult, FilterRegistry,
    FilterScope, FnKeyHandler, KeyHandler, KeyResolver,
};
pub use simplex_types::expr::Expr;
pub use simplex_types::{DocPath, ErrorCode, Key, ParseError, ParseErrors, Value};

pub use simplex_eval as eval;
pub use simplex_lexer as lexer;
pub use simplex_parser as parser;
pub use simplex_types as types;
