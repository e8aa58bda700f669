//! Simplex parser: converts a decoded document into an expression tree.
//!
//! The parser never sees raw text formats; callers decode first (e.g. with
//! `serde_json`) and hand over the generic tree.

mod parse_directive;
mod parse_text;
mod parser;

pub use parse_directive::{CONTAINER, DIRECTIVE_PREFIX, IF, REPEAT, VALUE, WHEN};
pub use parser::{ParseOptions, ParseResult, Parser, MAX_DEPTH};

use simplex_types::expr::Expr;

/// Parse a document with default options.
pub fn parse_document(document: &serde_json::Value) -> simplex_types::Result<Expr> {
    Parser::default().parse(document).into_result()
}
