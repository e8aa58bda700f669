//! Core parser infrastructure: options, error reporting, node dispatch.

use serde_json::Value as Document;
use simplex_types::expr::Expr;
use simplex_types::{DocPath, ErrorCode, ParseError, ParseErrors, Value, MAX_ERRORS};

/// Default nesting limit for documents.
pub const MAX_DEPTH: usize = 64;

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Errors stored before the parser stops collecting. Zero behaves as 1.
    pub max_errors: usize,
    /// Deepest allowed document nesting.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_errors: MAX_ERRORS,
            max_depth: MAX_DEPTH,
        }
    }
}

/// The Simplex document parser.
///
/// Walks a decoded document and builds an [`Expr`] tree. Collects errors
/// and keeps walking sibling nodes so one parse reports as many problems
/// as possible.
pub struct Parser {
    options: ParseOptions,
    errors: ParseErrors,
    /// Current nesting depth.
    depth: usize,
    /// Set once the depth error has been reported.
    depth_reported: bool,
}

/// Result of parsing.
pub struct ParseResult {
    /// `None` whenever `errors` is non-empty.
    pub expr: Option<Expr>,
    pub errors: ParseErrors,
}

impl ParseResult {
    /// Collapse into a `Result`.
    pub fn into_result(self) -> simplex_types::Result<Expr> {
        match self.expr {
            Some(expr) if !self.errors.has_errors() => Ok(expr),
            _ => Err(self.errors),
        }
    }
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            errors: ParseErrors::with_limit(options.max_errors),
            depth: 0,
            depth_reported: false,
        }
    }

    /// Parse a whole document.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(mut self, document: &Document) -> ParseResult {
        let expr = self.parse_node(document, &DocPath::root());
        let expr = if self.errors.has_errors() { None } else { expr };
        tracing::debug!(
            errors = self.errors.total_errors,
            ok = expr.is_some(),
            "document parsed"
        );
        ParseResult {
            expr,
            errors: self.errors,
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn push_error(&mut self, error: ParseError) {
        self.errors.push_error(error);
    }

    pub(crate) fn merge_errors(&mut self, errors: ParseErrors) {
        self.errors.extend(errors);
    }

    /// `true` once enough errors were stored that further work is wasted.
    pub(crate) fn should_stop(&self) -> bool {
        self.errors.is_full()
    }

    // ── Node Dispatch ─────────────────────────────────────────────────────────

    /// Parse any node. Returns `None` if an error was reported for it.
    pub(crate) fn parse_node(&mut self, node: &Document, path: &DocPath) -> Option<Expr> {
        self.nested(path, |parser| match node {
            Document::String(text) => parser.parse_text(text, path),
            Document::Array(items) => parser.parse_list(items, path),
            Document::Object(fields) => parser.parse_object(fields, path),
            scalar => Some(Expr::Const(Value::from(scalar))),
        })
    }

    /// Run `parse` one nesting level deeper than the caller.
    ///
    /// Every recursion into a child node goes through here, so the depth
    /// limit holds whichever directive reached it.
    pub(crate) fn nested<T>(
        &mut self,
        path: &DocPath,
        parse: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.should_stop() || !self.enter(path) {
            return None;
        }
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_list(&mut self, items: &[Document], path: &DocPath) -> Option<Expr> {
        let mut elements = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match self.parse_node(item, &path.index(i)) {
                Some(expr) => elements.push(expr),
                None => ok = false,
            }
        }
        ok.then_some(Expr::List(elements))
    }

    /// Enforce the nesting limit. Reports once per parse.
    fn enter(&mut self, path: &DocPath) -> bool {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            self.depth -= 1;
            if !self.depth_reported {
                self.depth_reported = true;
                self.push_error(
                    ParseError::new(
                        ErrorCode::STRUCTURAL_LIMIT_EXCEEDED,
                        format!("document nesting exceeds {} levels", self.options.max_depth),
                        path.clone(),
                    )
                    .with_suggestion("flatten the document or raise max_depth"),
                );
            }
            return false;
        }
        true
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}
