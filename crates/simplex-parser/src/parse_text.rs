//! Text scalars: interpolation markers and their filter pipelines.
//!
//! ```text
//! marker  := "${" key ( "|" filter )* "}"
//! key     := namespace ":" name
//! filter  := name ( ":" arg )*
//! ```

use simplex_lexer::{Lexer, Token, TokenKind};
use simplex_types::expr::{Call, Expr, FilterInvocation, Segment};
use simplex_types::{DocPath, ErrorCode, Key, ParseError};

use crate::parser::Parser;

impl Parser {
    /// Parse a text scalar. Text without markers stays a constant.
    pub(crate) fn parse_text(&mut self, text: &str, path: &DocPath) -> Option<Expr> {
        if !text.contains(simplex_lexer::MARKER_OPEN) {
            return Some(Expr::text(text));
        }

        let lexed = Lexer::new(text, path).lex();
        if lexed.errors.has_errors() {
            self.merge_errors(lexed.errors);
            return None;
        }

        let mut segments = Vec::new();
        let mut ok = true;
        let mut tokens = lexed.tokens.iter();
        while let Some(token) = tokens.next() {
            match &token.kind {
                TokenKind::Text(literal) => segments.push(Segment::Text(literal.clone())),
                TokenKind::MarkerOpen => {
                    let body: Vec<&Token> = tokens
                        .by_ref()
                        .take_while(|t| t.kind != TokenKind::MarkerClose)
                        .collect();
                    match self.parse_marker(&body, token.column, path) {
                        Some(call) => segments.push(Segment::Call(call)),
                        None => ok = false,
                    }
                }
                TokenKind::Eof => break,
                // The lexer only emits these between MarkerOpen and MarkerClose.
                TokenKind::Word(_) | TokenKind::Colon | TokenKind::Pipe | TokenKind::MarkerClose => {}
            }
        }

        ok.then_some(Expr::Interpolated(segments))
    }

    /// Parse the tokens between `${` and `}` into a call.
    fn parse_marker(&mut self, body: &[&Token], open_column: u32, path: &DocPath) -> Option<Call> {
        let mut stages = body.split(|t| t.kind == TokenKind::Pipe);

        let key_tokens = stages.next().unwrap_or(&[]);
        let key_parts = colon_parts(key_tokens);
        let key = match key_parts.as_slice() {
            [only] if only.is_empty() => {
                self.marker_error(ErrorCode::EMPTY_MARKER, "empty marker '${}'", open_column, path);
                return None;
            }
            [namespace, rest @ ..] if !rest.is_empty() => {
                match Key::parse(&format!("{namespace}:{}", rest.join(":"))) {
                    Some(key) => key,
                    None => {
                        self.missing_namespace(key_tokens, open_column, path);
                        return None;
                    }
                }
            }
            _ => {
                self.missing_namespace(key_tokens, open_column, path);
                return None;
            }
        };

        let mut filters = Vec::new();
        for stage in stages {
            let column = stage.first().map_or(open_column, |t| t.column);
            let mut parts = colon_parts(stage).into_iter();
            let name = parts.next().unwrap_or_default();
            if name.is_empty() {
                self.marker_error(
                    ErrorCode::EMPTY_FILTER_NAME,
                    "expected a filter name after '|'",
                    column,
                    path,
                );
                return None;
            }
            filters.push(FilterInvocation::new(name, parts));
        }

        Some(Call::new(key, filters))
    }

    fn missing_namespace(&mut self, key_tokens: &[&Token], open_column: u32, path: &DocPath) {
        let column = key_tokens.first().map_or(open_column, |t| t.column);
        let written: String = key_tokens.iter().map(|t| raw(t)).collect();
        self.push_error(
            ParseError::new(
                ErrorCode::MISSING_NAMESPACE,
                format!("expected 'namespace:name', found '{}'", written.trim()),
                path.clone(),
            )
            .at_column(column)
            .with_suggestion("qualify the key with a namespace, e.g. 'ns:name'"),
        );
    }

    fn marker_error(&mut self, code: ErrorCode, message: &str, column: u32, path: &DocPath) {
        self.push_error(ParseError::new(code, message, path.clone()).at_column(column));
    }
}

/// Split a run of marker tokens on `:` into trimmed parts.
fn colon_parts(tokens: &[&Token]) -> Vec<String> {
    let mut parts = vec![String::new()];
    for token in tokens {
        match &token.kind {
            TokenKind::Colon => parts.push(String::new()),
            TokenKind::Word(w) => {
                if let Some(last) = parts.last_mut() {
                    last.push_str(w);
                }
            }
            _ => {}
        }
    }
    parts.into_iter().map(|p| p.trim().to_string()).collect()
}

fn raw(token: &Token) -> String {
    match &token.kind {
        TokenKind::Word(w) => w.clone(),
        TokenKind::Colon => ":".to_string(),
        _ => String::new(),
    }
}
