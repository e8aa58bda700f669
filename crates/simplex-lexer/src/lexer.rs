//! Marker lexer: splits template text into literal runs and marker tokens.
//!
//! Features:
//! - `${ ... }` markers with `:` and `|` punctuation inside
//! - A lone `$` or `{` outside a marker is ordinary text
//! - Unclosed markers (E100) and nested `${` (E104) are reported with columns
//! - Error recovery: keeps scanning after an error

use simplex_types::{DocPath, ErrorCode, ParseError, ParseErrors};

use crate::token::{Token, TokenKind, ARG_DELIMITER, MARKER_CLOSE, PIPE};

/// Lexer mode: literal text or inside a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    /// The `u32` is the column of the opening `${`.
    Marker { open_column: u32 },
}

/// The Simplex marker lexer.
pub struct Lexer<'src> {
    chars: Vec<char>,
    /// Location of the text scalar, for errors.
    path: &'src DocPath,
    /// Current character offset into `chars`.
    pos: usize,
    errors: ParseErrors,
    mode: Mode,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: ParseErrors,
}

impl<'src> Lexer<'src> {
    /// Create a lexer for the text scalar found at `path`.
    pub fn new(text: &str, path: &'src DocPath) -> Self {
        Self {
            chars: text.chars().collect(),
            path,
            pos: 0,
            errors: ParseErrors::empty(),
            mode: Mode::Text,
        }
    }

    /// Lex the whole text into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            let token = match self.mode {
                Mode::Text => self.scan_text(),
                Mode::Marker { .. } => self.scan_marker(),
            };
            match token {
                Some(token) => tokens.push(token),
                None => break,
            }
        }

        if let Mode::Marker { open_column } = self.mode {
            self.error(
                ErrorCode::UNCLOSED_MARKER,
                "unclosed '${': expected '}' before end of text",
                open_column,
            );
        }
        tokens.push(Token::new(TokenKind::Eof, self.column()));

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_marker_open(&self) -> bool {
        self.peek() == Some('$') && self.chars.get(self.pos + 1) == Some(&'{')
    }

    fn column(&self) -> u32 {
        u32::try_from(self.pos + 1).unwrap_or(u32::MAX)
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, column: u32) {
        self.errors
            .push_error(ParseError::new(code, message, self.path.clone()).at_column(column));
    }

    // ─────────────────────────────────────────────────────────────
    // Scanners
    // ─────────────────────────────────────────────────────────────

    /// Literal text up to the next `${`, or the `${` itself.
    fn scan_text(&mut self) -> Option<Token> {
        let start = self.column();
        if self.at_marker_open() {
            self.pos += 2;
            self.mode = Mode::Marker { open_column: start };
            return Some(Token::new(TokenKind::MarkerOpen, start));
        }

        let mut text = String::new();
        while let Some(c) = self.peek() {
            if self.at_marker_open() {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        if text.is_empty() {
            None
        } else {
            Some(Token::new(TokenKind::Text(text), start))
        }
    }

    /// Punctuation or a raw word inside a marker.
    fn scan_marker(&mut self) -> Option<Token> {
        loop {
            let start = self.column();
            let c = self.peek()?;

            if self.at_marker_open() {
                self.error(
                    ErrorCode::NESTED_MARKER,
                    "markers cannot be nested: found '${' inside a marker",
                    start,
                );
                self.pos += 2;
                continue;
            }

            let kind = match c {
                ARG_DELIMITER => TokenKind::Colon,
                PIPE => TokenKind::Pipe,
                MARKER_CLOSE => {
                    self.mode = Mode::Text;
                    TokenKind::MarkerClose
                }
                _ => return Some(self.scan_word(start)),
            };
            self.pos += 1;
            return Some(Token::new(kind, start));
        }
    }

    fn scan_word(&mut self, start: u32) -> Token {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, ARG_DELIMITER | PIPE | MARKER_CLOSE) || self.at_marker_open() {
                break;
            }
            word.push(c);
            self.pos += 1;
        }
        Token::new(TokenKind::Word(word), start)
    }
}
