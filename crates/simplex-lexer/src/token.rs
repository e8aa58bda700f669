//! Token types for the Simplex marker lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of template text and
//! [`Token`], which pairs a kind with the column it starts at.

use std::fmt;

/// Opens a marker.
pub const MARKER_OPEN: &str = "${";
/// Closes a marker.
pub const MARKER_CLOSE: char = '}';
/// Separates the namespace from the name, and filter arguments.
pub const ARG_DELIMITER: char = ':';
/// Separates pipeline stages.
pub const PIPE: char = '|';

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based character column where the token starts.
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, column: u32) -> Self {
        Self { kind, column }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Literal text outside any marker.
    Text(String),
    /// `${`
    MarkerOpen,
    /// A raw run of characters inside a marker, untrimmed.
    Word(String),
    /// `:`
    Colon,
    /// `|`
    Pipe,
    /// `}` closing a marker.
    MarkerClose,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Text(s) => write!(f, "text \"{s}\""),
            TokenKind::MarkerOpen => f.write_str(MARKER_OPEN),
            TokenKind::Word(w) => write!(f, "'{w}'"),
            TokenKind::Colon => write!(f, "{ARG_DELIMITER}"),
            TokenKind::Pipe => write!(f, "{PIPE}"),
            TokenKind::MarkerClose => write!(f, "{MARKER_CLOSE}"),
            TokenKind::Eof => f.write_str("end of text"),
        }
    }
}
