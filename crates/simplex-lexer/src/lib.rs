//! Simplex lexer: splits template text into literal runs and `${...}` marker tokens.

pub mod lexer;
pub mod token;

pub use lexer::{LexResult, Lexer};
pub use token::{Token, TokenKind, ARG_DELIMITER, MARKER_CLOSE, MARKER_OPEN, PIPE};
