//! Facade error type.

use simplex_eval::EvalError;
use simplex_types::{ErrorCode, ParseErrors};
use thiserror::Error;

/// Any failure surfaced by the [`Simplex`](crate::Simplex) engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The input text is not valid JSON.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// The document has structural or marker errors.
    #[error("parse failed: {0}")]
    Parse(#[from] ParseErrors),
    /// Evaluation failed; the parsed document is still usable.
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// The configuration could not be loaded.
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),
}

impl Error {
    /// Code of the first diagnostic, if this error carries one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Parse(errors) => errors.first().map(|e| e.code),
            Self::Eval(err) => Some(err.code()),
            Self::Decode(_) | Self::Config(_) => None,
        }
    }
}
