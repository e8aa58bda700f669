//! Runtime error types for the Simplex evaluator.

use simplex_types::{ErrorCode, Key};
use thiserror::Error;

/// Evaluation error. Scoped to one `evaluate` call; the expression tree
/// stays usable afterwards.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// No resolver layer owns the key.
    #[error("unresolved key: {0}")]
    UnresolvedKey(Key),
    /// No filter registered under this name.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
    /// `@repeat` source is not a sequence.
    #[error("not iterable: {0}")]
    NotIterable(String),
    /// A filter or merge received a value it cannot work with.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// The document root selected no clause.
    #[error("no matching clause at document root")]
    NoMatchingClause,
    /// Step budget used up.
    #[error("gas exhausted")]
    GasExhausted,
}

impl EvalError {
    /// The diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedKey(_) => ErrorCode::UNRESOLVED_KEY,
            Self::UnknownFilter(_) => ErrorCode::UNKNOWN_FILTER,
            Self::NotIterable(_) => ErrorCode::NOT_ITERABLE,
            Self::TypeMismatch(_) => ErrorCode::TYPE_MISMATCH,
            Self::NoMatchingClause => ErrorCode::NO_MATCHING_CLAUSE,
            Self::GasExhausted => ErrorCode::GAS_EXHAUSTED,
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
