//! Shared types for Simplex.
//!
//! This crate defines the runtime value model, namespaced keys, the parsed
//! expression tree, document locations, and the structured diagnostics used
//! across all Simplex stages.

mod error;
mod key;
mod path;
mod value;
pub mod expr;

pub use error::{ErrorCategory, ErrorCode, ParseError, ParseErrors, Severity, MAX_ERRORS};
pub use key::{Key, WILDCARD};
pub use path::{DocPath, PathSegment};
pub use value::{Mapping, Number, Value};

/// Result type used by the parsing stages.
pub type Result<T> = std::result::Result<T, ParseErrors>;
