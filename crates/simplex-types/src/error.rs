use crate::DocPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of errors reported before the parser stops collecting.
pub const MAX_ERRORS: usize = 20;

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Directive,
    Evaluation,
}

/// Numeric error code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Marker syntax errors (E100–E199) ──
    pub const UNCLOSED_MARKER: Self = Self(100);
    pub const EMPTY_MARKER: Self = Self(101);
    pub const MISSING_NAMESPACE: Self = Self(102);
    pub const EMPTY_FILTER_NAME: Self = Self(103);
    pub const NESTED_MARKER: Self = Self(104);

    // ── Directive errors (E200–E299) ──
    pub const MALFORMED_DIRECTIVE: Self = Self(200);
    pub const UNKNOWN_DIRECTIVE: Self = Self(201);
    pub const STRUCTURAL_LIMIT_EXCEEDED: Self = Self(202);

    // ── Evaluation errors (E300–E399) ──
    pub const UNRESOLVED_KEY: Self = Self(300);
    pub const UNKNOWN_FILTER: Self = Self(301);
    pub const NOT_ITERABLE: Self = Self(302);
    pub const TYPE_MISMATCH: Self = Self(303);
    pub const NO_MATCHING_CLAUSE: Self = Self(304);
    pub const GAS_EXHAUSTED: Self = Self(305);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Directive,
            _ => ErrorCategory::Evaluation,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Directive => write!(f, "directive"),
            Self::Evaluation => write!(f, "evaluation"),
        }
    }
}

/// A structured parse-time diagnostic.
///
/// Tooling renders these from the fields; it must not parse [`fmt::Display`] output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    /// Error code (e.g., E200).
    pub code: ErrorCode,
    pub severity: Severity,
    /// Derived from the code.
    pub category: ErrorCategory,
    pub message: String,
    /// Where in the document the offending node sits.
    pub path: DocPath,
    /// 1-based character column inside a text scalar, for marker errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, path: DocPath) -> Self {
        Self {
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            path,
            column: None,
            suggestion: None,
        }
    }

    /// Point the error at a column of the text scalar at `path`.
    pub fn at_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(column) = self.column {
            write!(f, ":{column}")?;
        }
        write!(f, ": {} [{}] {}", self.code, self.category, self.message)
    }
}

impl std::error::Error for ParseError {}

/// All diagnostics from one parse, capped at a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseErrors {
    pub errors: Vec<ParseError>,
    pub warnings: Vec<ParseError>,
    pub total_errors: usize,
    pub total_warnings: usize,
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    MAX_ERRORS
}

impl ParseErrors {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self::with_limit(MAX_ERRORS)
    }

    /// Create an empty result that stores at most `limit` errors.
    ///
    /// The limit is at least 1, so a failed parse always carries its first error.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            total_errors: 0,
            total_warnings: 0,
            limit: limit.max(1),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Returns `true` once the stored errors reached the limit.
    pub fn is_full(&self) -> bool {
        self.errors.len() >= self.limit
    }

    /// Add an error, respecting the limit. The total still counts it.
    pub fn push_error(&mut self, error: ParseError) {
        if !self.is_full() {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: ParseError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Move every diagnostic of `other` into `self`.
    pub fn extend(&mut self, other: ParseErrors) {
        let dropped = other.total_errors.saturating_sub(other.errors.len());
        for e in other.errors {
            self.push_error(e);
        }
        self.total_errors += dropped;
        for w in other.warnings {
            self.push_warning(w);
        }
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }
}

impl Default for ParseErrors {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(first) if self.total_errors > 1 => {
                write!(f, "{first} (and {} more)", self.total_errors - 1)
            }
            Some(first) => write!(f, "{first}"),
            None => write!(f, "no errors"),
        }
    }
}

impl std::error::Error for ParseErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::UNCLOSED_MARKER.category(), ErrorCategory::Syntax);
        assert_eq!(
            ErrorCode::MALFORMED_DIRECTIVE.category(),
            ErrorCategory::Directive
        );
        assert_eq!(
            ErrorCode::NO_MATCHING_CLAUSE.category(),
            ErrorCategory::Evaluation
        );
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::MALFORMED_DIRECTIVE), "E200");
        assert_eq!(format!("{}", ErrorCode::UNRESOLVED_KEY), "E300");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(
            ErrorCode::UNCLOSED_MARKER,
            "unclosed '${'",
            DocPath::root().field("value"),
        )
        .at_column(7);
        assert_eq!(err.to_string(), "/value:7: E100 [syntax] unclosed '${'");
    }

    #[test]
    fn test_parse_error_with_suggestion() {
        let err = ParseError::new(
            ErrorCode::MALFORMED_DIRECTIVE,
            "@when expects a sequence",
            DocPath::root(),
        )
        .with_suggestion("wrap the clause in [ ]");
        assert_eq!(err.suggestion.as_deref(), Some("wrap the clause in [ ]"));
        assert_eq!(err.severity, Severity::Error);
    }

    #[test]
    fn test_parse_error_json_serialization() {
        let err = ParseError::new(
            ErrorCode::MALFORMED_DIRECTIVE,
            "@when expects a sequence",
            DocPath::root().field("PS").field("@when"),
        );
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""code":200"#));
        assert!(json.contains(r#""category":"directive""#));
        assert!(json.contains(r#""path":["PS","@when"]"#));
        assert!(!json.contains("column"));
        assert!(!json.contains("suggestion"));

        let back: ParseError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_parse_errors_limit() {
        let mut errs = ParseErrors::with_limit(3);
        for i in 0..5 {
            errs.push_error(ParseError::new(
                ErrorCode::EMPTY_MARKER,
                format!("error {i}"),
                DocPath::root().index(i),
            ));
        }
        assert_eq!(errs.errors.len(), 3);
        assert_eq!(errs.total_errors, 5);
        assert!(errs.has_errors());
        assert!(errs.is_full());
    }

    #[test]
    fn test_zero_limit_keeps_first_error() {
        let mut errs = ParseErrors::with_limit(0);
        assert!(!errs.is_full());
        errs.push_error(ParseError::new(ErrorCode::EMPTY_MARKER, "x", DocPath::root()));
        errs.push_error(ParseError::new(ErrorCode::EMPTY_MARKER, "y", DocPath::root()));
        assert_eq!(errs.errors.len(), 1);
        assert_eq!(errs.total_errors, 2);
        assert_ne!(errs.to_string(), "no errors");
    }

    #[test]
    fn test_parse_errors_display() {
        let mut errs = ParseErrors::empty();
        assert_eq!(errs.to_string(), "no errors");
        errs.push_error(ParseError::new(
            ErrorCode::UNKNOWN_DIRECTIVE,
            "unknown directive '@foo'",
            DocPath::root(),
        ));
        errs.push_error(ParseError::new(
            ErrorCode::EMPTY_MARKER,
            "empty marker",
            DocPath::root(),
        ));
        assert_eq!(
            errs.to_string(),
            "/: E201 [directive] unknown directive '@foo' (and 1 more)"
        );
    }

    #[test]
    fn test_extend_keeps_totals() {
        let mut a = ParseErrors::empty();
        let mut b = ParseErrors::with_limit(1);
        b.push_error(ParseError::new(ErrorCode::EMPTY_MARKER, "x", DocPath::root()));
        b.push_error(ParseError::new(ErrorCode::EMPTY_MARKER, "y", DocPath::root()));
        a.extend(b);
        assert_eq!(a.errors.len(), 1);
        assert_eq!(a.total_errors, 2);
    }
}
