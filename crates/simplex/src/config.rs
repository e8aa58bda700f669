//! Engine configuration.

use serde::{Deserialize, Serialize};
use simplex_parser::{ParseOptions, MAX_DEPTH};
use simplex_types::MAX_ERRORS;

use crate::error::Error;

/// Limits applied by a [`Simplex`](crate::Simplex) engine.
///
/// Every field has a default, so a partial JSON object is a valid config:
///
/// ```
/// let config = simplex::SimplexConfig::from_json(r#"{ "gas_limit": 10000 }"#).unwrap();
/// assert_eq!(config.max_errors, 20);
/// assert_eq!(config.gas_limit, Some(10000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimplexConfig {
    /// Parse errors collected before the parser stops. Zero behaves as 1.
    pub max_errors: usize,
    /// Deepest document nesting accepted by the parser.
    pub max_depth: usize,
    /// Evaluation steps allowed per call. `None` is unlimited.
    pub gas_limit: Option<u64>,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_errors: MAX_ERRORS,
            max_depth: MAX_DEPTH,
            gas_limit: None,
        }
    }
}

impl SimplexConfig {
    /// Load from JSON text.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(Error::Config)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_errors: self.max_errors,
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(SimplexConfig::from_json("{}").unwrap(), SimplexConfig::default());
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            SimplexConfig::from_json(r#"{ "max_errrors": 3 }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn parse_options_follow_config() {
        let config = SimplexConfig {
            max_errors: 3,
            max_depth: 8,
            gas_limit: None,
        };
        assert_eq!(
            config.parse_options(),
            ParseOptions {
                max_errors: 3,
                max_depth: 8
            }
        );
    }
}
