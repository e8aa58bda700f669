use serde::{Deserialize, Serialize};
use std::fmt;

/// Name that makes a handler own every key of its namespace.
pub const WILDCARD: &str = "*";

/// A namespaced key, written `namespace:name` in templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    pub namespace: String,
    pub name: String,
}

impl Key {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The catch-all key for `namespace`.
    pub fn wildcard(namespace: impl Into<String>) -> Self {
        Self::new(namespace, WILDCARD)
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }

    /// Parse `namespace:name`. The name keeps any further `:` verbatim.
    ///
    /// Both halves are trimmed; returns `None` if either is empty.
    pub fn parse(text: &str) -> Option<Key> {
        let (namespace, name) = text.split_once(':')?;
        let (namespace, name) = (namespace.trim(), name.trim());
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Key::new(namespace, name))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("ns:key1"), Some(Key::new("ns", "key1")));
        assert_eq!(Key::parse(" ns : a.b "), Some(Key::new("ns", "a.b")));
        assert_eq!(Key::parse("ns:a:b"), Some(Key::new("ns", "a:b")));
        assert_eq!(Key::parse("nokey"), None);
        assert_eq!(Key::parse(":name"), None);
        assert_eq!(Key::parse("ns:"), None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::new("repeat", "item.name").to_string(), "repeat:item.name");
    }

    #[test]
    fn test_wildcard() {
        assert!(Key::wildcard("repeat").is_wildcard());
        assert!(!Key::new("repeat", "index").is_wildcard());
    }
}
