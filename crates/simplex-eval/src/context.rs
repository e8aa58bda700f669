//! Evaluation context: immutable name → value bindings.
//!
//! A child context is a new frame pointing at its parent. Lookups search the
//! innermost frame first, so a child shadows its parent without touching it,
//! and clones are a reference-count bump.

use std::sync::Arc;

use simplex_types::{Mapping, Value};

#[derive(Debug)]
struct Frame {
    bindings: Mapping,
    parent: Option<Arc<Frame>>,
}

/// Runtime bindings supplied to an evaluation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    frame: Option<Arc<Frame>>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A child context binding one extra name.
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> Context {
        self.extend([(name.into(), value.into())])
    }

    /// A child context with several bindings. Later duplicates win.
    pub fn extend<K, I>(&self, bindings: I) -> Context
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let bindings: Mapping = bindings.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if bindings.is_empty() {
            return self.clone();
        }
        Context {
            frame: Some(Arc::new(Frame {
                bindings,
                parent: self.frame.clone(),
            })),
        }
    }

    /// Look up a name, innermost frame first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = self.frame.as_deref();
        while let Some(current) = frame {
            if let Some(value) = current.bindings.get(name) {
                return Some(value);
            }
            frame = current.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of frames above the empty root.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.frame.as_deref(), |f| f.parent.as_deref()).count()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Context::new().extend(iter)
    }
}

impl From<Mapping> for Context {
    fn from(bindings: Mapping) -> Self {
        Context::new().extend(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_shadows_parent() {
        let parent = Context::new().with("a", 1).with("b", 2);
        let child = parent.with("a", 10);
        assert_eq!(child.get("a"), Some(&Value::from(10)));
        assert_eq!(child.get("b"), Some(&Value::from(2)));
        assert_eq!(parent.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn missing_name() {
        let ctx: Context = [("x", Value::Null)].into_iter().collect();
        assert!(ctx.contains("x"));
        assert!(!ctx.contains("y"));
        assert_eq!(Context::new().get("x"), None);
    }

    #[test]
    fn empty_extend_adds_no_frame() {
        let ctx = Context::new().with("a", true);
        let same = ctx.extend(Vec::<(String, Value)>::new());
        assert_eq!(same.depth(), 1);
    }
}
