//! Key resolution: handlers, layered resolvers, and composition.
//!
//! A [`KeyResolver`] is one immutable layer of `Key → handler` entries plus an
//! optional delegate. Lookup walks the chain front to back; in each layer an
//! exact key beats the namespace wildcard (`ns:*`).

mod builtin;

pub use builtin::{standard, BOOL_NAMESPACE, MATH_NAMESPACE, NUMBER_NAMESPACE, REPEAT_NAMESPACE};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use simplex_types::{Key, Value};

use crate::context::Context;
use crate::error::{EvalError, EvalResult};

/// Computes a value for a key.
pub trait KeyHandler: Send + Sync {
    fn call(&self, key: &Key, context: &Context) -> EvalResult<Value>;
}

/// Always yields the same value, ignoring the context.
#[derive(Debug, Clone)]
pub struct ConstKeyHandler {
    value: Value,
}

impl ConstKeyHandler {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl KeyHandler for ConstKeyHandler {
    fn call(&self, _key: &Key, _context: &Context) -> EvalResult<Value> {
        Ok(self.value.clone())
    }
}

/// Reads `context[key.namespace]` and walks `key.name` as a dotted path.
///
/// Yields `Null` when the binding or the path is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextKeyHandler;

impl KeyHandler for ContextKeyHandler {
    fn call(&self, key: &Key, context: &Context) -> EvalResult<Value> {
        Ok(context
            .get(&key.namespace)
            .and_then(|bound| bound.get_path(&key.name))
            .cloned()
            .unwrap_or_default())
    }
}

/// Wraps a closure.
pub struct FnKeyHandler<F>(pub F);

impl<F> KeyHandler for FnKeyHandler<F>
where
    F: Fn(&Key, &Context) -> EvalResult<Value> + Send + Sync,
{
    fn call(&self, key: &Key, context: &Context) -> EvalResult<Value> {
        (self.0)(key, context)
    }
}

type Handlers = HashMap<Key, Arc<dyn KeyHandler>>;

/// One layer of key handlers with an optional delegate.
///
/// Cloning shares the handler table; builder methods copy it on write, so a
/// resolver already handed out is never changed.
#[derive(Clone, Default)]
pub struct KeyResolver {
    handlers: Arc<Handlers>,
    delegate: Option<Arc<KeyResolver>>,
}

/// Where a key was found: the handler, the key it was registered for, and
/// the remaining dotted path to walk into its result.
struct Located<'r, 'k> {
    handler: &'r dyn KeyHandler,
    key: Key,
    rest: Option<&'k str>,
}

impl KeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a handler in this layer.
    pub fn with_handler(mut self, key: Key, handler: impl KeyHandler + 'static) -> Self {
        tracing::debug!(%key, "key handler registered");
        Arc::make_mut(&mut self.handlers).insert(key, Arc::new(handler));
        self
    }

    /// Bind a key to a constant.
    pub fn with_const(self, key: Key, value: impl Into<Value>) -> Self {
        self.with_handler(key, ConstKeyHandler::new(value))
    }

    /// Bind a key to a closure.
    pub fn with_fn<F>(self, key: Key, f: F) -> Self
    where
        F: Fn(&Key, &Context) -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.with_handler(key, FnKeyHandler(f))
    }

    /// A new resolver trying `self`'s layers first, then `delegate`'s.
    ///
    /// Neither input changes. Composition is associative.
    pub fn compose(&self, delegate: &KeyResolver) -> KeyResolver {
        let tail = match &self.delegate {
            Some(next) => next.compose(delegate),
            None => delegate.clone(),
        };
        tracing::debug!(layers = tail.layers().count() + 1, "key resolvers composed");
        KeyResolver {
            handlers: Arc::clone(&self.handlers),
            delegate: Some(Arc::new(tail)),
        }
    }

    /// `true` if some layer can produce a value for `key`.
    pub fn owns(&self, key: &Key) -> bool {
        self.locate(key).is_some()
    }

    /// Resolve `key` against `context`.
    pub fn resolve(&self, key: &Key, context: &Context) -> EvalResult<Value> {
        let located = self
            .locate(key)
            .ok_or_else(|| EvalError::UnresolvedKey(key.clone()))?;
        let value = located.handler.call(&located.key, context)?;
        Ok(match located.rest {
            Some(rest) => value.get_path(rest).cloned().unwrap_or_default(),
            None => value,
        })
    }

    fn layers(&self) -> impl Iterator<Item = &KeyResolver> {
        std::iter::successors(Some(self), |layer| layer.delegate.as_deref())
    }

    fn find(&self, key: &Key) -> Option<&dyn KeyHandler> {
        let wildcard = Key::wildcard(key.namespace.as_str());
        self.layers()
            .find_map(|layer| {
                layer
                    .handlers
                    .get(key)
                    .or_else(|| layer.handlers.get(&wildcard))
            })
            .map(|handler| handler.as_ref())
    }

    /// Find the handler for `key`, falling back to the longest owned dotted
    /// prefix of its name (`ns:a.b.c` → `ns:a.b` → `ns:a`).
    fn locate<'k>(&self, key: &'k Key) -> Option<Located<'_, 'k>> {
        if let Some(handler) = self.find(key) {
            return Some(Located {
                handler,
                key: key.clone(),
                rest: None,
            });
        }
        let mut prefix = key.name.as_str();
        while let Some((head, _)) = prefix.rsplit_once('.') {
            let head_key = Key::new(key.namespace.as_str(), head);
            if let Some(handler) = self.find(&head_key) {
                return Some(Located {
                    handler,
                    key: head_key,
                    rest: Some(&key.name[head.len() + 1..]),
                });
            }
            prefix = head;
        }
        None
    }
}

impl fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for layer in self.layers() {
            let mut keys: Vec<String> = layer.handlers.keys().map(Key::to_string).collect();
            keys.sort();
            list.entry(&keys);
        }
        list.finish()
    }
}
