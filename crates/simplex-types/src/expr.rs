//! Expression tree produced by the parser.
//!
//! Directives are decided once at parse time and become dedicated variants,
//! so evaluation is an exhaustive match with no field-name dispatch.
//! Trees are immutable after parse and may be evaluated many times.

use crate::{Key, Value};

// ══════════════════════════════════════════════════════════════════════════════
// Calls & Filters
// ══════════════════════════════════════════════════════════════════════════════

/// `| name:arg1:arg2` inside a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterInvocation {
    /// Bare (`upperCase`) or namespace-qualified (`text.upperCase`).
    pub name: String,
    pub args: Vec<String>,
}

impl FilterInvocation {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split `namespace.name`; `None` for bare names.
    pub fn qualified(&self) -> Option<(&str, &str)> {
        self.name.split_once('.')
    }
}

/// A key lookup followed by a filter pipeline: `${ns:name | f1 | f2:x}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub key: Key,
    pub filters: Vec<FilterInvocation>,
}

impl Call {
    pub fn new(key: Key, filters: Vec<FilterInvocation>) -> Self {
        Self { key, filters }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

/// A piece of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Call(Call),
}

/// An entry of an object node, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEntry {
    /// An ordinary field.
    Field(String, Expr),
    /// A `@container` branch; a mapping result is merged into the enclosing object.
    Merge(Expr),
}

/// One `(predicate, result)` arm of a conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// `None` always matches.
    pub predicate: Option<Expr>,
    pub result: Expr,
}

impl Clause {
    pub fn new(predicate: Option<Expr>, result: Expr) -> Self {
        Self { predicate, result }
    }
}

/// A parsed, evaluable node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(Value),
    /// Text with one or more markers. A lone marker spanning the whole
    /// text keeps the native type of its result.
    Interpolated(Vec<Segment>),
    Call(Call),
    Tree(Vec<TreeEntry>),
    List(Vec<Expr>),
    Repeat {
        source: Box<Expr>,
        body: Box<Expr>,
    },
    /// First matching clause wins; no match means the node is absent.
    Conditional(Vec<Clause>),
    /// Every predicate holds. Built from condition objects.
    All(Vec<Expr>),
    /// At least one predicate holds.
    Any(Vec<Expr>),
}

impl Expr {
    pub fn text(s: impl Into<String>) -> Self {
        Expr::Const(Value::Text(s.into()))
    }

    /// The call of a lone marker that spans the whole text, if this is one.
    pub fn as_single_call(&self) -> Option<&Call> {
        match self {
            Expr::Interpolated(segments) => match segments.as_slice() {
                [Segment::Call(call)] => Some(call),
                _ => None,
            },
            Expr::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Returns `true` if no directive node appears anywhere in this tree.
    pub fn is_directive_free(&self) -> bool {
        match self {
            Expr::Const(_) | Expr::Interpolated(_) | Expr::Call(_) => true,
            Expr::Tree(entries) => entries.iter().all(|entry| match entry {
                TreeEntry::Field(_, expr) => expr.is_directive_free(),
                TreeEntry::Merge(_) => false,
            }),
            Expr::List(items) => items.iter().all(Expr::is_directive_free),
            Expr::Repeat { .. } | Expr::Conditional(_) | Expr::All(_) | Expr::Any(_) => false,
        }
    }

    /// Visit every call in this tree, depth first, in source order.
    pub fn for_each_call<'a>(&'a self, f: &mut impl FnMut(&'a Call)) {
        match self {
            Expr::Const(_) => {}
            Expr::Interpolated(segments) => {
                for segment in segments {
                    if let Segment::Call(call) = segment {
                        f(call);
                    }
                }
            }
            Expr::Call(call) => f(call),
            Expr::Tree(entries) => {
                for entry in entries {
                    match entry {
                        TreeEntry::Field(_, expr) | TreeEntry::Merge(expr) => expr.for_each_call(f),
                    }
                }
            }
            Expr::List(items) | Expr::All(items) | Expr::Any(items) => {
                for item in items {
                    item.for_each_call(f);
                }
            }
            Expr::Repeat { source, body } => {
                source.for_each_call(f);
                body.for_each_call(f);
            }
            Expr::Conditional(clauses) => {
                for clause in clauses {
                    if let Some(predicate) = &clause.predicate {
                        predicate.for_each_call(f);
                    }
                    clause.result.for_each_call(f);
                }
            }
        }
    }
}
