//! Object nodes and their `@` directives.
//!
//! Extraction order for one object:
//! 1. `@when` (first-match clauses) or `@value` (override) or the ordinary
//!    fields with any `@container` merges, in source order
//! 2. `@repeat` wraps that body
//! 3. `@if` gates the result, including a whole repetition

use serde_json::{Map, Value as Document};
use simplex_types::expr::{Call, Clause, Expr, FilterInvocation, TreeEntry};
use simplex_types::{DocPath, ErrorCode, Key, ParseError, Value};

use crate::parser::Parser;

/// Marks a directive field.
pub const DIRECTIVE_PREFIX: char = '@';

pub const IF: &str = "@if";
pub const WHEN: &str = "@when";
pub const VALUE: &str = "@value";
pub const REPEAT: &str = "@repeat";
pub const CONTAINER: &str = "@container";

/// Name of the comparison filter condition objects compile to.
const COND_FILTER: &str = "cond";

/// A non-directive entry of an object, in source order.
enum Entry<'doc> {
    Field(&'doc str, &'doc Document),
    Container(&'doc Document),
}

/// The directives and ordinary entries of one object.
#[derive(Default)]
struct Directives<'doc> {
    predicate: Option<&'doc Document>,
    when: Option<&'doc Document>,
    value: Option<&'doc Document>,
    repeat: Option<&'doc Document>,
    entries: Vec<Entry<'doc>>,
}

impl<'doc> Directives<'doc> {
    fn has_fields(&self) -> bool {
        !self.entries.is_empty()
    }
}

impl Parser {
    /// Parse an object node, wrapping it in a single-branch conditional when it carries `@if`.
    pub(crate) fn parse_object(&mut self, fields: &Map<String, Document>, path: &DocPath) -> Option<Expr> {
        let (predicate, body) = self.parse_directive_object(fields, path)?;
        Some(match predicate {
            Some(predicate) => Expr::Conditional(vec![Clause::new(Some(predicate), body)]),
            None => body,
        })
    }

    /// Parse an object into its `@if` predicate and the expression it guards.
    fn parse_directive_object(
        &mut self,
        fields: &Map<String, Document>,
        path: &DocPath,
    ) -> Option<(Option<Expr>, Expr)> {
        let directives = self.extract_directives(fields, path)?;
        let mut ok = true;

        let predicate = match directives.predicate {
            Some(node) => {
                let predicate = self.parse_predicate(node, &path.field(IF));
                ok &= predicate.is_some();
                predicate
            }
            None => None,
        };

        let body = if let Some(when) = directives.when {
            if directives.value.is_some() {
                self.malformed(
                    format!("{WHEN} cannot be combined with {VALUE}"),
                    path,
                    "move the value into a clause",
                );
                ok = false;
            }
            if directives.has_fields() {
                self.malformed(
                    format!("{WHEN} cannot be combined with sibling fields"),
                    path,
                    "move the fields into each clause",
                );
                ok = false;
            }
            self.parse_when(when, &path.field(WHEN))
        } else if let Some(value) = directives.value {
            if directives.has_fields() {
                tracing::trace!(%path, "{VALUE} overrides sibling fields");
            }
            self.parse_node(value, &path.field(VALUE))
        } else {
            self.parse_tree(&directives.entries, path)
        };

        let body = match (directives.repeat, body) {
            (Some(source), Some(body)) => {
                let source = self.parse_node(source, &path.field(REPEAT))?;
                Some(Expr::Repeat {
                    source: Box::new(source),
                    body: Box::new(body),
                })
            }
            (Some(source), None) => {
                // Still report errors in the source expression.
                self.parse_node(source, &path.field(REPEAT));
                None
            }
            (None, body) => body,
        };

        match body {
            Some(body) if ok => Some((predicate, body)),
            _ => None,
        }
    }

    /// Split an object into directives and ordinary entries.
    fn extract_directives<'doc>(
        &mut self,
        fields: &'doc Map<String, Document>,
        path: &DocPath,
    ) -> Option<Directives<'doc>> {
        let mut directives = Directives::default();
        let mut ok = true;
        for (name, node) in fields {
            if !name.starts_with(DIRECTIVE_PREFIX) {
                directives.entries.push(Entry::Field(name, node));
                continue;
            }
            match name.as_str() {
                IF => directives.predicate = Some(node),
                WHEN => directives.when = Some(node),
                VALUE => directives.value = Some(node),
                REPEAT => directives.repeat = Some(node),
                CONTAINER => directives.entries.push(Entry::Container(node)),
                unknown => {
                    self.push_error(
                        ParseError::new(
                            ErrorCode::UNKNOWN_DIRECTIVE,
                            format!("unknown directive '{unknown}'"),
                            path.field(unknown),
                        )
                        .with_suggestion(format!(
                            "expected one of {IF}, {WHEN}, {VALUE}, {REPEAT}, {CONTAINER}"
                        )),
                    );
                    ok = false;
                }
            }
        }
        ok.then_some(directives)
    }

    // ── Bodies ────────────────────────────────────────────────────────────────

    fn parse_tree(&mut self, entries: &[Entry<'_>], path: &DocPath) -> Option<Expr> {
        let mut tree = Vec::with_capacity(entries.len());
        let mut ok = true;
        for entry in entries {
            match entry {
                Entry::Field(name, node) => match self.parse_node(node, &path.field(*name)) {
                    Some(expr) => tree.push(TreeEntry::Field((*name).to_string(), expr)),
                    None => ok = false,
                },
                Entry::Container(node) => match self.parse_container(node, &path.field(CONTAINER)) {
                    Some(branches) => tree.extend(branches.into_iter().map(TreeEntry::Merge)),
                    None => ok = false,
                },
            }
        }
        ok.then_some(Expr::Tree(tree))
    }

    /// `@when: [clause, ...]`: one conditional arm per clause, in order.
    fn parse_when(&mut self, node: &Document, path: &DocPath) -> Option<Expr> {
        let Document::Array(items) = node else {
            self.malformed(
                format!("{WHEN} expects a sequence of clauses, found {}", kind_of(node)),
                path,
                "wrap the clauses in [ ]",
            );
            return None;
        };

        let mut clauses = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            let clause_path = path.index(i);
            let Document::Object(fields) = item else {
                self.malformed(
                    format!("{WHEN} clause must be an object, found {}", kind_of(item)),
                    &clause_path,
                    "use { \"@if\": ..., \"@value\": ... }",
                );
                ok = false;
                continue;
            };
            match self.nested(&clause_path, |parser| parser.parse_directive_object(fields, &clause_path)) {
                Some((predicate, result)) => clauses.push(Clause::new(predicate, result)),
                None => ok = false,
            }
        }
        ok.then_some(Expr::Conditional(clauses))
    }

    /// `@container`: one directive object, or a sequence of branch objects.
    fn parse_container(&mut self, node: &Document, path: &DocPath) -> Option<Vec<Expr>> {
        match node {
            Document::Object(fields) => self
                .nested(path, |parser| parser.parse_object(fields, path))
                .map(|expr| vec![expr]),
            Document::Array(items) => {
                let mut branches = Vec::with_capacity(items.len());
                let mut ok = true;
                for (i, item) in items.iter().enumerate() {
                    let branch_path = path.index(i);
                    match item {
                        Document::Object(fields) => match self
                            .nested(&branch_path, |parser| parser.parse_object(fields, &branch_path))
                        {
                            Some(expr) => branches.push(expr),
                            None => ok = false,
                        },
                        other => {
                            self.malformed(
                                format!("{CONTAINER} branch must be an object, found {}", kind_of(other)),
                                &branch_path,
                                "each branch is { \"@if\": ..., fields... }",
                            );
                            ok = false;
                        }
                    }
                }
                ok.then_some(branches)
            }
            other => {
                self.malformed(
                    format!(
                        "{CONTAINER} expects an object or a sequence of objects, found {}",
                        kind_of(other)
                    ),
                    path,
                    "use { \"@when\": [...] } or [ { \"@if\": ... } ]",
                );
                None
            }
        }
    }

    // ── Predicates ────────────────────────────────────────────────────────────

    /// `@if`: an expression, a boolean, or a condition object.
    fn parse_predicate(&mut self, node: &Document, path: &DocPath) -> Option<Expr> {
        match node {
            Document::String(text) => self.parse_text(text, path),
            Document::Bool(b) => Some(Expr::Const(Value::Bool(*b))),
            Document::Object(ops) => self.parse_condition_object(ops, path),
            other => {
                self.malformed(
                    format!(
                        "{IF} expects an expression, a boolean or a condition object, found {}",
                        kind_of(other)
                    ),
                    path,
                    "use \"${ns:key | cond:StringEquals:value}\"",
                );
                None
            }
        }
    }

    /// `{ "Op": { "ns:name": literal | [literal, ...] } }`: every entry must hold.
    fn parse_condition_object(&mut self, ops: &Map<String, Document>, path: &DocPath) -> Option<Expr> {
        let mut all = Vec::new();
        let mut ok = true;
        for (op, entries) in ops {
            let op_path = path.field(op);
            let Document::Object(entries) = entries else {
                self.malformed(
                    format!("condition '{op}' expects an object of key/value pairs"),
                    &op_path,
                    "use { \"ns:name\": \"value\" }",
                );
                ok = false;
                continue;
            };
            for (key_text, literal) in entries {
                let entry_path = op_path.field(key_text);
                let Some(key) = Key::parse(key_text) else {
                    self.push_error(
                        ParseError::new(
                            ErrorCode::MISSING_NAMESPACE,
                            format!("expected 'namespace:name', found '{key_text}'"),
                            entry_path,
                        )
                        .with_suggestion("qualify the key with a namespace, e.g. 'ns:name'"),
                    );
                    ok = false;
                    continue;
                };
                match literal {
                    Document::Array(options) => {
                        let mut any = Vec::with_capacity(options.len());
                        for (i, option) in options.iter().enumerate() {
                            match self.condition_literal(option, &entry_path.index(i)) {
                                Some(text) => any.push(compare(&key, op, text)),
                                None => ok = false,
                            }
                        }
                        all.push(Expr::Any(any));
                    }
                    scalar => match self.condition_literal(scalar, &entry_path) {
                        Some(text) => all.push(compare(&key, op, text)),
                        None => ok = false,
                    },
                }
            }
        }

        if !ok {
            return None;
        }
        if all.is_empty() {
            self.malformed(
                "condition object has no conditions".to_string(),
                path,
                "add at least one { \"Op\": { \"ns:name\": value } } entry",
            );
            return None;
        }
        Some(if all.len() == 1 {
            all.remove(0)
        } else {
            Expr::All(all)
        })
    }

    fn condition_literal(&mut self, node: &Document, path: &DocPath) -> Option<String> {
        match node {
            Document::Array(_) | Document::Object(_) => {
                self.malformed(
                    format!("condition value must be a scalar, found {}", kind_of(node)),
                    path,
                    "compare against text, a number, a boolean or null",
                );
                None
            }
            scalar => Some(Value::from(scalar).to_text()),
        }
    }

    fn malformed(&mut self, message: String, path: &DocPath, suggestion: &str) {
        self.push_error(
            ParseError::new(ErrorCode::MALFORMED_DIRECTIVE, message, path.clone())
                .with_suggestion(suggestion),
        );
    }
}

/// `key | cond:op:literal`
fn compare(key: &Key, op: &str, literal: String) -> Expr {
    Expr::Call(Call::new(
        key.clone(),
        vec![FilterInvocation {
            name: COND_FILTER.to_string(),
            args: vec![op.to_string(), literal],
        }],
    ))
}

fn kind_of(node: &Document) -> &'static str {
    match node {
        Document::Null => "null",
        Document::Bool(_) => "a boolean",
        Document::Number(_) => "a number",
        Document::String(_) => "text",
        Document::Array(_) => "a sequence",
        Document::Object(_) => "an object",
    }
}
