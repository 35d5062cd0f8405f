//! The expression language used in trigger `if` conditions and in
//! `${{ ... }}` string templates.
//!
//! Expressions see two namespaces: `event`, the JSON form of the event
//! being matched, and `env`, a flat string map. A path that does not
//! resolve yields `null` rather than an error.
//!
//! ```text
//! event.tool.name == 'bash' && contains(event.tool.args.command, 'rm -rf')
//! ```
//!
//! Parsing and evaluation are separate so a condition can be parsed once
//! when a workflow is loaded and evaluated against many events.

mod ast;
mod builtins;
mod error;
mod eval;
mod lexer;
mod parser;
mod value;

use std::collections::HashMap;

use serde_json::Value;

pub use ast::{BinaryOp, Expr, Literal};
pub use builtins::Builtin;
pub use error::ExprError;
pub use value::{to_text, truthy};

const TEMPLATE_OPEN: &str = "${{";
const TEMPLATE_CLOSE: &str = "}}";

impl Expr {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        parser::parse(source)
    }

    pub fn evaluate(&self, ctx: &Context) -> Result<Value, ExprError> {
        eval::evaluate(self, ctx)
    }
}

/// Evaluation context. Read-only while an expression runs.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub event: Value,
    pub env: HashMap<String, String>,
}

impl Context {
    pub fn new(event: Value, env: HashMap<String, String>) -> Self {
        Self { event, env }
    }

    /// Resolve a dotted path. The first segment selects the namespace.
    pub fn lookup(&self, segments: &[String]) -> Value {
        match segments.split_first() {
            Some((root, rest)) if root == "event" => walk(&self.event, rest),
            Some((root, [name])) if root == "env" => self
                .env
                .get(name)
                .map_or(Value::Null, |v| Value::String(v.clone())),
            _ => Value::Null,
        }
    }

    pub fn evaluate(&self, source: &str) -> Result<Value, ExprError> {
        Expr::parse(source)?.evaluate(self)
    }

    pub fn evaluate_bool(&self, source: &str) -> Result<bool, ExprError> {
        self.evaluate(source).map(|v| truthy(&v))
    }

    /// Expand every `${{ expr }}` span in `template`. Text outside spans is
    /// copied unchanged.
    pub fn evaluate_string(&self, template: &str) -> Result<String, ExprError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        let mut consumed = 0;

        while let Some(start) = rest.find(TEMPLATE_OPEN) {
            out.push_str(&rest[..start]);
            let body = &rest[start + TEMPLATE_OPEN.len()..];
            let end = find_close(body).ok_or(ExprError::UnterminatedTemplate {
                offset: consumed + start,
            })?;
            let value = self.evaluate(&body[..end])?;
            out.push_str(&to_text(&value));

            let advance = start + TEMPLATE_OPEN.len() + end + TEMPLATE_CLOSE.len();
            rest = &rest[advance..];
            consumed += advance;
        }

        out.push_str(rest);
        Ok(out)
    }
}

fn walk(root: &Value, segments: &[String]) -> Value {
    let mut current = root;
    for segment in segments {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Offset of the `}}` closing a template span, skipping any inside
/// single-quoted strings.
fn find_close(body: &str) -> Option<usize> {
    let mut in_string = false;
    for (i, c) in body.char_indices() {
        if c == '\'' {
            in_string = !in_string;
        } else if !in_string && body[i..].starts_with(TEMPLATE_CLOSE) {
            return Some(i);
        }
    }
    None
}
