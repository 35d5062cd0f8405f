//! Builtin functions callable from expressions.
//!
//! Names are case-sensitive. Arity is checked when the call is parsed, so
//! the implementations below can index their arguments directly.

use serde_json::Value;

use super::error::ExprError;
use super::value::{loose_eq, to_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Contains,
    StartsWith,
    EndsWith,
    Format,
    Join,
    ToJson,
    FromJson,
    Always,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "contains" => Some(Builtin::Contains),
            "startsWith" => Some(Builtin::StartsWith),
            "endsWith" => Some(Builtin::EndsWith),
            "format" => Some(Builtin::Format),
            "join" => Some(Builtin::Join),
            "toJSON" => Some(Builtin::ToJson),
            "fromJSON" => Some(Builtin::FromJson),
            "always" => Some(Builtin::Always),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Contains => "contains",
            Builtin::StartsWith => "startsWith",
            Builtin::EndsWith => "endsWith",
            Builtin::Format => "format",
            Builtin::Join => "join",
            Builtin::ToJson => "toJSON",
            Builtin::FromJson => "fromJSON",
            Builtin::Always => "always",
        }
    }

    /// Minimum and maximum argument count. `None` means variadic.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Builtin::Contains | Builtin::StartsWith | Builtin::EndsWith => (2, Some(2)),
            Builtin::Format => (1, None),
            Builtin::Join => (1, Some(2)),
            Builtin::ToJson | Builtin::FromJson => (1, Some(1)),
            Builtin::Always => (0, Some(0)),
        }
    }

    pub fn check_arity(&self, got: usize) -> Result<(), ExprError> {
        let (min, max) = self.arity();
        let ok = got >= min && max.is_none_or(|max| got <= max);
        if ok {
            return Ok(());
        }
        let expected = match max {
            Some(max) if max == min => min.to_string(),
            Some(max) => format!("{min} to {max}"),
            None => format!("at least {min}"),
        };
        Err(ExprError::Arity {
            name: self.name(),
            expected,
            got,
        })
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, ExprError> {
        match self {
            Builtin::Contains => Ok(Value::Bool(contains(&args[0], &args[1]))),
            Builtin::StartsWith => Ok(Value::Bool(starts_with(&args[0], &args[1]))),
            Builtin::EndsWith => Ok(Value::Bool(ends_with(&args[0], &args[1]))),
            Builtin::Format => format(&to_text(&args[0]), &args[1..]).map(Value::String),
            Builtin::Join => {
                let sep = args.get(1).map_or_else(|| ",".to_string(), to_text);
                Ok(Value::String(join(&args[0], &sep)))
            }
            Builtin::ToJson => serde_json::to_string(&args[0])
                .map(Value::String)
                .map_err(|e| ExprError::InvalidJson(e.to_string())),
            Builtin::FromJson => serde_json::from_str(&to_text(&args[0]))
                .map_err(|e| ExprError::InvalidJson(e.to_string())),
            Builtin::Always => Ok(Value::Bool(true)),
        }
    }
}

/// Substring test for scalars, membership test for arrays.
/// String comparison ignores ASCII case in both forms.
pub fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        other => to_text(other)
            .to_ascii_lowercase()
            .contains(&to_text(needle).to_ascii_lowercase()),
    }
}

pub fn starts_with(s: &Value, prefix: &Value) -> bool {
    to_text(s)
        .to_ascii_lowercase()
        .starts_with(&to_text(prefix).to_ascii_lowercase())
}

pub fn ends_with(s: &Value, suffix: &Value) -> bool {
    to_text(s)
        .to_ascii_lowercase()
        .ends_with(&to_text(suffix).to_ascii_lowercase())
}

/// Replace `{N}` with the text of argument N. `{{` and `}}` produce literal
/// braces; any other brace is copied through.
pub fn format(template: &str, args: &[Value]) -> Result<String, ExprError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' if chars.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().filter(|c| c.is_ascii_digit()) {
                    digits.push(*d);
                    chars.next();
                }
                if chars.peek() != Some(&'}') {
                    out.push('{');
                    out.push_str(&digits);
                    continue;
                }
                chars.next();
                let index: usize = digits.parse().unwrap_or(usize::MAX);
                let arg = args.get(index).ok_or(ExprError::FormatIndex { index })?;
                out.push_str(&to_text(arg));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

pub fn join(value: &Value, sep: &str) -> String {
    match value {
        Value::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(sep),
        other => to_text(other),
    }
}
