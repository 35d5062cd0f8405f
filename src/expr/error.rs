use thiserror::Error;

/// Failure to parse or evaluate an expression.
///
/// Lookups through missing keys are not errors; they produce `null`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    // ── parse ──
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("integer literal '{text}' is out of range")]
    InvalidNumber { text: String },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unbalanced parentheses at offset {offset}")]
    UnbalancedParen { offset: usize },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("{name}() takes {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: String,
        got: usize,
    },

    #[error("unterminated template expression starting at offset {offset}")]
    UnterminatedTemplate { offset: usize },

    // ── evaluation ──
    #[error("cannot evaluate {left} {op} {right}: relational operands must be numbers")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("format placeholder {{{index}}} has no matching argument")]
    FormatIndex { index: usize },

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

impl ExprError {
    /// Whether the error comes from malformed source text rather than from
    /// evaluating well-formed source against a context.
    pub fn is_parse(&self) -> bool {
        !matches!(
            self,
            ExprError::TypeMismatch { .. } | ExprError::FormatIndex { .. } | ExprError::InvalidJson(_)
        )
    }
}
