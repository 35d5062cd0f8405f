use std::fmt;

use super::error::ExprError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    True,
    False,
    Null,
    Int(i64),
    Str(String),
    Ident(String),
    Dot,
    Comma,
    LeftParen,
    RightParen,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::True => write!(f, "'true'"),
            Token::False => write!(f, "'false'"),
            Token::Null => write!(f, "'null'"),
            Token::Int(n) => write!(f, "number {n}"),
            Token::Str(s) => write!(f, "string '{s}'"),
            Token::Ident(name) => write!(f, "identifier '{name}'"),
            Token::Dot => write!(f, "'.'"),
            Token::Comma => write!(f, "','"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::Not => write!(f, "'!'"),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::And => write!(f, "'&&'"),
            Token::Or => write!(f, "'||'"),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ExprError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|(_, c)| *c);

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (token, width) = match (c, next) {
            ('(', _) => (Token::LeftParen, 1),
            (')', _) => (Token::RightParen, 1),
            ('.', _) => (Token::Dot, 1),
            (',', _) => (Token::Comma, 1),
            ('=', Some('=')) => (Token::Eq, 2),
            ('!', Some('=')) => (Token::Ne, 2),
            ('!', _) => (Token::Not, 1),
            ('<', Some('=')) => (Token::Le, 2),
            ('<', _) => (Token::Lt, 1),
            ('>', Some('=')) => (Token::Ge, 2),
            ('>', _) => (Token::Gt, 1),
            ('&', Some('&')) => (Token::And, 2),
            ('|', Some('|')) => (Token::Or, 2),
            ('\'', _) => {
                // '' inside a string is an escaped quote
                let mut value = String::new();
                let mut j = i + 1;
                loop {
                    match chars.get(j) {
                        None => return Err(ExprError::UnterminatedString { offset }),
                        Some((_, '\'')) if chars.get(j + 1).is_some_and(|(_, c)| *c == '\'') => {
                            value.push('\'');
                            j += 2;
                        }
                        Some((_, '\'')) => break,
                        Some((_, ch)) => {
                            value.push(*ch);
                            j += 1;
                        }
                    }
                }
                (Token::Str(value), j + 1 - i)
            }
            (c, next) if c.is_ascii_digit() || (c == '-' && next.is_some_and(|n| n.is_ascii_digit())) => {
                let mut j = i + 1;
                while chars.get(j).is_some_and(|(_, c)| c.is_ascii_digit()) {
                    j += 1;
                }
                let end = chars.get(j).map_or(source.len(), |(o, _)| *o);
                let text = &source[offset..end];
                let n = text.parse::<i64>().map_err(|_| ExprError::InvalidNumber {
                    text: text.to_string(),
                })?;
                (Token::Int(n), j - i)
            }
            (c, _) if is_ident_start(c) => {
                let mut j = i + 1;
                while chars.get(j).is_some_and(|(_, c)| is_ident_continue(*c)) {
                    j += 1;
                }
                let end = chars.get(j).map_or(source.len(), |(o, _)| *o);
                let token = match &source[offset..end] {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    word => Token::Ident(word.to_string()),
                };
                (token, j - i)
            }
            (ch, _) => return Err(ExprError::UnexpectedChar { ch, offset }),
        };

        tokens.push(SpannedToken { token, offset });
        i += width;
    }

    Ok(tokens)
}
