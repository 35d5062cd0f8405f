use super::ast::{BinaryOp, Expr, Literal};
use super::builtins::Builtin;
use super::error::ExprError;
use super::lexer::{SpannedToken, Token, tokenize};

/// Recursive-descent parser. One method per precedence level, lowest first.
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(SpannedToken {
            token: Token::RightParen,
            offset,
        }) => Err(ExprError::UnbalancedParen { offset: *offset }),
        Some(t) => Err(unexpected(t, "end of expression")),
    }
}

fn unexpected(t: &SpannedToken, expected: &'static str) -> ExprError {
    ExprError::UnexpectedToken {
        found: t.token.to_string(),
        offset: t.offset,
        expected,
    }
}

impl Parser {
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while self.peek_token() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Self::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_equality()?;
        while self.peek_token() == Some(&Token::And) {
            self.advance();
            let right = self.parse_equality()?;
            left = Self::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.peek_token() == Some(&Token::Not) {
            self.advance();
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let Some(t) = self.advance() else {
            return Err(ExprError::UnexpectedEnd {
                expected: "expression",
            });
        };

        match t.token {
            Token::True => Ok(Expr::Literal(Literal::Bool(true))),
            Token::False => Ok(Expr::Literal(Literal::Bool(false))),
            Token::Null => Ok(Expr::Literal(Literal::Null)),
            Token::Int(n) => Ok(Expr::Literal(Literal::Int(n))),
            Token::Str(s) => Ok(Expr::Literal(Literal::Str(s))),
            Token::LeftParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(SpannedToken {
                        token: Token::RightParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(unexpected(&other, "')'")),
                    None => Err(ExprError::UnbalancedParen { offset: t.offset }),
                }
            }
            Token::Ident(name) if self.peek_token() == Some(&Token::LeftParen) => {
                self.parse_call(name)
            }
            Token::Ident(name) => self.parse_path(name),
            _ => Err(unexpected(&t, "expression")),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, ExprError> {
        let open = self.advance().map_or(0, |t| t.offset);
        let func = Builtin::from_name(&name).ok_or(ExprError::UnknownFunction { name })?;

        let mut args = Vec::new();
        if self.peek_token() == Some(&Token::RightParen) {
            self.advance();
        } else {
            loop {
                args.push(self.parse_or()?);
                match self.advance() {
                    Some(SpannedToken {
                        token: Token::Comma,
                        ..
                    }) => continue,
                    Some(SpannedToken {
                        token: Token::RightParen,
                        ..
                    }) => break,
                    Some(other) => return Err(unexpected(&other, "',' or ')'")),
                    None => return Err(ExprError::UnbalancedParen { offset: open }),
                }
            }
        }

        func.check_arity(args.len())?;
        Ok(Expr::Call { func, args })
    }

    fn parse_path(&mut self, root: String) -> Result<Expr, ExprError> {
        let mut segments = vec![root];
        while self.peek_token() == Some(&Token::Dot) {
            self.advance();
            let segment = match self.advance() {
                Some(SpannedToken {
                    token: Token::Ident(s),
                    ..
                }) => s,
                Some(SpannedToken {
                    token: Token::Int(n),
                    ..
                }) if n >= 0 => n.to_string(),
                // keywords are valid property names after a dot
                Some(SpannedToken {
                    token: Token::True, ..
                }) => "true".into(),
                Some(SpannedToken {
                    token: Token::False,
                    ..
                }) => "false".into(),
                Some(SpannedToken {
                    token: Token::Null, ..
                }) => "null".into(),
                Some(other) => return Err(unexpected(&other, "property name")),
                None => {
                    return Err(ExprError::UnexpectedEnd {
                        expected: "property name",
                    });
                }
            };
            segments.push(segment);
        }
        Ok(Expr::Path(segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Expr {
        Expr::Path(segments.iter().map(|s| s.to_string()).collect())
    }

    fn str_lit(s: &str) -> Expr {
        Expr::Literal(Literal::Str(s.into()))
    }

    #[test]
    fn simple_comparison() {
        assert_eq!(
            parse("event.tool.name == 'bash'").unwrap(),
            Expr::Binary {
                op: BinaryOp::Eq,
                left: Box::new(path(&["event", "tool", "name"])),
                right: Box::new(str_lit("bash")),
            }
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let Expr::Binary { op, right, .. } = parse("a || b && c").unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn relational_binds_tighter_than_equality() {
        let Expr::Binary { op, left, .. } = parse("1 < 2 == true").unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Eq);
        assert!(matches!(*left, Expr::Binary { op: BinaryOp::Lt, .. }));
    }

    #[test]
    fn not_applies_to_primary() {
        let Expr::Binary { left, .. } = parse("!a == b").unwrap() else {
            panic!("expected binary");
        };
        assert!(matches!(*left, Expr::Not(_)));
    }

    #[test]
    fn numeric_path_segment() {
        assert_eq!(
            parse("event.commit.files.0.path").unwrap(),
            path(&["event", "commit", "files", "0", "path"])
        );
    }

    #[test]
    fn function_call() {
        let expr = parse("contains(event.tool.args.command, 'rm -rf')").unwrap();
        assert!(matches!(
            expr,
            Expr::Call { func: Builtin::Contains, ref args } if args.len() == 2
        ));
    }

    #[test]
    fn zero_arg_call() {
        assert_eq!(
            parse("always()").unwrap(),
            Expr::Call {
                func: Builtin::Always,
                args: vec![]
            }
        );
    }

    #[test]
    fn unknown_function() {
        assert_eq!(
            parse("explode(1)"),
            Err(ExprError::UnknownFunction {
                name: "explode".into()
            })
        );
    }

    #[test]
    fn wrong_arity() {
        assert!(matches!(
            parse("startsWith('a')"),
            Err(ExprError::Arity { got: 1, .. })
        ));
    }

    #[test]
    fn unclosed_paren() {
        assert_eq!(
            parse("(a == b"),
            Err(ExprError::UnbalancedParen { offset: 0 })
        );
    }

    #[test]
    fn stray_close_paren() {
        assert_eq!(parse("a)"), Err(ExprError::UnbalancedParen { offset: 1 }));
    }

    #[test]
    fn trailing_operator() {
        assert_eq!(
            parse("a &&"),
            Err(ExprError::UnexpectedEnd {
                expected: "expression"
            })
        );
    }

    #[test]
    fn empty_source() {
        assert!(matches!(parse("   "), Err(ExprError::UnexpectedEnd { .. })));
    }

    #[test]
    fn adjacent_values() {
        assert!(matches!(
            parse("a b"),
            Err(ExprError::UnexpectedToken { offset: 2, .. })
        ));
    }
}
