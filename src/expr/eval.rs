use std::cmp::Ordering;

use serde_json::Value;

use super::Context;
use super::ast::{BinaryOp, Expr, Literal};
use super::error::ExprError;
use super::value::{compare_numbers, loose_eq, truthy, type_name};

pub fn evaluate(expr: &Expr, ctx: &Context) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(lit) => Ok(match lit {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
            Literal::Int(n) => Value::from(*n),
            Literal::Str(s) => Value::String(s.clone()),
        }),
        Expr::Path(segments) => Ok(ctx.lookup(segments)),
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&evaluate(inner, ctx)?))),
        Expr::Binary { op, left, right } => binary(*op, left, right, ctx),
        Expr::Call { func, args } => {
            let values = args
                .iter()
                .map(|a| evaluate(a, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            func.call(&values)
        }
    }
}

fn binary(op: BinaryOp, left: &Expr, right: &Expr, ctx: &Context) -> Result<Value, ExprError> {
    // Logical operators short-circuit before the right side is evaluated.
    match op {
        BinaryOp::And => {
            let result = truthy(&evaluate(left, ctx)?) && truthy(&evaluate(right, ctx)?);
            return Ok(Value::Bool(result));
        }
        BinaryOp::Or => {
            let result = truthy(&evaluate(left, ctx)?) || truthy(&evaluate(right, ctx)?);
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    let l = evaluate(left, ctx)?;
    let r = evaluate(right, ctx)?;

    let result = match op {
        BinaryOp::Eq => loose_eq(&l, &r),
        BinaryOp::Ne => !loose_eq(&l, &r),
        _ => {
            let ordering = match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
                _ => None,
            };
            let Some(ordering) = ordering else {
                return Err(ExprError::TypeMismatch {
                    op: op.as_str(),
                    left: type_name(&l),
                    right: type_name(&r),
                });
            };
            match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }
        }
    };

    Ok(Value::Bool(result))
}
