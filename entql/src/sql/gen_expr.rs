//! Lowering of expression trees to SQL text.

use itertools::Itertools;

use super::context::AliasScope;
use crate::error::InvalidQuery;
use crate::ir::{BinOp, Expr, Literal, UnOp};
use crate::Result;

pub(super) fn translate_expr(expr: &Expr, scope: &AliasScope) -> Result<String> {
    Ok(match expr {
        Expr::Field { var, field } => {
            let (_, alias) = scope.lookup(var)?;
            format!("{alias}.{field}")
        }
        // A bare variable stands for the whole entity: every field of its
        // source, in declaration order.
        Expr::Var(var) => {
            let (schema, alias) = scope.lookup(var)?;
            schema
                .field_names()
                .iter()
                .map(|field| format!("{alias}.{field}"))
                .join(", ")
        }
        Expr::Unary { op: UnOp::Not, expr } => {
            format!("NOT ({})", translate_expr(expr, scope)?)
        }
        Expr::Unary { op: UnOp::Pos, expr } => format!("+{}", translate_expr(expr, scope)?),
        Expr::Unary { op: UnOp::Neg, expr } => format!("-{}", translate_expr(expr, scope)?),
        Expr::Binary {
            op: op @ (BinOp::Eq | BinOp::NotEq),
            left,
            right,
        } => match null_comparison_operand(left, right) {
            Some(operand) => {
                let test = if *op == BinOp::Eq { "IS NULL" } else { "IS NOT NULL" };
                format!("{} {test}", translate_expr(operand, scope)?)
            }
            None => translate_binary(*op, left, right, scope)?,
        },
        Expr::Binary {
            op: BinOp::In,
            left,
            right,
        } => match right.as_ref() {
            Expr::Range { first, last } => format!(
                "{} BETWEEN {} AND {}",
                translate_expr(left, scope)?,
                translate_expr(first, scope)?,
                translate_expr(last, scope)?
            ),
            _ => format!(
                "{} = ANY ({})",
                translate_expr(left, scope)?,
                translate_expr(right, scope)?
            ),
        },
        Expr::Binary { op, left, right } => translate_binary(*op, left, right, scope)?,
        // In a value position a range stands for its enumeration.
        Expr::Range { first, last } => {
            let (first, last) = match (int_endpoint(first), int_endpoint(last)) {
                (Some(first), Some(last)) => (first, last),
                _ => {
                    return Err(InvalidQuery::new_bug(format!(
                        "range with non-literal endpoints in value position: {expr:?}"
                    )))
                }
            };
            let items = (first..=last).map(|n| n.to_string()).join(", ");
            format!("ARRAY[{items}]")
        }
        Expr::List(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| translate_expr(item, scope))
                .try_collect()?;
            format!("ARRAY[{}]", items.join(", "))
        }
        Expr::Tuple(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| translate_expr(item, scope))
                .try_collect()?;
            items.join(", ")
        }
        Expr::Literal(literal) => translate_literal(literal),
    })
}

fn translate_binary(op: BinOp, left: &Expr, right: &Expr, scope: &AliasScope) -> Result<String> {
    Ok(format!(
        "{} {} {}",
        translate_operand(left, scope)?,
        sql_operator(op),
        translate_operand(right, scope)?
    ))
}

/// Binary subexpressions are parenthesized as operands; everything else
/// binds tighter than any binary operator and stays bare.
fn translate_operand(expr: &Expr, scope: &AliasScope) -> Result<String> {
    let sql = translate_expr(expr, scope)?;
    Ok(if expr.is_binary() {
        format!("({sql})")
    } else {
        sql
    })
}

fn null_comparison_operand<'a>(left: &'a Expr, right: &'a Expr) -> Option<&'a Expr> {
    let is_null = |e: &Expr| e.as_literal().is_some_and(|l| l.is_null());
    if is_null(left) {
        Some(right)
    } else if is_null(right) {
        Some(left)
    } else {
        None
    }
}

fn int_endpoint(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Literal(Literal::Integer(n)) => Some(*n),
        _ => None,
    }
}

/// SQL spelling of each binary operator.
fn sql_operator(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "=",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::Lte => "<=",
        BinOp::Gt => ">",
        BinOp::Gte => ">=",
        BinOp::And => "AND",
        BinOp::Or => "OR",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        // rewritten to BETWEEN / ANY before reaching here
        BinOp::In => "IN",
    }
}

pub(super) fn translate_literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "NULL".to_string(),
        Literal::Boolean(true) => "TRUE".to_string(),
        Literal::Boolean(false) => "FALSE".to_string(),
        // TODO: match PostgreSQL's lexical rules for extreme values
        // (exponents, infinities) instead of Rust's `Display`.
        Literal::Integer(n) => n.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::String(s) => quote_string(s),
    }
}

/// Single-quote `s`, doubling `\` and `'`.
fn quote_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "''");
    format!("'{escaped}'")
}
