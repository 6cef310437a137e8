//! Type inference over the restricted expression language.

use crate::error::{InvalidQuery, Reason};
use crate::ir::{BinOp, Expr, Literal, UnOp};
use crate::schema::{FieldType, SchemaRef};
use crate::semantic::Scope;
use crate::Result;

/// Inferred type of an expression.
///
/// Integer and float collapse to [Ty::Number] after field lookup, so
/// cross-numeric comparison and arithmetic need no coercion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Ty {
    Number,
    Boolean,
    String,
    Nil,
    List,
    Tuple,
    Entity,
    /// A field backed by a type the mapper cannot express.
    Unknown,
}

impl From<FieldType> for Ty {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Integer | FieldType::Float => Ty::Number,
            FieldType::String => Ty::String,
            FieldType::Boolean => Ty::Boolean,
            FieldType::Unknown => Ty::Unknown,
        }
    }
}

/// Infer the type of `expr` under `scope`, validating every subexpression.
pub fn type_of(expr: &Expr, scope: &Scope) -> Result<Ty> {
    Ok(match expr {
        Expr::Field { var, field } => {
            let schema = scope.lookup(var)?;
            field_ty(schema, field)?
        }
        Expr::Var(var) => {
            scope.lookup(var)?;
            Ty::Entity
        }
        Expr::Unary { op, expr } => {
            let ty = type_of(expr, scope)?;
            match op {
                UnOp::Not => {
                    expect_operand(format!("argument of `{op}`"), Ty::Boolean, ty)?;
                    Ty::Boolean
                }
                UnOp::Pos | UnOp::Neg => {
                    expect_operand(format!("argument of unary `{op}`"), Ty::Number, ty)?;
                    Ty::Number
                }
            }
        }
        Expr::Binary { op, left, right } => {
            let left = type_of(left, scope)?;
            let right = type_of(right, scope)?;
            binary_ty(*op, left, right)?
        }
        Expr::Range { first, last } => {
            expect_operand("range endpoint", Ty::Number, type_of(first, scope)?)?;
            expect_operand("range endpoint", Ty::Number, type_of(last, scope)?)?;
            Ty::List
        }
        Expr::List(items) => {
            for item in items {
                type_of(item, scope)?;
            }
            Ty::List
        }
        Expr::Tuple(items) => {
            for item in items {
                type_of(item, scope)?;
            }
            Ty::Tuple
        }
        Expr::Literal(literal) => match literal {
            Literal::Null => Ty::Nil,
            Literal::Boolean(_) => Ty::Boolean,
            Literal::Integer(_) | Literal::Float(_) => Ty::Number,
            Literal::String(_) => Ty::String,
        },
    })
}

/// Declared type of `field` on `schema`, collapsed to [Ty]. Fails when the
/// entity does not declare the field.
pub(crate) fn field_ty(schema: SchemaRef, field: &str) -> Result<Ty> {
    if !schema.field_names().contains(&field) {
        return Err(InvalidQuery::new(Reason::NotFound {
            name: field.to_string(),
            namespace: format!("entity `{}` field", schema.dataset()),
        }));
    }
    Ok(Ty::from(schema.field_type(field)))
}

fn binary_ty(op: BinOp, left: Ty, right: Ty) -> Result<Ty> {
    match op {
        BinOp::Eq | BinOp::NotEq => {
            if left == Ty::Nil || right == Ty::Nil {
                return Ok(Ty::Boolean);
            }
            if left == Ty::Unknown || right == Ty::Unknown {
                return Err(InvalidQuery::new(Reason::Expected {
                    who: Some(format!("comparison `{op}`")),
                    expected: "operands of a known type".to_string(),
                    found: format!("{left} and {right}"),
                }));
            }
            if left != right {
                return Err(InvalidQuery::new(Reason::Expected {
                    who: Some(format!("comparison `{op}`")),
                    expected: "operands of the same type".to_string(),
                    found: format!("{left} and {right}"),
                }));
            }
            Ok(Ty::Boolean)
        }
        BinOp::And | BinOp::Or => {
            expect_operands(op, Ty::Boolean, left, right)?;
            Ok(Ty::Boolean)
        }
        BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
            expect_operands(op, Ty::Number, left, right)?;
            Ok(Ty::Boolean)
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
            expect_operands(op, Ty::Number, left, right)?;
            Ok(Ty::Number)
        }
        BinOp::In => {
            if right != Ty::List {
                return Err(InvalidQuery::new(Reason::Expected {
                    who: Some("right-hand side of `in`".to_string()),
                    expected: "a list".to_string(),
                    found: right.to_string(),
                }));
            }
            Ok(Ty::Boolean)
        }
    }
}

fn expect_operands(op: BinOp, expected: Ty, left: Ty, right: Ty) -> Result<()> {
    if left == expected && right == expected {
        return Ok(());
    }
    Err(InvalidQuery::new(Reason::Expected {
        who: Some(format!("binary operator `{op}`")),
        expected: format!("{expected} operands"),
        found: format!("{left} and {right}"),
    }))
}

fn expect_operand<S: Into<String>>(who: S, expected: Ty, found: Ty) -> Result<()> {
    if found == expected {
        return Ok(());
    }
    Err(InvalidQuery::new(Reason::Expected {
        who: Some(who.into()),
        expected: format!("a {expected} expression"),
        found: found.to_string(),
    }))
}
