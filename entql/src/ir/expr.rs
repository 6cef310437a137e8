use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

/// A node of the restricted expression language.
///
/// Every shape a clause expression can take has a variant here; the
/// validator and the generator match exhaustively, so unknown shapes cannot
/// exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Expr {
    /// `var.field` — a field of the entity bound to `var`.
    Field { var: String, field: String },

    /// The whole entity bound to a variable.
    Var(String),

    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },

    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Closed interval over numbers.
    Range {
        first: Box<Expr>,
        last: Box<Expr>,
    },

    List(Vec<Expr>),

    Tuple(Vec<Expr>),

    Literal(Literal),
}

impl Expr {
    pub fn field<V: Into<String>, F: Into<String>>(var: V, field: F) -> Expr {
        Expr::Field {
            var: var.into(),
            field: field.into(),
        }
    }

    pub fn var<V: Into<String>>(var: V) -> Expr {
        Expr::Var(var.into())
    }

    pub fn unary(op: UnOp, expr: Expr) -> Expr {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn range(first: Expr, last: Expr) -> Expr {
        Expr::Range {
            first: Box::new(first),
            last: Box::new(last),
        }
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Literal(literal)
    }
}

/// Unary operators, spelled as in the query source language.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
pub enum UnOp {
    #[strum(serialize = "not")]
    Not,
    #[strum(serialize = "+")]
    Pos,
    #[strum(serialize = "-")]
    Neg,
}

/// Binary operators, spelled as in the query source language. The SQL
/// spelling lives with the generator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
pub enum BinOp {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Lte,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Gte,
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "in")]
    In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}
