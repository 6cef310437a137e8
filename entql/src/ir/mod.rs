//! The query intermediate representation.
//!
//! A [Query] is an immutable value assembled clause by clause through
//! [crate::builder::merge]. Each clause carries its expression, its binding
//! and the source coordinates it was written at, so validation errors can
//! point back at the offending clause.

mod expr;

pub use expr::{BinOp, Expr, Literal, UnOp};

use serde::{Deserialize, Serialize};

use crate::error::SourceLocation;
use crate::schema::SchemaRef;

/// A query over one or more entity sources.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Entity sources, in `from` order. Non-empty by validation time.
    pub froms: Vec<SchemaRef>,
    /// Boolean conditions, AND-combined at lowering.
    pub wheres: Vec<QueryExpr<Expr>>,
    pub select: Option<QueryExpr<Select>>,
    pub order_bys: Vec<QueryExpr<Vec<OrderByItem>>>,
    pub limit: Option<QueryExpr<Expr>>,
    pub offset: Option<QueryExpr<Expr>>,
}

impl From<SchemaRef> for Query {
    /// `from(entity)` — the seed of every query.
    fn from(schema: SchemaRef) -> Self {
        Query {
            froms: vec![schema],
            ..Default::default()
        }
    }
}

/// A clause expression together with its binding and source coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExpr<T> {
    pub expr: T,
    /// Variable names zipped positionally with the query's `froms`. `"_"` is
    /// the wildcard; it may repeat and never enters scope.
    pub binding: Vec<String>,
    pub location: Option<SourceLocation>,
}

impl<T> QueryExpr<T> {
    pub fn new(expr: T) -> Self {
        QueryExpr {
            expr,
            binding: Vec::new(),
            location: None,
        }
    }

    pub fn bind<S, I>(mut self, vars: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.binding = vars.into_iter().map(|v| v.into()).collect();
        self
    }

    pub fn at<S: Into<String>>(mut self, file: S, line: u32) -> Self {
        self.location = Some(SourceLocation::new(file, line));
        self
    }
}

/// Shape tag on a select, consumed by the row mapper when it decodes result
/// rows. The generator keys off the body shape instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectKind {
    Entity,
    Tuple,
    List,
    Expr,
}

/// The projection of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub kind: SelectKind,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
    /// Engine default; renders without a direction keyword.
    Default,
}

/// One `(direction, var, field)` ordering term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub direction: SortDirection,
    pub var: String,
    pub field: String,
}
