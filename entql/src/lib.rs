//! # entql
//!
//! Typed query intermediate representation, validator, normalizer and
//! PostgreSQL generator for a relational data mapper.
//!
//! The builder front-end hands over fully-constructed clauses; this crate
//! merges them into a [Query], enforces typing and structural rules, fills
//! in defaults and emits SQL:
//!
//! ```ascii
//!   builder clauses
//!         │
//!   merge │  (builder)
//!         ▼
//!     Query AST
//!         │
//!  check  │  (semantic::validate, validate_update, validate_delete)
//!         │
//!  default│  (semantic::normalize)
//!  select ▼
//!     Query AST
//!         │
//!  lower  │  (sql)
//!         ▼
//!        SQL
//! ```
//!
//! The whole pipeline is a pure, synchronous transformer over immutable
//! values: every step returns a new query or a string, so it is safe to call
//! from any number of threads.
//!
//! Entity schemas enter the picture only through the [Schema] capability
//! trait; the crate holds no references to concrete schema types.
//!
//! ## Example
//!
//! ```
//! use entql::builder::{merge, Clause};
//! use entql::{BinOp, Expr, FieldType, Literal, Query, QueryExpr, Schema};
//!
//! #[derive(Debug)]
//! struct PostSchema;
//!
//! impl Schema for PostSchema {
//!     fn dataset(&self) -> &str {
//!         "posts"
//!     }
//!     fn field_names(&self) -> &[&str] {
//!         &["id", "title"]
//!     }
//!     fn field_type(&self, name: &str) -> FieldType {
//!         match name {
//!             "id" => FieldType::Integer,
//!             "title" => FieldType::String,
//!             _ => FieldType::Unknown,
//!         }
//!     }
//!     fn primary_key(&self) -> Option<&str> {
//!         Some("id")
//!     }
//! }
//!
//! static POST: PostSchema = PostSchema;
//!
//! # fn main() -> entql::Result<()> {
//! let query = merge(
//!     Query::from(&POST as entql::SchemaRef),
//!     Clause::Where(
//!         QueryExpr::new(Expr::binary(
//!             BinOp::Eq,
//!             Expr::field("p", "title"),
//!             Literal::from("x").into(),
//!         ))
//!         .bind(["p"]),
//!     ),
//! )?;
//!
//! let sql = entql::to_sql(query)?;
//! assert_eq!(sql, "SELECT p0.id, p0.title\nFROM posts AS p0\nWHERE (p0.title = 'x')");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod builder;
mod error;
pub mod ir;
mod schema;
pub mod semantic;
pub mod sql;
#[cfg(test)]
pub(crate) mod test;

pub use error::{ClauseKind, InvalidQuery, Reason, SourceLocation, WithErrorInfo};
pub use ir::{BinOp, Expr, Literal, Query, QueryExpr, Select, SelectKind, UnOp};
pub use schema::{FieldType, Row, Schema, SchemaRef};

pub type Result<T, E = InvalidQuery> = core::result::Result<T, E>;

/// Validate and normalize `queryable`, then lower it to a `SELECT`
/// statement.
///
/// This is the wrapper for:
/// - [semantic::validate] — structural invariants and clause types
/// - [semantic::normalize] — default projection for single-source queries
/// - [sql::select] — lowering to SQL text
pub fn to_sql(queryable: impl Into<Query>) -> Result<String> {
    let query = queryable.into();
    semantic::validate(&query, semantic::ValidateOptions::default())?;
    let query = semantic::normalize(query);
    sql::select(&query)
}

/// Emit the `INSERT` statement for one entity row.
pub fn insert(row: &Row) -> Result<String> {
    sql::insert(row)
}

/// Emit the `UPDATE` statement for one entity row, keyed by its primary key.
pub fn update(row: &Row) -> Result<String> {
    sql::update(row)
}

/// Emit the `DELETE` statement for one entity row, keyed by its primary key.
pub fn delete(row: &Row) -> Result<String> {
    sql::delete(row)
}

/// Validate `queryable` as a batch update and lower it to `UPDATE … SET`.
///
/// `values` are `(field, expression)` pairs; each field must be declared on
/// the single target entity and each expression must match its declared
/// type. `binding` names the target entity inside the value expressions.
pub fn update_all(
    queryable: impl Into<Query>,
    binding: &[String],
    values: &[(String, Expr)],
) -> Result<String> {
    let query = queryable.into();
    semantic::validate_update(&query, binding, values)?;
    sql::update_all(&query, binding, values)
}

/// Validate `queryable` as a batch delete and lower it to `DELETE … WHERE`.
pub fn delete_all(queryable: impl Into<Query>) -> Result<String> {
    let query = queryable.into();
    semantic::validate_delete(&query)?;
    sql::delete_all(&query)
}
