//! Backend for lowering validated queries and entity rows to PostgreSQL.
//!
//! Everything here assumes input that already passed [crate::semantic]; an
//! AST shape the lowerer does not recognize is a programmer error and
//! surfaces as a [crate::error::Reason::Bug] rendering the offending node.
//!
//! Literals are inlined into the emitted SQL rather than bound as
//! parameters; string values from untrusted sources are a known injection
//! hazard of this design.

mod context;
mod gen_expr;
mod gen_query;

use itertools::Itertools;

use crate::error::InvalidQuery;
use crate::ir::{Expr, Query};
use crate::schema::Row;
use crate::Result;

/// Lower a validated, normalized query to a `SELECT` statement.
pub fn select(query: &Query) -> Result<String> {
    log::debug!("lowering select over {} sources", query.froms.len());
    gen_query::translate_select(query)
}

/// Lower a validated batch update to `UPDATE … SET`.
pub fn update_all(query: &Query, binding: &[String], values: &[(String, Expr)]) -> Result<String> {
    gen_query::translate_update_all(query, binding, values)
}

/// Lower a validated batch delete to `DELETE … WHERE`.
pub fn delete_all(query: &Query) -> Result<String> {
    gen_query::translate_delete_all(query)
}

/// `INSERT` a single entity row. When the schema declares a primary key, its
/// column is left to the database and handed back via `RETURNING`.
pub fn insert(row: &Row) -> Result<String> {
    let schema = row.schema();
    let pk = schema.primary_key();

    let (columns, values): (Vec<&str>, Vec<String>) = row
        .fields()
        .filter(|(field, _)| Some(*field) != pk)
        .map(|(field, value)| (field, gen_expr::translate_literal(value)))
        .unzip();

    let mut sql = format!(
        "INSERT INTO {} ({})\nVALUES ({})",
        schema.dataset(),
        columns.join(", "),
        values.join(", ")
    );
    if let Some(pk) = pk {
        sql.push_str(&format!("\nRETURNING {pk}"));
    }
    Ok(sql)
}

/// `UPDATE` a single entity row, keyed by its primary key.
pub fn update(row: &Row) -> Result<String> {
    let schema = row.schema();
    let pk = schema.primary_key().ok_or_else(|| {
        InvalidQuery::new_simple(format!(
            "cannot update entity `{}` without a primary key",
            schema.dataset()
        ))
    })?;
    let pk_value = pk_value(row, pk)?;

    let assignments = row
        .fields()
        .filter(|(field, _)| *field != pk)
        .map(|(field, value)| format!("{field} = {}", gen_expr::translate_literal(value)))
        .join(", ");

    Ok(format!(
        "UPDATE {} SET {assignments}\nWHERE {pk} = {pk_value}",
        schema.dataset()
    ))
}

/// `DELETE` a single entity row, keyed by its primary key.
pub fn delete(row: &Row) -> Result<String> {
    let schema = row.schema();
    let pk = schema.primary_key().ok_or_else(|| {
        InvalidQuery::new_simple(format!(
            "cannot delete entity `{}` without a primary key",
            schema.dataset()
        ))
    })?;
    let pk_value = pk_value(row, pk)?;

    Ok(format!(
        "DELETE FROM {}\nWHERE {pk} = {pk_value}",
        schema.dataset()
    ))
}

fn pk_value(row: &Row, pk: &str) -> Result<String> {
    let value = row
        .get(pk)
        .ok_or_else(|| InvalidQuery::new_bug(format!("primary key `{pk}` missing from row")))?;
    Ok(gen_expr::translate_literal(value))
}
