//! Lowering of validated, normalized queries to SQL statements.

use itertools::Itertools;

use super::context::Context;
use super::gen_expr::translate_expr;
use crate::error::InvalidQuery;
use crate::ir::{Expr, OrderByItem, Query, QueryExpr, Select, SortDirection};
use crate::schema::SchemaRef;
use crate::Result;

pub(super) fn translate_select(query: &Query) -> Result<String> {
    let ctx = Context::new(&query.froms);
    let select = query
        .select
        .as_ref()
        .ok_or_else(|| InvalidQuery::new_bug("select missing after normalization"))?;

    let mut clauses = vec![
        format!("SELECT {}", translate_projection(select, &ctx)?),
        format!("FROM {}", translate_from(&ctx)),
    ];
    if let Some(wheres) = translate_wheres(&query.wheres, &ctx)? {
        clauses.push(wheres);
    }
    if !query.order_bys.is_empty() {
        clauses.push(translate_order_by(&query.order_bys, &ctx)?);
    }
    if let Some(limit) = &query.limit {
        let scope = ctx.scope(&limit.binding);
        clauses.push(format!("LIMIT {}", translate_expr(&limit.expr, &scope)?));
    }
    if let Some(offset) = &query.offset {
        let scope = ctx.scope(&offset.binding);
        clauses.push(format!("OFFSET {}", translate_expr(&offset.expr, &scope)?));
    }
    Ok(clauses.join("\n"))
}

pub(super) fn translate_update_all(
    query: &Query,
    binding: &[String],
    values: &[(String, Expr)],
) -> Result<String> {
    let ctx = Context::new(&query.froms);
    let (schema, alias) = single_source(&ctx, "update")?;

    let scope = ctx.scope(binding);
    let assignments: Vec<String> = values
        .iter()
        .map(|(field, expr)| Ok(format!("{field} = {}", translate_expr(expr, &scope)?)))
        .try_collect()?;

    let mut clauses = vec![
        format!("UPDATE {} AS {alias}", schema.dataset()),
        format!("SET {}", assignments.join(", ")),
    ];
    if let Some(wheres) = translate_wheres(&query.wheres, &ctx)? {
        clauses.push(wheres);
    }
    Ok(clauses.join("\n"))
}

pub(super) fn translate_delete_all(query: &Query) -> Result<String> {
    let ctx = Context::new(&query.froms);
    let (schema, alias) = single_source(&ctx, "delete")?;

    let mut clauses = vec![format!("DELETE FROM {} AS {alias}", schema.dataset())];
    if let Some(wheres) = translate_wheres(&query.wheres, &ctx)? {
        clauses.push(wheres);
    }
    Ok(clauses.join("\n"))
}

fn single_source<'a>(ctx: &'a Context, operation: &str) -> Result<(SchemaRef, &'a str)> {
    ctx.sources()
        .exactly_one()
        .map_err(|_| InvalidQuery::new_bug(format!("{operation} of a multi-source query")))
}

fn translate_from(ctx: &Context) -> String {
    ctx.sources()
        .map(|(schema, alias)| format!("{} AS {alias}", schema.dataset()))
        .join(", ")
}

/// The projection: tuple and list bodies are emitted element by element,
/// anything else as a single expression.
fn translate_projection(select: &QueryExpr<Select>, ctx: &Context) -> Result<String> {
    let scope = ctx.scope(&select.binding);
    match &select.expr.expr {
        Expr::Tuple(items) | Expr::List(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| translate_expr(item, &scope))
                .try_collect()?;
            Ok(items.join(", "))
        }
        expr => translate_expr(expr, &scope),
    }
}

fn translate_wheres(wheres: &[QueryExpr<Expr>], ctx: &Context) -> Result<Option<String>> {
    if wheres.is_empty() {
        return Ok(None);
    }
    let conditions: Vec<String> = wheres
        .iter()
        .map(|qe| {
            let scope = ctx.scope(&qe.binding);
            Ok(format!("({})", translate_expr(&qe.expr, &scope)?))
        })
        .try_collect()?;
    Ok(Some(format!("WHERE {}", conditions.join(" AND "))))
}

fn translate_order_by(
    order_bys: &[QueryExpr<Vec<OrderByItem>>],
    ctx: &Context,
) -> Result<String> {
    let mut terms = Vec::new();
    for qe in order_bys {
        let scope = ctx.scope(&qe.binding);
        for item in &qe.expr {
            let (_, alias) = scope.lookup(&item.var)?;
            let term = match item.direction {
                SortDirection::Asc => format!("{alias}.{} ASC", item.field),
                SortDirection::Desc => format!("{alias}.{} DESC", item.field),
                SortDirection::Default => format!("{alias}.{}", item.field),
            };
            terms.push(term);
        }
    }
    Ok(format!("ORDER BY {}", terms.join(", ")))
}
