use crate::ir::{Expr, Query, QueryExpr, Select, SelectKind};

/// Install the default projection on queries that have exactly one source and
/// no explicit select: the whole bound entity, emitted as one row tuple.
///
/// Queries with an explicit select, or with more than one source, pass
/// through untouched; the latter are rejected by the validator. Idempotent.
pub fn normalize(query: Query) -> Query {
    if query.select.is_some() || query.froms.len() != 1 {
        return query;
    }

    let select = QueryExpr::new(Select {
        kind: SelectKind::Entity,
        expr: Expr::var("entity"),
    })
    .bind(["entity"]);

    Query {
        select: Some(select),
        ..query
    }
}
