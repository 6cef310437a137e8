//! Merging of builder clauses into queries.

use crate::error::{ClauseKind, InvalidQuery, SourceLocation, WithErrorInfo};
use crate::ir::{Expr, OrderByItem, Query, QueryExpr, Select};
use crate::schema::SchemaRef;
use crate::Result;

/// One clause handed over by the builder front-end.
#[derive(Debug, Clone)]
pub enum Clause {
    From(SchemaRef),
    Where(QueryExpr<Expr>),
    Select(QueryExpr<Select>),
    OrderBy(QueryExpr<Vec<OrderByItem>>),
    Limit(QueryExpr<Expr>),
    Offset(QueryExpr<Expr>),
}

impl Clause {
    pub fn kind(&self) -> ClauseKind {
        match self {
            Clause::From(_) => ClauseKind::From,
            Clause::Where(_) => ClauseKind::Where,
            Clause::Select(_) => ClauseKind::Select,
            Clause::OrderBy(_) => ClauseKind::OrderBy,
            Clause::Limit(_) => ClauseKind::Limit,
            Clause::Offset(_) => ClauseKind::Offset,
        }
    }

    fn binding(&self) -> &[String] {
        match self {
            Clause::From(_) => &[],
            Clause::Where(qe) => &qe.binding,
            Clause::Select(qe) => &qe.binding,
            Clause::OrderBy(qe) => &qe.binding,
            Clause::Limit(qe) => &qe.binding,
            Clause::Offset(qe) => &qe.binding,
        }
    }

    fn location(&self) -> Option<&SourceLocation> {
        match self {
            Clause::From(_) => None,
            Clause::Where(qe) => qe.location.as_ref(),
            Clause::Select(qe) => qe.location.as_ref(),
            Clause::OrderBy(qe) => qe.location.as_ref(),
            Clause::Limit(qe) => qe.location.as_ref(),
            Clause::Offset(qe) => qe.location.as_ref(),
        }
    }
}

/// Append or assign `clause` on `base`, returning the merged query.
///
/// `from` appends a source; `where` and `order_by` accumulate; `select`,
/// `limit` and `offset` may be given at most once.
pub fn merge(base: Query, clause: Clause) -> Result<Query> {
    if !matches!(clause, Clause::From(_)) {
        check_binding(clause.binding(), base.froms.len())
            .with_clause(clause.kind())
            .with_location(clause.location().cloned())?;
    }

    let mut query = base;
    match clause {
        Clause::From(schema) => query.froms.push(schema),
        Clause::Where(qe) => query.wheres.push(qe),
        Clause::OrderBy(qe) => query.order_bys.push(qe),
        Clause::Select(qe) => {
            if query.select.is_some() {
                return Err(only_one(ClauseKind::Select, qe.location));
            }
            query.select = Some(qe);
        }
        Clause::Limit(qe) => {
            if query.limit.is_some() {
                return Err(only_one(ClauseKind::Limit, qe.location));
            }
            query.limit = Some(qe);
        }
        Clause::Offset(qe) => {
            if query.offset.is_some() {
                return Err(only_one(ClauseKind::Offset, qe.location));
            }
            query.offset = Some(qe);
        }
    }
    Ok(query)
}

fn only_one(kind: ClauseKind, location: Option<SourceLocation>) -> InvalidQuery {
    InvalidQuery::new_simple(format!("only one {kind} expression is allowed"))
        .with_clause(kind)
        .with_location(location)
}

/// Binding rules shared by the merger and the update flow: a non-wildcard
/// name is bound at most once, and a clause cannot bind more variables than
/// the query has sources.
pub(crate) fn check_binding(binding: &[String], from_count: usize) -> Result<()> {
    for (index, var) in binding.iter().enumerate() {
        if var != "_" && binding[..index].contains(var) {
            return Err(InvalidQuery::new_simple(format!(
                "variable `{var}` is bound twice"
            )));
        }
    }
    if binding.len() > from_count {
        return Err(InvalidQuery::new_simple(
            "cannot bind more variables than there are from expressions",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;

    use super::*;
    use crate::ir::Literal;
    use crate::test::{comment, post};

    fn limit(n: i64) -> Clause {
        Clause::Limit(QueryExpr::new(Expr::from(Literal::from(n))))
    }

    #[test]
    fn test_from_appends() {
        let query = merge(Query::from(post()), Clause::From(comment())).unwrap();
        assert_eq!(query.froms.len(), 2);
    }

    #[test]
    fn test_only_one_limit() {
        let query = merge(Query::from(post()), limit(10)).unwrap();
        let error = merge(query, limit(20)).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `limit`: only one limit expression is allowed"
        );
    }

    #[test]
    fn test_only_one_select() {
        let select = || {
            Clause::Select(
                QueryExpr::new(Select {
                    kind: crate::ir::SelectKind::Expr,
                    expr: Expr::field("p", "title"),
                })
                .bind(["p"]),
            )
        };
        let query = merge(Query::from(post()), select()).unwrap();
        let error = merge(query, select()).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `select`: only one select expression is allowed"
        );
    }

    #[test]
    fn test_binding_arity() {
        let clause = Clause::Where(
            QueryExpr::new(Expr::field("p", "published")).bind(["p", "c"]),
        );
        let error = merge(Query::from(post()), clause).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `where`: cannot bind more variables than there are from expressions"
        );
    }

    #[test]
    fn test_duplicate_binding() {
        let query = merge(Query::from(post()), Clause::From(comment())).unwrap();
        let clause = Clause::Where(
            QueryExpr::new(Expr::field("p", "published")).bind(["p", "p"]),
        );
        let error = merge(query, clause).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `where`: variable `p` is bound twice"
        );
    }

    #[test]
    fn test_wildcard_may_repeat() {
        let query = merge(Query::from(post()), Clause::From(comment())).unwrap();
        let clause = Clause::Where(
            QueryExpr::new(Expr::from(Literal::from(true))).bind(["_", "_"]),
        );
        assert!(merge(query, clause).is_ok());
    }
}
