//! Semantic validation of query ASTs.
//!
//! The entry points here orchestrate binding resolution, type checking and
//! normalization for the three flows the mapper exposes: plain selects
//! ([validate]), batch updates ([validate_update]) and batch deletes
//! ([validate_delete]). Every violation surfaces as an
//! [crate::error::InvalidQuery] annotated with the kind and source
//! coordinates of the clause it came from.

mod normalize;
mod scope;
mod types;

pub use normalize::normalize;
pub use scope::Scope;
pub use types::{type_of, Ty};

use crate::builder::check_binding;
use crate::error::{ClauseKind, InvalidQuery, Reason, WithErrorInfo};
use crate::ir::{Expr, Query, QueryExpr};
use crate::Result;

/// Options for [validate].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Skip the select-presence and select-type checks; the update and
    /// delete flows have no projection.
    pub skip_select: bool,
}

/// Check the structural invariants and clause types of `query`.
pub fn validate(query: &Query, opts: ValidateOptions) -> Result<()> {
    log::debug!("validating query over {} sources", query.froms.len());

    if query.froms.is_empty() {
        return Err(InvalidQuery::new_simple("a query must have a from expression"));
    }
    if !opts.skip_select && query.select.is_none() && query.froms.len() > 1 {
        return Err(InvalidQuery::new_simple(
            "a query must have a select expression if querying from more than one entity",
        )
        .push_hint("name what to return from each source in a select expression"));
    }

    for qe in &query.wheres {
        check_where(qe, query)
            .with_clause(ClauseKind::Where)
            .with_location(qe.location.clone())?;
    }
    for qe in &query.order_bys {
        check_order_by(qe, query)
            .with_clause(ClauseKind::OrderBy)
            .with_location(qe.location.clone())?;
    }
    if let Some(qe) = &query.limit {
        check_number(qe, query, "limit")
            .with_clause(ClauseKind::Limit)
            .with_location(qe.location.clone())?;
    }
    if let Some(qe) = &query.offset {
        check_number(qe, query, "offset")
            .with_clause(ClauseKind::Offset)
            .with_location(qe.location.clone())?;
    }
    if !opts.skip_select {
        if let Some(qe) = &query.select {
            check_select(qe, query)
                .with_clause(ClauseKind::Select)
                .with_location(qe.location.clone())?;
        }
    }
    Ok(())
}

/// Check the restricted shape and SET pairs of a batch update, then run
/// [validate] without the select checks.
pub fn validate_update(
    query: &Query,
    binding: &[String],
    values: &[(String, Expr)],
) -> Result<()> {
    check_restricted("update", query)?;
    check_binding(binding, query.froms.len())?;

    if values.is_empty() {
        return Err(InvalidQuery::new_simple("no fields to update given"));
    }

    let schema = query.froms[0];
    let scope = Scope::new(binding, &query.froms);
    for (field, expr) in values {
        let expected = types::field_ty(schema, field)?;
        let found = type_of(expr, &scope)?;
        if found != expected {
            return Err(InvalidQuery::new(Reason::Expected {
                who: Some(format!("value for field `{field}`")),
                expected: format!("a {expected} expression"),
                found: found.to_string(),
            }));
        }
    }

    validate(query, ValidateOptions { skip_select: true })
}

/// Check the restricted shape of a batch delete, then run [validate] without
/// the select checks.
pub fn validate_delete(query: &Query) -> Result<()> {
    check_restricted("delete", query)?;
    validate(query, ValidateOptions { skip_select: true })
}

/// Update and delete queries are `from` plus optional `where`s, over a
/// single entity.
fn check_restricted(operation: &str, query: &Query) -> Result<()> {
    let offending = if query.select.is_some() {
        Some(ClauseKind::Select)
    } else if !query.order_bys.is_empty() {
        Some(ClauseKind::OrderBy)
    } else if query.limit.is_some() {
        Some(ClauseKind::Limit)
    } else if query.offset.is_some() {
        Some(ClauseKind::Offset)
    } else {
        None
    };
    if let Some(kind) = offending {
        return Err(InvalidQuery::new_simple(format!(
            "{operation} query allows only `where` expressions, got: `{kind}`"
        ))
        .with_clause(kind));
    }
    if query.froms.is_empty() {
        return Err(InvalidQuery::new_simple("a query must have a from expression"));
    }
    if query.froms.len() > 1 {
        return Err(InvalidQuery::new_simple(format!(
            "{operation} query can only target a single entity"
        )));
    }
    Ok(())
}

fn check_where(qe: &QueryExpr<Expr>, query: &Query) -> Result<()> {
    check_binding(&qe.binding, query.froms.len())?;
    let scope = Scope::new(&qe.binding, &query.froms);
    let ty = type_of(&qe.expr, &scope)?;
    if ty != Ty::Boolean {
        return Err(InvalidQuery::new(Reason::Expected {
            who: Some("where clause".to_string()),
            expected: "a boolean expression".to_string(),
            found: ty.to_string(),
        }));
    }
    Ok(())
}

/// Select bodies are type-checked but the top-level type is unconstrained.
fn check_select(qe: &QueryExpr<crate::ir::Select>, query: &Query) -> Result<()> {
    check_binding(&qe.binding, query.froms.len())?;
    let scope = Scope::new(&qe.binding, &query.froms);
    type_of(&qe.expr.expr, &scope)?;
    Ok(())
}

fn check_order_by(qe: &QueryExpr<Vec<crate::ir::OrderByItem>>, query: &Query) -> Result<()> {
    check_binding(&qe.binding, query.froms.len())?;
    let scope = Scope::new(&qe.binding, &query.froms);
    for item in &qe.expr {
        let schema = scope.lookup(&item.var)?;
        types::field_ty(schema, &item.field)?;
    }
    Ok(())
}

fn check_number(qe: &QueryExpr<Expr>, query: &Query, who: &str) -> Result<()> {
    check_binding(&qe.binding, query.froms.len())?;
    let scope = Scope::new(&qe.binding, &query.froms);
    let ty = type_of(&qe.expr, &scope)?;
    if ty != Ty::Number {
        return Err(InvalidQuery::new(Reason::Expected {
            who: Some(format!("{who} clause")),
            expected: "a number expression".to_string(),
            found: ty.to_string(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;

    use super::*;
    use crate::builder::{merge, Clause};
    use crate::ir::{BinOp, Literal, OrderByItem, Select, SelectKind, SortDirection};
    use crate::test::{comment, post};

    fn where_clause(expr: Expr) -> Clause {
        Clause::Where(QueryExpr::new(expr).bind(["p"]).at("app/queries.rs", 7))
    }

    #[test]
    fn test_empty_froms() {
        let error = validate(&Query::default(), ValidateOptions::default()).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query: a query must have a from expression"
        );
    }

    #[test]
    fn test_multi_from_requires_select() {
        let query = merge(Query::from(post()), Clause::From(comment())).unwrap();
        let error = validate(&query, ValidateOptions::default()).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query: a query must have a select expression if querying from more than one entity"
        );

        assert!(validate(&query, ValidateOptions { skip_select: true }).is_ok());
    }

    #[test]
    fn test_where_must_be_boolean() {
        let query = merge(
            Query::from(post()),
            where_clause(Expr::field("p", "views")),
        )
        .unwrap();
        let error = validate(&query, ValidateOptions::default()).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `where` at app/queries.rs:7: where clause expected a boolean expression, but found number"
        );
    }

    #[test]
    fn test_order_by_field_must_exist() {
        let order_by = Clause::OrderBy(
            QueryExpr::new(vec![OrderByItem {
                direction: SortDirection::Asc,
                var: "p".to_string(),
                field: "body".to_string(),
            }])
            .bind(["p"]),
        );
        let query = merge(Query::from(post()), order_by).unwrap();
        let error = validate(&query, ValidateOptions::default()).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `order_by`: entity `post_entity` field `body` not found"
        );
    }

    #[test]
    fn test_limit_must_be_number() {
        let limit = Clause::Limit(QueryExpr::new(Expr::from(Literal::from("ten"))));
        let query = merge(Query::from(post()), limit).unwrap();
        let error = validate(&query, ValidateOptions::default()).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `limit`: limit clause expected a number expression, but found string"
        );
    }

    #[test]
    fn test_select_subexpressions_are_checked() {
        let select = Clause::Select(
            QueryExpr::new(Select {
                kind: SelectKind::Tuple,
                expr: Expr::Tuple(vec![
                    Expr::field("p", "title"),
                    Expr::field("p", "body"),
                ]),
            })
            .bind(["p"]),
        );
        let query = merge(Query::from(post()), select).unwrap();
        let error = validate(&query, ValidateOptions::default()).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `select`: entity `post_entity` field `body` not found"
        );
    }

    #[test]
    fn test_validation_accepts_normalized_single_from() {
        let query = Query::from(post());
        assert!(validate(&query, ValidateOptions::default()).is_ok());
    }

    #[test]
    fn test_independent_clauses_check_in_any_order() {
        let published = || where_clause(Expr::field("p", "published"));
        let has_views = || {
            where_clause(Expr::binary(
                BinOp::Gt,
                Expr::field("p", "views"),
                Expr::from(Literal::from(0)),
            ))
        };

        let forward = merge(Query::from(post()), published()).unwrap();
        let forward = merge(forward, has_views()).unwrap();
        let backward = merge(Query::from(post()), has_views()).unwrap();
        let backward = merge(backward, published()).unwrap();

        assert!(validate(&forward, ValidateOptions::default()).is_ok());
        assert!(validate(&backward, ValidateOptions::default()).is_ok());
    }

    fn update_values(field: &str, literal: Literal) -> Vec<(String, Expr)> {
        vec![(field.to_string(), Expr::from(literal))]
    }

    #[test]
    fn test_update_unknown_field() {
        let query = Query::from(post());
        let binding = vec!["p".to_string()];
        let error =
            validate_update(&query, &binding, &update_values("body", Literal::from("x")))
                .unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query: entity `post_entity` field `body` not found"
        );
    }

    #[test]
    fn test_update_type_mismatch() {
        let query = Query::from(post());
        let binding = vec!["p".to_string()];
        let error =
            validate_update(&query, &binding, &update_values("title", Literal::from(3)))
                .unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query: value for field `title` expected a string expression, but found number"
        );
    }

    #[test]
    fn test_update_numeric_collapse() {
        // integer literal into a float field, and vice versa
        let query = Query::from(post());
        let binding = vec!["p".to_string()];
        assert!(
            validate_update(&query, &binding, &update_values("rating", Literal::from(4)))
                .is_ok()
        );
        assert!(validate_update(
            &query,
            &binding,
            &update_values("views", Literal::from(4.0))
        )
        .is_ok());
    }

    #[test]
    fn test_update_requires_values() {
        let query = Query::from(post());
        let error = validate_update(&query, &[], &[]).unwrap_err();
        assert_snapshot!(error.to_string(), @"invalid query: no fields to update given");
    }

    #[test]
    fn test_update_rejects_select() {
        let select = Clause::Select(
            QueryExpr::new(Select {
                kind: SelectKind::Expr,
                expr: Expr::field("p", "title"),
            })
            .bind(["p"]),
        );
        let query = merge(Query::from(post()), select).unwrap();
        let binding = vec!["p".to_string()];
        let error =
            validate_update(&query, &binding, &update_values("title", Literal::from("x")))
                .unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `select`: update query allows only `where` expressions, got: `select`"
        );
    }

    #[test]
    fn test_delete_rejects_limit() {
        let limit = Clause::Limit(QueryExpr::new(Expr::from(Literal::from(1))));
        let query = merge(Query::from(post()), limit).unwrap();
        let error = validate_delete(&query).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query in `limit`: delete query allows only `where` expressions, got: `limit`"
        );
    }

    #[test]
    fn test_delete_single_entity() {
        let query = merge(Query::from(post()), Clause::From(comment())).unwrap();
        let error = validate_delete(&query).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query: delete query can only target a single entity"
        );
    }

    #[test]
    fn test_delete_with_where() {
        let query = merge(
            Query::from(post()),
            where_clause(Expr::binary(
                BinOp::Gt,
                Expr::field("p", "views"),
                Expr::from(Literal::from(10)),
            )),
        )
        .unwrap();
        assert!(validate_delete(&query).is_ok());
    }
}
