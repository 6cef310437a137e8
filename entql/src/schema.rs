//! The capability contract entity types satisfy, and materialized rows.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidQuery, Reason};
use crate::ir::Literal;
use crate::Result;

/// Declared type of an entity field.
///
/// `Unknown` covers fields backed by a database type the mapper has no
/// literal representation for, and lookups of undeclared fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    String,
    Boolean,
    Unknown,
}

/// Capability contract satisfied by every entity type.
///
/// Generated schema types implement this; the core reaches the backing
/// table, the field layout and the primary key only through this trait and
/// holds no references to concrete schemas.
pub trait Schema: Debug + Sync {
    /// Name of the backing table.
    fn dataset(&self) -> &str;

    /// Field names in declaration order, primary key first when present.
    fn field_names(&self) -> &[&str];

    /// Declared type of a field.
    fn field_type(&self, name: &str) -> FieldType;

    /// Primary key field, when the schema declares one.
    fn primary_key(&self) -> Option<&str>;
}

/// Entity references held by queries. Schemas are generated once and live for
/// the program, so a shared static reference is enough.
pub type SchemaRef = &'static dyn Schema;

/// A materialized entity value: one row of an entity's table, carrying its
/// schema as a witness.
///
/// Values are positional with [Schema::field_names]; the constructor checks
/// the arity so the generator can zip them without further checks.
#[derive(Debug, Clone)]
pub struct Row {
    schema: SchemaRef,
    values: Vec<Literal>,
}

impl Row {
    /// Build a row from values ordered as [Schema::field_names].
    pub fn new(schema: SchemaRef, values: Vec<Literal>) -> Result<Row> {
        if values.len() != schema.field_names().len() {
            return Err(InvalidQuery::new(Reason::Expected {
                who: Some(format!("entity `{}`", schema.dataset())),
                expected: format!("{} field values", schema.field_names().len()),
                found: values.len().to_string(),
            }));
        }
        Ok(Row { schema, values })
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema
    }

    /// Field name/value pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.schema
            .field_names()
            .iter()
            .copied()
            .zip(self.values.iter())
    }

    pub fn get(&self, field: &str) -> Option<&Literal> {
        self.schema
            .field_names()
            .iter()
            .position(|f| *f == field)
            .map(|index| &self.values[index])
    }
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;

    use super::*;
    use crate::test::post;

    #[test]
    fn test_row_arity_is_checked() {
        let error = Row::new(post(), vec![Literal::Integer(1)]).unwrap_err();
        assert_snapshot!(
            error.to_string(),
            @"invalid query: entity `post_entity` expected 6 field values, but found 1"
        );
    }

    #[test]
    fn test_row_field_access() {
        let row = Row::new(
            post(),
            vec![
                Literal::Integer(1),
                Literal::String("hello".to_string()),
                Literal::Integer(0),
                Literal::Float(4.5),
                Literal::Boolean(true),
                Literal::Null,
            ],
        )
        .unwrap();

        assert_eq!(row.get("title"), Some(&Literal::String("hello".to_string())));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.fields().count(), 6);
    }
}
