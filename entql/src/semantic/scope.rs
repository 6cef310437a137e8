use crate::error::{InvalidQuery, Reason};
use crate::schema::SchemaRef;
use crate::Result;

/// Variables visible to a single clause: the clause's binding names zipped
/// positionally with the query's sources.
///
/// Built once per clause and threaded through the type checker. Wildcards
/// never enter scope, so referencing `_` fails lookup like any other unbound
/// name.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: Vec<(String, SchemaRef)>,
}

impl Scope {
    pub fn new(binding: &[String], froms: &[SchemaRef]) -> Scope {
        let vars = binding
            .iter()
            .zip(froms)
            .filter(|(name, _)| name.as_str() != "_")
            .map(|(name, schema)| (name.clone(), *schema))
            .collect();
        Scope { vars }
    }

    pub fn lookup(&self, var: &str) -> Result<SchemaRef> {
        self.vars
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, schema)| *schema)
            .ok_or_else(|| {
                InvalidQuery::new(Reason::NotFound {
                    name: var.to_string(),
                    namespace: "binding".to_string(),
                })
            })
    }
}
