use crate::error::InvalidQuery;
use crate::schema::SchemaRef;
use crate::Result;

/// Alias assignments for one query, built once and reused by every clause.
#[derive(Debug)]
pub(super) struct Context {
    froms: Vec<SchemaRef>,
    aliases: Vec<String>,
}

impl Context {
    pub fn new(froms: &[SchemaRef]) -> Context {
        let mut aliases: Vec<String> = Vec::with_capacity(froms.len());
        for schema in froms {
            let alias = alloc_alias(&aliases, schema.dataset());
            aliases.push(alias);
        }
        Context {
            froms: froms.to_vec(),
            aliases,
        }
    }

    /// Sources paired with their aliases, in `from` order.
    pub fn sources(&self) -> impl Iterator<Item = (SchemaRef, &str)> {
        self.froms
            .iter()
            .copied()
            .zip(self.aliases.iter().map(|alias| alias.as_str()))
    }

    /// The lowering scope of one clause: its binding zipped positionally
    /// with the sources and their aliases.
    pub fn scope<'a>(&'a self, binding: &'a [String]) -> AliasScope<'a> {
        let vars = binding
            .iter()
            .zip(self.sources())
            .filter(|(name, _)| name.as_str() != "_")
            .map(|(name, (schema, alias))| (name.as_str(), schema, alias))
            .collect();
        AliasScope { vars }
    }
}

/// SQL-side counterpart of [crate::semantic::Scope]: resolves clause
/// variables to the schema and alias of the source they bind.
#[derive(Debug)]
pub(super) struct AliasScope<'a> {
    vars: Vec<(&'a str, SchemaRef, &'a str)>,
}

impl<'a> AliasScope<'a> {
    pub fn lookup(&self, var: &str) -> Result<(SchemaRef, &'a str)> {
        self.vars
            .iter()
            .find(|(name, _, _)| *name == var)
            .map(|(_, schema, alias)| (*schema, *alias))
            .ok_or_else(|| {
                InvalidQuery::new_bug(format!("unresolved variable `{var}` during lowering"))
            })
    }
}

/// Pick the shortest `{initial}{n}` not yet taken, where `initial` is the
/// first character of the table name. `[posts, comments, posts]` becomes
/// `p0, c0, p1`; determinism depends only on the input order.
fn alloc_alias(taken: &[String], table: &str) -> String {
    let initial = table.chars().next().unwrap_or('t');
    let mut n = 0;
    loop {
        let candidate = format!("{initial}{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
