use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The single error kind produced by the query core.
///
/// Every failure, structural or typing or internal, is an `InvalidQuery`
/// distinguished by its [Reason]. Clause-scoped checks attach the kind and
/// source coordinates of the enclosing clause via [WithErrorInfo].
#[derive(Debug, Clone)]
pub struct InvalidQuery {
    pub reason: Reason,
    /// Kind of the clause the error originated in, when known.
    pub clause: Option<ClauseKind>,
    /// Source coordinates of the originating clause, when known.
    pub location: Option<SourceLocation>,
    pub hints: Vec<String>,
}

/// The clause kinds a query is assembled from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum ClauseKind {
    From,
    Where,
    Select,
    OrderBy,
    Limit,
    Offset,
}

/// Coordinates of a clause in the source that built it, as captured by the
/// builder front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new<S: Into<String>>(file: S, line: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Reason {
    Simple(String),
    Expected {
        who: Option<String>,
        expected: String,
        found: String,
    },
    NotFound {
        name: String,
        namespace: String,
    },
    /// An AST shape that should have been rejected by validation reached the
    /// generator.
    Bug {
        details: String,
    },
}

impl InvalidQuery {
    pub fn new(reason: Reason) -> Self {
        InvalidQuery {
            reason,
            clause: None,
            location: None,
            hints: Vec::new(),
        }
    }

    pub fn new_simple<S: ToString>(reason: S) -> Self {
        InvalidQuery::new(Reason::Simple(reason.to_string()))
    }

    pub fn new_bug<S: ToString>(details: S) -> Self {
        InvalidQuery::new(Reason::Bug {
            details: details.to_string(),
        })
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Simple(text) => f.write_str(text),
            Reason::Expected {
                who,
                expected,
                found,
            } => {
                if let Some(who) = who {
                    write!(f, "{who} ")?;
                }
                write!(f, "expected {expected}, but found {found}")
            }
            Reason::NotFound { name, namespace } => write!(f, "{namespace} `{name}` not found"),
            Reason::Bug { details } => {
                write!(f, "internal query compiler error; {details}")
            }
        }
    }
}

impl Display for InvalidQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid query")?;
        if let Some(clause) = self.clause {
            write!(f, " in `{clause}`")?;
        }
        if let Some(location) = &self.location {
            write!(f, " at {}:{}", location.file, location.line)?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for InvalidQuery {}

/// Attach clause metadata to errors on their way out of a clause-scoped
/// check. Implemented for both the error and `Result`, so call sites can
/// thread it through with a single combinator.
pub trait WithErrorInfo: Sized {
    fn push_hint<S: Into<String>>(self, hint: S) -> Self;

    fn with_clause(self, clause: ClauseKind) -> Self;

    fn with_location(self, location: Option<SourceLocation>) -> Self;
}

impl WithErrorInfo for InvalidQuery {
    fn push_hint<S: Into<String>>(mut self, hint: S) -> Self {
        self.hints.push(hint.into());
        self
    }

    fn with_clause(mut self, clause: ClauseKind) -> Self {
        self.clause = Some(clause);
        self
    }

    fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

impl<T, E: WithErrorInfo> WithErrorInfo for Result<T, E> {
    fn push_hint<S: Into<String>>(self, hint: S) -> Self {
        self.map_err(|e| e.push_hint(hint))
    }

    fn with_clause(self, clause: ClauseKind) -> Self {
        self.map_err(|e| e.with_clause(clause))
    }

    fn with_location(self, location: Option<SourceLocation>) -> Self {
        self.map_err(|e| e.with_location(location))
    }
}
