//! User lookup queries.

use crate::exercise::{ObjectId, User};

/// One clause of a user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Exact username match.
    Username(String),
    /// Identifier match.
    Id(ObjectId),
}

impl Clause {
    /// Whether `user` satisfies this clause.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Clause::Username(name) => user.username == *name,
            Clause::Id(id) => user.id == *id,
        }
    }
}

/// Disjunction of clauses, evaluated in order. The first clause with a
/// matching user wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    clauses: Vec<Clause>,
}

impl UserFilter {
    /// Match a username only.
    pub fn username(name: impl Into<String>) -> Self {
        Self {
            clauses: vec![Clause::Username(name.into())],
        }
    }

    /// Match an identifier only.
    pub fn id(id: ObjectId) -> Self {
        Self {
            clauses: vec![Clause::Id(id)],
        }
    }

    /// Username match, or identifier match when `reference` is a well-formed
    /// identifier.
    pub fn username_or_id(reference: &str) -> Self {
        let mut clauses = vec![Clause::Username(reference.to_string())];
        if let Some(id) = ObjectId::parse_str(reference) {
            clauses.push(Clause::Id(id));
        }
        Self { clauses }
    }

    /// Clauses in evaluation order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether any clause matches `user`.
    pub fn matches(&self, user: &User) -> bool {
        self.clauses.iter().any(|c| c.matches(user))
    }
}
