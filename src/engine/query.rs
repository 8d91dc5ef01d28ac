//! Term and boolean queries.

use std::fmt;

/// A query that matches documents containing a specific term.
///
/// The term is matched verbatim; it must already be in analyzed form.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    field: String,
    term: String,
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Get the boost factor.
    pub fn boost(&self) -> f32 {
        self.boost
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl fmt::Display for TermQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.term)?;
        if self.boost != 1.0 {
            write!(f, "^{}", self.boost)?;
        }
        Ok(())
    }
}

/// How a clause participates in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause should match; at least one should clause must match when
    /// there are no must clauses.
    Should,
    /// The clause must not match.
    MustNot,
}

/// A term query together with its occurrence constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    pub query: TermQuery,
    pub occur: Occur,
}

impl BooleanClause {
    pub fn new(query: TermQuery, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }
}

/// A combination of term queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    /// Create an empty boolean query. It matches nothing.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
        }
    }

    /// Add a clause.
    pub fn add(&mut self, query: TermQuery, occur: Occur) {
        self.clauses.push(BooleanClause::new(query, occur));
    }

    /// Add a clause, builder style.
    pub fn with_clause(mut self, query: TermQuery, occur: Occur) -> Self {
        self.add(query, occur);
        self
    }

    /// Get the clauses in insertion order.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Terms of the should and must clauses, in clause order.
    pub fn terms(&self) -> Vec<&str> {
        self.clauses
            .iter()
            .filter(|c| c.occur != Occur::MustNot)
            .map(|c| c.query.term())
            .collect()
    }
}

impl fmt::Display for BooleanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match clause.occur {
                Occur::Must => write!(f, "+{}", clause.query)?,
                Occur::Should => write!(f, "{}", clause.query)?,
                Occur::MustNot => write!(f, "-{}", clause.query)?,
            }
        }
        Ok(())
    }
}
