//! Turns query text or expansion terms into a [`BooleanQuery`].
//!
//! Every token becomes a `Should` clause on the target field, so a document
//! matches when it contains any of them. Duplicate tokens produce duplicate
//! clauses and therefore count twice.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::engine::query::{BooleanQuery, Occur, TermQuery};
use crate::error::Result;
use crate::expansion::ExpandedQuery;

/// Builds disjunctive term queries with a fixed analyzer.
///
/// A builder holds no per-call state and can be shared between threads.
#[derive(Clone)]
pub struct QueryBuilder {
    analyzer: Arc<dyn Analyzer>,
    max_tokens: Option<usize>,
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("analyzer", &self.analyzer.name())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl QueryBuilder {
    /// Create an unbounded builder.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        QueryBuilder {
            analyzer,
            max_tokens: None,
        }
    }

    /// Keep at most `max_tokens` analyzed tokens per query.
    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    pub fn max_tokens(&self) -> Option<usize> {
        self.max_tokens
    }

    /// Analyze `text`, applying the token bound.
    pub fn tokens(&self, text: &str) -> Result<Vec<String>> {
        let mut tokens = self.analyzer.tokenize(text)?;
        if let Some(limit) = self.max_tokens {
            tokens.truncate(limit);
        }
        Ok(tokens)
    }

    /// Analyze `text` into an OR query over `field`.
    pub fn build_query(&self, field: &str, text: &str) -> Result<BooleanQuery> {
        Ok(Self::from_tokens(field, &self.tokens(text)?))
    }

    /// OR query over already analyzed tokens.
    pub fn from_tokens<S: AsRef<str>>(field: &str, tokens: &[S]) -> BooleanQuery {
        let mut query = BooleanQuery::new();
        for token in tokens {
            query.add(TermQuery::new(field, token.as_ref()), Occur::Should);
        }
        query
    }

    /// OR query over expansion terms.
    ///
    /// With `weighted` each clause is boosted by its term weight and terms
    /// without a positive weight are left out. Otherwise every term gets the
    /// default boost.
    pub fn build_expanded(field: &str, expanded: &ExpandedQuery, weighted: bool) -> BooleanQuery {
        let mut query = BooleanQuery::new();
        for (term, weight) in expanded.iter() {
            if !weighted {
                query.add(TermQuery::new(field, term), Occur::Should);
            } else if weight > 0.0 {
                query.add(
                    TermQuery::new(field, term).with_boost(weight as f32),
                    Occur::Should,
                );
            }
        }
        query
    }
}
