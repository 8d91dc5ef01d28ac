//! Query expansion strategies.
//!
//! Every strategy implements [`Expander`]: given the analyzed query and the
//! first-pass ranking, produce an [`ExpandedQuery`] of weighted terms. The
//! configured strategy is selected once through [`QueryExpander`].
//!
//! A strategy that cannot expand (no usable feedback documents, nothing left
//! after truncation) reports `RicochetError::EmptyFeedback`. The caller then
//! keeps the unexpanded result.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::config::SolverConfig;
use crate::engine::collector::ScoreDoc;
use crate::engine::reader::IndexReader;
use crate::error::{Result, RicochetError};
use crate::feedback::stats::WordProbability;

pub mod relevance_model;
pub mod rocchio;

pub use relevance_model::{RelevanceModel, RelevanceModelVariant};
pub use rocchio::Rocchio;

/// Which expansion strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionKind {
    /// Single retrieval pass.
    #[default]
    None,
    /// Relevance model without query mixing.
    Rm1,
    /// Relevance model mixed with the original query.
    Rm3,
    /// TF-IDF vector-space reweighting.
    Rocchio,
}

impl fmt::Display for ExpansionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpansionKind::None => "none",
            ExpansionKind::Rm1 => "rm1",
            ExpansionKind::Rm3 => "rm3",
            ExpansionKind::Rocchio => "rocchio",
        };
        f.write_str(name)
    }
}

impl FromStr for ExpansionKind {
    type Err = RicochetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ExpansionKind::None),
            "rm1" => Ok(ExpansionKind::Rm1),
            "rm3" => Ok(ExpansionKind::Rm3),
            "rocchio" => Ok(ExpansionKind::Rocchio),
            other => Err(RicochetError::invalid_config(format!(
                "unknown expansion strategy '{other}' (expected none, rm1, rm3 or rocchio)"
            ))),
        }
    }
}

/// What an expansion strategy may consult besides the feedback documents.
#[derive(Clone)]
pub struct ExpansionContext<'a> {
    /// Reader over the main index.
    pub reader: &'a dyn IndexReader,
    /// Field the query runs against.
    pub field: &'a str,
    /// The analyzer the index was built with.
    pub analyzer: Arc<dyn Analyzer>,
}

impl fmt::Debug for ExpansionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionContext")
            .field("field", &self.field)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

/// Weighted expansion terms, highest weight first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandedQuery {
    terms: Vec<(String, f64)>,
}

impl ExpandedQuery {
    /// Wrap `(term, weight)` pairs, sorting them by descending weight. Ties
    /// keep their input order.
    pub fn new(mut terms: Vec<(String, f64)>) -> Self {
        terms.sort_by(|a, b| b.1.total_cmp(&a.1));
        ExpandedQuery { terms }
    }

    /// Build from relevance-model probabilities.
    pub fn from_probabilities(probabilities: Vec<WordProbability>) -> Self {
        Self::new(
            probabilities
                .into_iter()
                .map(|wp| (wp.term, wp.probability))
                .collect(),
        )
    }

    /// Keep at most `limit` terms.
    pub fn truncated(mut self, limit: usize) -> Self {
        self.terms.truncate(limit);
        self
    }

    pub fn terms(&self) -> &[(String, f64)] {
        &self.terms
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.terms.iter().map(|(term, weight)| (term.as_str(), *weight))
    }

    /// Weight of `term`, if present.
    pub fn weight(&self, term: &str) -> Option<f64> {
        self.terms
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, weight)| *weight)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for ExpandedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (term, weight)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{term}^{weight:.4}")?;
        }
        Ok(())
    }
}

/// An expansion strategy.
pub trait Expander: Send + Sync + fmt::Debug {
    /// Compute expansion terms for `query_tokens` (the analyzer output for the
    /// raw query, duplicates kept) from the first-pass ranking `feedback`.
    fn expand(
        &self,
        ctx: &ExpansionContext<'_>,
        query_tokens: &[String],
        feedback: &[ScoreDoc],
    ) -> Result<ExpandedQuery>;

    /// Get the name of this strategy.
    fn name(&self) -> &'static str;
}

/// The configured strategy.
#[derive(Debug, Clone)]
pub enum QueryExpander {
    None,
    RelevanceModel(RelevanceModel),
    Rocchio(Rocchio),
}

impl QueryExpander {
    /// Select and parameterise the strategy named by `config.strategy`.
    pub fn from_config(config: &SolverConfig) -> Self {
        match config.strategy {
            ExpansionKind::None => QueryExpander::None,
            ExpansionKind::Rm1 => QueryExpander::RelevanceModel(RelevanceModel::from_config(
                RelevanceModelVariant::Rm1,
                config,
            )),
            ExpansionKind::Rm3 => QueryExpander::RelevanceModel(RelevanceModel::from_config(
                RelevanceModelVariant::Rm3,
                config,
            )),
            ExpansionKind::Rocchio => QueryExpander::Rocchio(Rocchio::from_config(config)),
        }
    }

    pub fn kind(&self) -> ExpansionKind {
        match self {
            QueryExpander::None => ExpansionKind::None,
            QueryExpander::RelevanceModel(model) => match model.variant() {
                RelevanceModelVariant::Rm1 => ExpansionKind::Rm1,
                RelevanceModelVariant::Rm3 => ExpansionKind::Rm3,
            },
            QueryExpander::Rocchio(_) => ExpansionKind::Rocchio,
        }
    }

    /// Whether a second retrieval pass happens at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, QueryExpander::None)
    }
}

impl Expander for QueryExpander {
    fn expand(
        &self,
        ctx: &ExpansionContext<'_>,
        query_tokens: &[String],
        feedback: &[ScoreDoc],
    ) -> Result<ExpandedQuery> {
        match self {
            QueryExpander::None => Ok(ExpandedQuery::default()),
            QueryExpander::RelevanceModel(model) => model.expand(ctx, query_tokens, feedback),
            QueryExpander::Rocchio(rocchio) => rocchio.expand(ctx, query_tokens, feedback),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            QueryExpander::None => "none",
            QueryExpander::RelevanceModel(model) => model.name(),
            QueryExpander::Rocchio(rocchio) => rocchio.name(),
        }
    }
}
