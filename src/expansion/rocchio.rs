//! Rocchio expansion over a throwaway index of the feedback documents.
//!
//! The stored target-field text of the feedback documents is re-analyzed into
//! a [`MemoryIndex`] that lives for one call. Every term of that index gets
//!
//! ```text
//! w(t) = α · q(t) + β · ttf(t) · idf(t)
//! ```
//!
//! where `q(t)` is the TF-IDF weight of `t` in the query (zero for terms the
//! query lacks) and both statistics come from the feedback index.

use ahash::AHashMap;
use log::{debug, warn};

use crate::config::SolverConfig;
use crate::engine::collector::ScoreDoc;
use crate::engine::document::Document;
use crate::engine::memory::MemoryIndex;
use crate::engine::reader::IndexReader;
use crate::engine::similarity::classic_idf;
use crate::engine::writer::{FieldOptions, IndexWriter};
use crate::error::{Result, RicochetError};
use crate::expansion::{ExpandedQuery, Expander, ExpansionContext};
use crate::feedback::aggregator::FeedbackAggregator;

#[derive(Debug, Clone, PartialEq)]
pub struct Rocchio {
    alpha: f64,
    beta: f64,
    feedback_document_limit: usize,
    feedback_term_limit: usize,
}

impl Rocchio {
    pub fn new(
        alpha: f64,
        beta: f64,
        feedback_document_limit: usize,
        feedback_term_limit: usize,
    ) -> Self {
        Rocchio {
            alpha,
            beta,
            feedback_document_limit,
            feedback_term_limit,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(
            config.rocchio_alpha,
            config.rocchio_beta,
            config.feedback_document_limit,
            config.feedback_term_limit,
        )
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Index the stored target-field text of the top feedback documents.
    ///
    /// Documents that do not store the field are skipped.
    pub fn feedback_index(
        &self,
        ctx: &ExpansionContext<'_>,
        feedback: &[ScoreDoc],
    ) -> Result<MemoryIndex> {
        let mut writer = IndexWriter::new(ctx.analyzer.clone())
            .with_field(ctx.field, FieldOptions::text().with_stored(false));

        for hit in FeedbackAggregator::build_pool(feedback, self.feedback_document_limit) {
            let text = ctx
                .reader
                .document(hit.doc_id)?
                .and_then(|doc| doc.get_field(ctx.field).map(str::to_string));
            match text {
                Some(text) => {
                    writer.add_document(Document::builder().add_text(ctx.field, text).build())?;
                }
                None => warn!(
                    "Skipping feedback document {}: field '{}' is not stored",
                    hit.doc_id, ctx.field
                ),
            }
        }

        Ok(writer.finish())
    }

    /// Rocchio weights over a feedback index, highest first.
    ///
    /// Terms whose weight is not positive are dropped. Ties keep lexicographic
    /// order.
    pub fn weigh(
        &self,
        index: &MemoryIndex,
        field: &str,
        query_tokens: &[String],
    ) -> Result<ExpandedQuery> {
        let doc_count = index.doc_count();
        let tf_idf = |term: &str| -> Result<f64> {
            let stats = index.term_stats(field, term)?;
            Ok(stats.total_term_freq as f64 * classic_idf(stats.doc_freq, doc_count))
        };

        let mut query_weights: AHashMap<&str, f64> = AHashMap::new();
        for token in query_tokens {
            if query_weights.contains_key(token.as_str()) {
                continue;
            }
            if index.term_stats(field, token)?.doc_freq > 0 {
                query_weights.insert(token.as_str(), tf_idf(token.as_str())?);
            }
        }

        let mut weights = Vec::new();
        for term in index.terms(field)? {
            let query_weight = query_weights.get(term.as_str()).copied().unwrap_or(0.0);
            let weight = self.alpha * query_weight + self.beta * tf_idf(term.as_str())?;
            if weight > 0.0 {
                weights.push((term, weight));
            }
        }

        Ok(ExpandedQuery::new(weights))
    }
}

impl Expander for Rocchio {
    fn expand(
        &self,
        ctx: &ExpansionContext<'_>,
        query_tokens: &[String],
        feedback: &[ScoreDoc],
    ) -> Result<ExpandedQuery> {
        let index = self.feedback_index(ctx, feedback)?;
        if index.doc_count() == 0 {
            return Err(RicochetError::empty_feedback(format!(
                "no feedback document stores field '{}'",
                ctx.field
            )));
        }

        let expanded = self
            .weigh(&index, ctx.field, query_tokens)?
            .truncated(self.feedback_term_limit);
        if expanded.is_empty() {
            return Err(RicochetError::empty_feedback(
                "no term with a positive Rocchio weight",
            ));
        }
        debug!("rocchio: {expanded}");
        Ok(expanded)
    }

    fn name(&self) -> &'static str {
        "rocchio"
    }
}
