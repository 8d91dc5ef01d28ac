//! Relevance-model expansion (RM1 and RM3).
//!
//! RM1 estimates P(w|R) over the feedback pool:
//!
//! ```text
//! P(w|R) = Σ_D P(w|D) · P(Q|D)
//! ```
//!
//! with Jelinek-Mercer smoothed document models. RM3 interpolates the
//! truncated, normalized RM1 distribution with the query's own unigram
//! distribution.

use ahash::AHashMap;
use log::debug;

use crate::config::SolverConfig;
use crate::engine::collector::ScoreDoc;
use crate::error::{Result, RicochetError};
use crate::expansion::{ExpandedQuery, Expander, ExpansionContext};
use crate::feedback::aggregator::FeedbackAggregator;
use crate::feedback::stats::{FeedbackStatistics, WordProbability};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceModelVariant {
    Rm1,
    Rm3,
}

/// Sort by descending probability. Equal probabilities keep their current
/// relative order.
fn sort_descending(distribution: &mut [WordProbability]) {
    distribution.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}

/// Unique query tokens with their counts, in first-occurrence order.
fn query_counts(query_tokens: &[String]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    for token in query_tokens.iter().map(String::as_str) {
        match index.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }
    counts
}

/// The maximum-likelihood unigram distribution of the query.
pub fn query_distribution(query_tokens: &[String]) -> Vec<WordProbability> {
    let total = query_tokens.len() as f64;
    let mut distribution: Vec<WordProbability> = query_counts(query_tokens)
        .into_iter()
        .map(|(term, count)| WordProbability::new(term, count as f64 / total))
        .collect();
    sort_descending(&mut distribution);
    distribution
}

/// Σ_D P(w|D)·L(D) for every pooled term, sorted by descending weight,
/// where `likelihood` supplies L(D) for a document id.
fn relevance_weights<F>(
    stats: &FeedbackStatistics,
    mixing_lambda: f64,
    likelihood: F,
) -> Vec<WordProbability>
where
    F: Fn(u64) -> Option<f64>,
{
    let mut distribution: Vec<WordProbability> = stats
        .pooled_terms()
        .iter()
        .map(|pooled| {
            let probability = stats
                .documents()
                .iter()
                .map(|document| {
                    let l = likelihood(document.doc_id()).unwrap_or(0.0);
                    stats.smoothed_mle(pooled.term(), document, mixing_lambda) * l
                })
                .sum();
            WordProbability::new(pooled.term(), probability)
        })
        .collect();

    sort_descending(&mut distribution);
    distribution
}

/// RM1 over every pooled term, sorted by descending probability.
///
/// Ties keep first-discovery order. The values are not normalized.
pub fn rm1(
    stats: &mut FeedbackStatistics,
    query_tokens: &[String],
    mixing_lambda: f64,
) -> Vec<WordProbability> {
    stats.compute_query_likelihood(query_tokens, mixing_lambda);
    let stats = &*stats;
    relevance_weights(stats, mixing_lambda, |doc_id| stats.query_likelihood(doc_id))
}

/// RM3: the top `term_limit + 1` RM1 terms, normalized and weighted by
/// `query_mix`, plus `(1 - query_mix)` times the query unigram distribution.
///
/// The result sums to one. An empty pool yields the query unigram
/// distribution; so does a mixture whose weights are all zero.
pub fn rm3(
    stats: &mut FeedbackStatistics,
    query_tokens: &[String],
    mixing_lambda: f64,
    query_mix: f64,
    term_limit: usize,
) -> Vec<WordProbability> {
    if stats.is_empty() {
        return query_distribution(query_tokens);
    }

    // The distribution is normalized below, so P(Q|D) only matters up to a
    // common factor; relative likelihoods survive long queries.
    stats.compute_query_likelihood(query_tokens, mixing_lambda);
    let stats = &*stats;
    let mut distribution = relevance_weights(stats, mixing_lambda, |doc_id| {
        stats.relative_query_likelihood(doc_id)
    });
    distribution.truncate(term_limit.saturating_add(1));

    let feedback_mass: f64 = distribution.iter().map(|wp| wp.probability).sum();
    if feedback_mass > 0.0 {
        for wp in &mut distribution {
            wp.probability = wp.probability / feedback_mass * query_mix;
        }
    } else {
        debug!(
            "Relevance model over {} terms has zero mass, using query terms only",
            distribution.len()
        );
        distribution.clear();
    }

    let query_len = query_tokens.len() as f64;
    let mut positions: AHashMap<String, usize> = distribution
        .iter()
        .enumerate()
        .map(|(i, wp)| (wp.term.clone(), i))
        .collect();
    for (term, count) in query_counts(query_tokens) {
        let weight = (1.0 - query_mix) * count as f64 / query_len;
        match positions.get(term) {
            Some(&i) => distribution[i].probability += weight,
            None => {
                positions.insert(term.to_string(), distribution.len());
                distribution.push(WordProbability::new(term, weight));
            }
        }
    }

    let total: f64 = distribution.iter().map(|wp| wp.probability).sum();
    if total <= 0.0 {
        debug!("Interpolated distribution has zero mass, using query terms only");
        return query_distribution(query_tokens);
    }
    for wp in &mut distribution {
        wp.probability /= total;
    }

    sort_descending(&mut distribution);
    distribution
}

/// Relevance-model expander.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceModel {
    variant: RelevanceModelVariant,
    feedback_document_limit: usize,
    feedback_term_limit: usize,
    mixing_lambda: f64,
    query_mix: f64,
}

impl RelevanceModel {
    pub fn new(
        variant: RelevanceModelVariant,
        feedback_document_limit: usize,
        feedback_term_limit: usize,
        mixing_lambda: f64,
        query_mix: f64,
    ) -> Self {
        RelevanceModel {
            variant,
            feedback_document_limit,
            feedback_term_limit,
            mixing_lambda,
            query_mix,
        }
    }

    pub fn from_config(variant: RelevanceModelVariant, config: &SolverConfig) -> Self {
        Self::new(
            variant,
            config.feedback_document_limit,
            config.feedback_term_limit,
            config.mixing_lambda,
            config.query_mix,
        )
    }

    pub fn variant(&self) -> RelevanceModelVariant {
        self.variant
    }

    pub fn feedback_document_limit(&self) -> usize {
        self.feedback_document_limit
    }

    pub fn feedback_term_limit(&self) -> usize {
        self.feedback_term_limit
    }

    /// Distribution over the pool for this variant, before truncation.
    pub fn distribution(
        &self,
        stats: &mut FeedbackStatistics,
        query_tokens: &[String],
    ) -> Vec<WordProbability> {
        match self.variant {
            RelevanceModelVariant::Rm1 => rm1(stats, query_tokens, self.mixing_lambda),
            RelevanceModelVariant::Rm3 => rm3(
                stats,
                query_tokens,
                self.mixing_lambda,
                self.query_mix,
                self.feedback_term_limit,
            ),
        }
    }
}

impl Expander for RelevanceModel {
    fn expand(
        &self,
        ctx: &ExpansionContext<'_>,
        query_tokens: &[String],
        feedback: &[ScoreDoc],
    ) -> Result<ExpandedQuery> {
        let aggregator = FeedbackAggregator::new(ctx.reader, ctx.field);
        let mut stats = aggregator.collect(feedback, self.feedback_document_limit)?;
        if stats.is_empty() {
            return Err(RicochetError::empty_feedback(format!(
                "none of {} feedback documents has a term vector for '{}'",
                FeedbackAggregator::build_pool(feedback, self.feedback_document_limit).len(),
                ctx.field
            )));
        }

        let distribution: Vec<WordProbability> = self
            .distribution(&mut stats, query_tokens)
            .into_iter()
            .filter(|wp| wp.probability > 0.0)
            .collect();
        if distribution.is_empty() {
            return Err(RicochetError::normalization(format!(
                "{} assigns zero weight to every term of {} feedback documents",
                self.name(),
                stats.pool_size()
            )));
        }

        let expanded = ExpandedQuery::from_probabilities(distribution)
            .truncated(self.feedback_term_limit.saturating_add(1));
        debug!("{}: {}", self.name(), expanded);
        Ok(expanded)
    }

    fn name(&self) -> &'static str {
        match self.variant {
            RelevanceModelVariant::Rm1 => "rm1",
            RelevanceModelVariant::Rm3 => "rm3",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analysis::analyzer::{Analyzer, SimpleAnalyzer};
    use crate::engine::document::Document;
    use crate::engine::memory::MemoryIndex;
    use crate::engine::writer::{FieldOptions, IndexWriter};
    use crate::feedback::stats::DocumentVector;

    const EPSILON: f64 = 1e-9;

    fn tokens(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    /// D1 = {alpha:3, gamma:2}, D2 = {beta:1, gamma:4}, |V| = 20.
    fn scenario() -> FeedbackStatistics {
        FeedbackStatistics::new(
            vec![
                DocumentVector::from_freqs(1, vec![("alpha", 3), ("gamma", 2)]),
                DocumentVector::from_freqs(2, vec![("beta", 1), ("gamma", 4)]),
            ],
            20,
        )
    }

    fn probability(distribution: &[WordProbability], term: &str) -> f64 {
        distribution
            .iter()
            .find(|wp| wp.term == term)
            .map(|wp| wp.probability)
            .unwrap()
    }

    /// The same two documents plus ten filler tokens, so |V| is 20 again.
    fn scenario_index(term_vectors: bool) -> MemoryIndex {
        let mut writer = IndexWriter::new(Arc::new(SimpleAnalyzer::new().unwrap()))
            .with_field("id", FieldOptions::keyword())
            .with_field(
                "paragraph",
                FieldOptions::text().with_term_vectors(term_vectors),
            );
        for (id, text) in [
            ("d1", "alpha alpha alpha gamma gamma"),
            ("d2", "beta gamma gamma gamma gamma"),
            ("d3", "one two three four five six seven eight nine ten"),
        ] {
            writer
                .add_document(
                    Document::builder()
                        .add_text("id", id)
                        .add_text("paragraph", text)
                        .build(),
                )
                .unwrap();
        }
        writer.finish()
    }

    fn context(index: &MemoryIndex) -> ExpansionContext<'_> {
        let analyzer: Arc<dyn Analyzer> = Arc::new(SimpleAnalyzer::new().unwrap());
        ExpansionContext {
            reader: index,
            field: "paragraph",
            analyzer,
        }
    }

    fn feedback() -> Vec<ScoreDoc> {
        vec![ScoreDoc::new(0, 2.0), ScoreDoc::new(1, 1.0)]
    }

    #[test]
    fn test_rm1_scenario() {
        let mut stats = scenario();
        let distribution = rm1(&mut stats, &tokens(&["alpha", "beta"]), 0.5);

        assert!((probability(&distribution, "alpha") - 0.00421875).abs() < EPSILON);
        assert!((probability(&distribution, "beta") - 0.00140625).abs() < EPSILON);
        assert!((probability(&distribution, "gamma") - 0.0084375).abs() < EPSILON);

        let order: Vec<&str> = distribution.iter().map(|wp| wp.term.as_str()).collect();
        assert_eq!(order, vec!["gamma", "alpha", "beta"]);
    }

    #[test]
    fn test_rm3_scenario() {
        let mut stats = scenario();
        let distribution = rm3(&mut stats, &tokens(&["alpha", "beta"]), 0.5, 0.5, 2);

        assert!((probability(&distribution, "alpha") - 0.4).abs() < EPSILON);
        assert!((probability(&distribution, "beta") - 0.3).abs() < EPSILON);
        assert!((probability(&distribution, "gamma") - 0.3).abs() < EPSILON);
        assert_eq!(distribution[0].term, "alpha");

        let total: f64 = distribution.iter().map(|wp| wp.probability).sum();
        assert!((total - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_rm3_truncates_feedback_terms() {
        let mut stats = scenario();
        // Keeps gamma and alpha from RM1; beta only comes from the query.
        let distribution = rm3(&mut stats, &tokens(&["alpha", "beta"]), 0.5, 0.5, 1);
        assert_eq!(distribution.len(), 3);

        // gamma: 0.0084375/0.01265625 = 2/3, alpha 1/3, each halved.
        assert!((probability(&distribution, "gamma") - 1.0 / 3.0).abs() < EPSILON);
        assert!((probability(&distribution, "alpha") - (1.0 / 6.0 + 0.25)).abs() < EPSILON);
        assert!((probability(&distribution, "beta") - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_rm3_empty_pool_is_query_distribution() {
        let mut stats = FeedbackStatistics::new(Vec::new(), 20);
        let distribution = rm3(&mut stats, &tokens(&["alpha", "beta", "alpha"]), 0.5, 0.7, 10);

        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution[0].term, "alpha");
        assert!((distribution[0].probability - 2.0 / 3.0).abs() < EPSILON);
        assert!((distribution[1].probability - 1.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_rm3_full_query_mix_keeps_feedback_only() {
        let mut stats = scenario();
        let distribution = rm3(&mut stats, &tokens(&["alpha", "beta"]), 0.5, 1.0, 2);

        assert!((probability(&distribution, "gamma") - 0.6).abs() < EPSILON);
        assert!((probability(&distribution, "alpha") - 0.3).abs() < EPSILON);
        assert!((probability(&distribution, "beta") - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_rm3_zero_query_mix_is_query_distribution() {
        let mut stats = scenario();
        let distribution = rm3(&mut stats, &tokens(&["alpha", "beta"]), 0.5, 0.0, 2);

        assert!((probability(&distribution, "alpha") - 0.5).abs() < EPSILON);
        assert!((probability(&distribution, "beta") - 0.5).abs() < EPSILON);
        assert!(probability(&distribution, "gamma").abs() < EPSILON);
    }

    #[test]
    fn test_rm3_zero_feedback_mass_is_query_distribution() {
        // Without collection smoothing neither document holds both terms, so
        // every P(Q|D) and every RM1 weight is zero.
        let query = tokens(&["alpha", "beta", "alpha"]);
        let mut stats = scenario();
        let zero: Vec<f64> = rm1(&mut stats, &query, 1.0)
            .iter()
            .map(|wp| wp.probability)
            .collect();
        assert!(zero.iter().all(|p| *p == 0.0));

        let mut stats = scenario();
        let distribution = rm3(&mut stats, &query, 1.0, 0.7, 10);
        let expected = query_distribution(&query);
        assert_eq!(distribution.len(), expected.len());
        for (actual, expected) in distribution.iter().zip(&expected) {
            assert_eq!(actual.term, expected.term);
            assert!((actual.probability - expected.probability).abs() < EPSILON);
        }
    }

    #[test]
    fn test_rm3_zero_interpolated_mass_is_query_distribution() {
        // Zero feedback mass and no weight left for the query terms either.
        let query = tokens(&["beta", "alpha"]);
        let mut stats = scenario();
        let distribution = rm3(&mut stats, &query, 1.0, 1.0, 10);

        assert_eq!(distribution, query_distribution(&query));
        assert!((probability(&distribution, "alpha") - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_rm3_long_query_keeps_feedback_terms() {
        let query: Vec<String> = (0..150).map(|i| format!("q{i}")).collect();
        let mut freqs: Vec<(String, u64)> = query.iter().map(|t| (t.clone(), 1)).collect();
        freqs.push(("expansion".to_string(), 50));
        let mut stats = FeedbackStatistics::new(
            vec![
                DocumentVector::from_freqs(1, freqs),
                DocumentVector::from_freqs(2, vec![("other", 3)]),
            ],
            1_000_000,
        );

        let distribution = rm3(&mut stats, &query, 0.7, 0.5, 10);
        assert_eq!(distribution[0].term, "expansion");
        assert!(probability(&distribution, "expansion") > 0.4);

        let total: f64 = distribution.iter().map(|wp| wp.probability).sum();
        assert!((total - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_rm1_is_monotone_in_term_frequency() {
        let mut stats = FeedbackStatistics::new(
            vec![DocumentVector::from_freqs(
                1,
                vec![("query", 1), ("rare", 1), ("common", 5)],
            )],
            100,
        );
        let distribution = rm1(&mut stats, &tokens(&["query"]), 0.5);

        assert!(probability(&distribution, "common") > probability(&distribution, "rare"));
        assert_eq!(distribution[0].term, "common");
    }

    #[test]
    fn test_identical_documents_keep_ranking() {
        let single = || DocumentVector::from_freqs(1, vec![("alpha", 3), ("gamma", 2)]);
        let mut one = FeedbackStatistics::new(vec![single()], 20);
        let mut three = FeedbackStatistics::new(
            vec![
                single(),
                DocumentVector::from_freqs(2, vec![("alpha", 3), ("gamma", 2)]),
                DocumentVector::from_freqs(3, vec![("alpha", 3), ("gamma", 2)]),
            ],
            20,
        );

        let query = tokens(&["alpha"]);
        let a: Vec<String> = rm1(&mut one, &query, 0.5).into_iter().map(|wp| wp.term).collect();
        let distribution = rm1(&mut three, &query, 0.5);
        let b: Vec<String> = distribution.iter().map(|wp| wp.term.clone()).collect();
        assert_eq!(a, b);

        // Each of the n documents contributes the same amount.
        let first = &three.documents()[0];
        let likelihood = three.query_likelihood(first.doc_id()).unwrap();
        for wp in &distribution {
            let single = three.smoothed_mle(&wp.term, first, 0.5) * likelihood;
            assert!((wp.probability - 3.0 * single).abs() < EPSILON);
        }
    }

    #[test]
    fn test_expand_rm3_from_index() {
        let index = scenario_index(true);
        let model = RelevanceModel::new(RelevanceModelVariant::Rm3, 5, 2, 0.5, 0.5);

        let expanded = model
            .expand(&context(&index), &tokens(&["alpha", "beta"]), &feedback())
            .unwrap();

        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded.terms()[0].0, "alpha");
        assert!((expanded.weight("alpha").unwrap() - 0.4).abs() < EPSILON);
        assert!((expanded.weight("gamma").unwrap() - 0.3).abs() < EPSILON);
    }

    #[test]
    fn test_expand_rm1_respects_term_limit() {
        let index = scenario_index(true);
        let model = RelevanceModel::new(RelevanceModelVariant::Rm1, 5, 1, 0.5, 0.5);

        let expanded = model
            .expand(&context(&index), &tokens(&["alpha", "beta"]), &feedback())
            .unwrap();

        // Term limit plus one.
        assert_eq!(expanded.len(), 2);
        let terms: Vec<&str> = expanded.iter().map(|(t, _)| t).collect();
        assert_eq!(terms, vec!["gamma", "alpha"]);
    }

    #[test]
    fn test_expand_rm1_with_zero_weights_is_normalization_error() {
        let index = scenario_index(true);
        let model = RelevanceModel::new(RelevanceModelVariant::Rm1, 5, 10, 1.0, 0.5);

        let err = model
            .expand(&context(&index), &tokens(&["alpha", "beta"]), &feedback())
            .unwrap_err();
        assert!(matches!(err, RicochetError::Normalization(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_expand_without_term_vectors_is_empty_feedback() {
        let index = scenario_index(false);
        let model = RelevanceModel::new(RelevanceModelVariant::Rm3, 5, 10, 0.5, 0.5);

        let err = model
            .expand(&context(&index), &tokens(&["alpha"]), &feedback())
            .unwrap_err();
        assert!(matches!(err, RicochetError::EmptyFeedback(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_expand_with_no_feedback_documents() {
        let index = scenario_index(true);
        let model = RelevanceModel::new(RelevanceModelVariant::Rm1, 5, 10, 0.5, 0.5);

        let err = model
            .expand(&context(&index), &tokens(&["alpha"]), &[])
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
