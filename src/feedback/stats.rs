//! Term statistics of a feedback pool.

use std::collections::BTreeMap;

use ahash::AHashMap;

/// Frequency statistics of one term, either within one document or pooled
/// over the feedback documents.
///
/// Invariant: `doc_freq <= corpus_freq`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerTermStat {
    term: String,
    corpus_freq: u64,
    doc_freq: u64,
    idf: Option<f64>,
    collection_probability: Option<f64>,
}

impl PerTermStat {
    pub fn new<S: Into<String>>(term: S, corpus_freq: u64, doc_freq: u64) -> Self {
        PerTermStat {
            term: term.into(),
            corpus_freq,
            doc_freq,
            idf: None,
            collection_probability: None,
        }
    }

    /// Attach the global inverse document frequency.
    pub fn with_idf(mut self, idf: f64) -> Self {
        self.idf = Some(idf);
        self
    }

    /// Attach the global collection probability (global cf / vocabulary size).
    pub fn with_collection_probability(mut self, probability: f64) -> Self {
        self.collection_probability = Some(probability);
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn corpus_freq(&self) -> u64 {
        self.corpus_freq
    }

    pub fn doc_freq(&self) -> u64 {
        self.doc_freq
    }

    pub fn idf(&self) -> Option<f64> {
        self.idf
    }

    pub fn collection_probability(&self) -> Option<f64> {
        self.collection_probability
    }

    /// Combine two statistics of the same term into a fresh value.
    ///
    /// Frequencies add; the optional global values are taken from whichever
    /// side has them, `self` first. The result does not depend on the order
    /// of the operands except for those optional values, which are global
    /// and therefore equal on both sides.
    pub fn merge(&self, other: &PerTermStat) -> PerTermStat {
        debug_assert_eq!(self.term, other.term);
        PerTermStat {
            term: self.term.clone(),
            corpus_freq: self.corpus_freq + other.corpus_freq,
            doc_freq: self.doc_freq + other.doc_freq,
            idf: self.idf.or(other.idf),
            collection_probability: self.collection_probability.or(other.collection_probability),
        }
    }
}

/// The term statistics of one feedback document's target field.
///
/// Each entry has `corpus_freq` = tf in the document and `doc_freq` = 1.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentVector {
    doc_id: u64,
    terms: BTreeMap<String, PerTermStat>,
    length: u64,
    score: Option<f32>,
}

impl DocumentVector {
    /// Build a vector from per-term statistics; the length is the sum of the
    /// term frequencies.
    pub fn new<I>(doc_id: u64, stats: I) -> Self
    where
        I: IntoIterator<Item = PerTermStat>,
    {
        let terms: BTreeMap<String, PerTermStat> = stats
            .into_iter()
            .map(|stat| (stat.term.clone(), stat))
            .collect();
        let length = terms.values().map(|stat| stat.corpus_freq).sum();
        DocumentVector {
            doc_id,
            terms,
            length,
            score: None,
        }
    }

    /// Build a vector from raw `(term, tf)` pairs.
    pub fn from_freqs<I, S>(doc_id: u64, freqs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self::new(
            doc_id,
            freqs
                .into_iter()
                .filter(|(_, tf)| *tf > 0)
                .map(|(term, tf)| PerTermStat::new(term, tf, 1)),
        )
    }

    /// Attach the retrieval score of the first pass.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn doc_id(&self) -> u64 {
        self.doc_id
    }

    /// Document length |D| in tokens.
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn score(&self) -> Option<f32> {
        self.score
    }

    /// Frequency of `term` in this document.
    pub fn freq(&self, term: &str) -> u64 {
        self.terms.get(term).map(|stat| stat.corpus_freq).unwrap_or(0)
    }

    pub fn get(&self, term: &str) -> Option<&PerTermStat> {
        self.terms.get(term)
    }

    /// Iterate over term statistics in lexicographic term order.
    pub fn iter(&self) -> impl Iterator<Item = &PerTermStat> {
        self.terms.values()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A term with its relevance-model probability P(w|R).
#[derive(Debug, Clone, PartialEq)]
pub struct WordProbability {
    pub term: String,
    pub probability: f64,
}

impl WordProbability {
    pub fn new<S: Into<String>>(term: S, probability: f64) -> Self {
        WordProbability {
            term: term.into(),
            probability,
        }
    }
}

/// Statistics of one feedback pool, built for a single query.
///
/// Documents are kept in rank order and pooled terms in first-discovery order
/// (rank order of documents, then lexicographic order within a document).
/// Both orders are relied upon for deterministic tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct FeedbackStatistics {
    documents: Vec<DocumentVector>,
    pooled: Vec<PerTermStat>,
    pooled_index: AHashMap<String, usize>,
    vocabulary_size: u64,
    log_query_likelihood: AHashMap<u64, f64>,
    max_log_query_likelihood: f64,
}

impl FeedbackStatistics {
    /// Pool `documents` (in rank order) against a global vocabulary size.
    pub fn new(documents: Vec<DocumentVector>, vocabulary_size: u64) -> Self {
        let mut pooled: Vec<PerTermStat> = Vec::new();
        let mut pooled_index: AHashMap<String, usize> = AHashMap::new();

        for document in &documents {
            for stat in document.iter() {
                match pooled_index.get(stat.term()) {
                    Some(&idx) => pooled[idx] = pooled[idx].merge(stat),
                    None => {
                        pooled_index.insert(stat.term().to_string(), pooled.len());
                        pooled.push(stat.clone());
                    }
                }
            }
        }

        FeedbackStatistics {
            documents,
            pooled,
            pooled_index,
            vocabulary_size,
            log_query_likelihood: AHashMap::new(),
            max_log_query_likelihood: f64::NEG_INFINITY,
        }
    }

    /// Feedback documents in rank order.
    pub fn documents(&self) -> &[DocumentVector] {
        &self.documents
    }

    /// Pooled term statistics in first-discovery order.
    pub fn pooled_terms(&self) -> &[PerTermStat] {
        &self.pooled
    }

    /// Pooled statistics of one term.
    pub fn pooled(&self, term: &str) -> Option<&PerTermStat> {
        self.pooled_index.get(term).map(|&idx| &self.pooled[idx])
    }

    /// Global vocabulary size |V| of the target field.
    pub fn vocabulary_size(&self) -> u64 {
        self.vocabulary_size
    }

    /// Number of feedback documents with statistics.
    pub fn pool_size(&self) -> usize {
        self.documents.len()
    }

    /// True when no document contributed any term.
    pub fn is_empty(&self) -> bool {
        self.pooled.is_empty()
    }

    /// Smoothed estimate of P(t|D):
    /// `λ·tf(t,D)/|D| + (1-λ)·cf(t,pool)/|V|`.
    ///
    /// A zero document length or vocabulary size drops the corresponding
    /// component instead of dividing by zero.
    pub fn smoothed_mle(&self, term: &str, document: &DocumentVector, lambda: f64) -> f64 {
        let local = if document.length() > 0 {
            lambda * document.freq(term) as f64 / document.length() as f64
        } else {
            0.0
        };
        let collection = match self.pooled(term) {
            Some(stat) if self.vocabulary_size > 0 => {
                (1.0 - lambda) * stat.corpus_freq() as f64 / self.vocabulary_size as f64
            }
            _ => 0.0,
        };
        local + collection
    }

    /// Compute and record P(Q|D) for every feedback document.
    ///
    /// P(Q|D) is the product of the smoothed estimates of the query tokens,
    /// duplicates included. Tokens that never occur in the pool contribute a
    /// neutral factor of one. The product is accumulated as a sum of logs; a
    /// zero factor gives negative infinity.
    pub fn compute_query_likelihood(&mut self, query_tokens: &[String], lambda: f64) {
        let likelihoods: Vec<(u64, f64)> = self
            .documents
            .iter()
            .map(|document| {
                let log_likelihood = query_tokens
                    .iter()
                    .filter(|token| self.pooled_index.contains_key(token.as_str()))
                    .map(|token| self.smoothed_mle(token, document, lambda).ln())
                    .sum();
                (document.doc_id(), log_likelihood)
            })
            .collect();
        self.max_log_query_likelihood = likelihoods
            .iter()
            .map(|&(_, log_likelihood)| log_likelihood)
            .fold(f64::NEG_INFINITY, f64::max);
        self.log_query_likelihood = likelihoods.into_iter().collect();
    }

    /// P(Q|D) of one document, once computed. Long queries may underflow to
    /// zero here; see [`relative_query_likelihood`](Self::relative_query_likelihood).
    pub fn query_likelihood(&self, doc_id: u64) -> Option<f64> {
        self.log_query_likelihood(doc_id).map(f64::exp)
    }

    /// ln P(Q|D) of one document, once computed.
    pub fn log_query_likelihood(&self, doc_id: u64) -> Option<f64> {
        self.log_query_likelihood.get(&doc_id).copied()
    }

    /// P(Q|D) divided by the largest P(Q|D) in the pool, so the best document
    /// scores one. Zero when every document has zero likelihood.
    pub fn relative_query_likelihood(&self, doc_id: u64) -> Option<f64> {
        let log_likelihood = self.log_query_likelihood(doc_id)?;
        if self.max_log_query_likelihood == f64::NEG_INFINITY {
            return Some(0.0);
        }
        Some((log_likelihood - self.max_log_query_likelihood).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(tokens: &[&str]) -> Vec<String> {
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

    #[test]
    fn test_merge_is_fresh_and_additive() {
        let a = PerTermStat::new("gamma", 2, 1).with_idf(1.5);
        let b = PerTermStat::new("gamma", 4, 1);

        let ab = a.merge(&b);
        let ba = b.merge(&a);

        assert_eq!(ab.corpus_freq(), 6);
        assert_eq!(ab.doc_freq(), 2);
        assert_eq!(ab, ba);
        // Inputs are untouched.
        assert_eq!(a.corpus_freq(), 2);
        assert_eq!(b.doc_freq(), 1);
    }

    #[test]
    fn test_document_vector() {
        let vector = DocumentVector::from_freqs(7, vec![("gamma", 2), ("alpha", 3), ("zero", 0)])
            .with_score(1.25);

        assert_eq!(vector.doc_id(), 7);
        assert_eq!(vector.length(), 5);
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.freq("alpha"), 3);
        assert_eq!(vector.freq("beta"), 0);
        assert_eq!(vector.score(), Some(1.25));
        let terms: Vec<&str> = vector.iter().map(|s| s.term()).collect();
        assert_eq!(terms, vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_pooling_order_and_counts() {
        let stats = scenario();

        let terms: Vec<&str> = stats.pooled_terms().iter().map(|s| s.term()).collect();
        assert_eq!(terms, vec!["alpha", "gamma", "beta"]);

        let gamma = stats.pooled("gamma").unwrap();
        assert_eq!(gamma.corpus_freq(), 6);
        assert_eq!(gamma.doc_freq(), 2);
        assert_eq!(stats.pooled("alpha").unwrap().corpus_freq(), 3);
        assert_eq!(stats.pooled("beta").unwrap().corpus_freq(), 1);
        assert_eq!(stats.pool_size(), 2);
        assert_eq!(stats.vocabulary_size(), 20);

        for stat in stats.pooled_terms() {
            assert!(stat.doc_freq() <= stats.pool_size() as u64);
            assert!(stat.corpus_freq() >= stat.doc_freq());
        }
    }

    #[test]
    fn test_pooling_is_order_independent() {
        let forward = scenario();
        let backward = FeedbackStatistics::new(
            vec![
                DocumentVector::from_freqs(2, vec![("beta", 1), ("gamma", 4)]),
                DocumentVector::from_freqs(1, vec![("alpha", 3), ("gamma", 2)]),
            ],
            20,
        );

        for stat in forward.pooled_terms() {
            let other = backward.pooled(stat.term()).unwrap();
            assert_eq!(stat.corpus_freq(), other.corpus_freq());
            assert_eq!(stat.doc_freq(), other.doc_freq());
        }
    }

    #[test]
    fn test_smoothed_mle() {
        let stats = scenario();
        let d1 = &stats.documents()[0];

        // 0.5 * 3/5 + 0.5 * 3/20
        assert!((stats.smoothed_mle("alpha", d1, 0.5) - 0.375).abs() < 1e-12);
        // 0 + 0.5 * 1/20
        assert!((stats.smoothed_mle("beta", d1, 0.5) - 0.025).abs() < 1e-12);
        assert_eq!(stats.smoothed_mle("delta", d1, 0.5), 0.0);
    }

    #[test]
    fn test_query_likelihood() {
        let mut stats = scenario();
        stats.compute_query_likelihood(&query(&["alpha", "beta"]), 0.5);

        // 0.375 * 0.025 and 0.075 * 0.125
        assert!((stats.query_likelihood(1).unwrap() - 0.009375).abs() < 1e-12);
        assert!((stats.query_likelihood(2).unwrap() - 0.009375).abs() < 1e-12);
        assert!(stats.query_likelihood(3).is_none());
    }

    #[test]
    fn test_query_likelihood_ignores_unseen_terms() {
        let mut with_unseen = scenario();
        with_unseen.compute_query_likelihood(&query(&["alpha", "delta"]), 0.5);
        let mut plain = scenario();
        plain.compute_query_likelihood(&query(&["alpha"]), 0.5);

        assert_eq!(with_unseen.query_likelihood(1), plain.query_likelihood(1));
        assert!(with_unseen.query_likelihood(1).unwrap() > 0.0);
    }

    #[test]
    fn test_long_query_likelihood_does_not_underflow() {
        // 150 query tokens, each once in a 200-token document.
        let tokens: Vec<String> = (0..150).map(|i| format!("q{i}")).collect();
        let mut freqs: Vec<(String, u64)> = tokens.iter().map(|t| (t.clone(), 1)).collect();
        freqs.push(("expansion".to_string(), 50));
        let mut stats = FeedbackStatistics::new(
            vec![
                DocumentVector::from_freqs(1, freqs),
                DocumentVector::from_freqs(2, vec![("other", 3)]),
            ],
            1_000_000,
        );
        stats.compute_query_likelihood(&tokens, 0.7);

        let log_d1 = stats.log_query_likelihood(1).unwrap();
        let log_d2 = stats.log_query_likelihood(2).unwrap();
        assert!(log_d1.is_finite());
        assert!(log_d1 < -800.0);
        assert!(log_d2 < log_d1);

        // The plain product is gone, the relative one is not.
        assert_eq!(stats.query_likelihood(1), Some(0.0));
        assert_eq!(stats.relative_query_likelihood(1), Some(1.0));
        assert_eq!(stats.relative_query_likelihood(2), Some(0.0));
    }

    #[test]
    fn test_relative_query_likelihood() {
        let mut stats = scenario();
        stats.compute_query_likelihood(&query(&["alpha", "gamma"]), 0.5);

        // D1: 0.375 * 0.35, D2: 0.075 * 0.55
        assert_eq!(stats.relative_query_likelihood(1), Some(1.0));
        let expected = (0.075 * 0.55) / (0.375 * 0.35);
        assert!((stats.relative_query_likelihood(2).unwrap() - expected).abs() < 1e-12);

        // Without collection smoothing neither document holds both terms.
        stats.compute_query_likelihood(&query(&["alpha", "beta"]), 1.0);
        assert_eq!(stats.query_likelihood(1), Some(0.0));
        assert_eq!(stats.relative_query_likelihood(1), Some(0.0));
        assert_eq!(stats.relative_query_likelihood(2), Some(0.0));
    }

    #[test]
    fn test_empty_pool() {
        let mut stats = FeedbackStatistics::new(Vec::new(), 20);
        stats.compute_query_likelihood(&query(&["alpha"]), 0.5);

        assert!(stats.is_empty());
        assert_eq!(stats.pool_size(), 0);
        assert!(stats.pooled("alpha").is_none());
    }
}
