//! Builds [`FeedbackStatistics`] from a first-pass ranking.

use log::{debug, warn};

use crate::engine::collector::ScoreDoc;
use crate::engine::reader::IndexReader;
use crate::engine::similarity::classic_idf;
use crate::error::{Result, RicochetError};
use crate::feedback::stats::{DocumentVector, FeedbackStatistics, PerTermStat};

/// Extracts document vectors for one field and pools them.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackAggregator<'a> {
    reader: &'a dyn IndexReader,
    field: &'a str,
}

impl<'a> FeedbackAggregator<'a> {
    pub fn new(reader: &'a dyn IndexReader, field: &'a str) -> Self {
        FeedbackAggregator { reader, field }
    }

    pub fn field(&self) -> &str {
        self.field
    }

    /// The first `limit` documents of a ranking, in rank order.
    pub fn build_pool(ranked: &[ScoreDoc], limit: usize) -> &[ScoreDoc] {
        &ranked[..ranked.len().min(limit)]
    }

    /// Term statistics of one document's target field.
    ///
    /// Each entry carries the global classic idf and the global collection
    /// probability of its term. A document without a term vector for the
    /// field yields `RicochetError::TermVectorUnavailable`.
    pub fn extract_vector(&self, doc_id: u64) -> Result<DocumentVector> {
        let vector = self
            .reader
            .term_vector(doc_id, self.field)?
            .ok_or_else(|| RicochetError::term_vector_unavailable(doc_id, self.field))?;

        let doc_count = self.reader.doc_count();
        let vocabulary_size = self.vocabulary_size()?;

        let mut stats = Vec::with_capacity(vector.len());
        for (term, freq) in vector.iter() {
            let global = self.reader.term_stats(self.field, term)?;
            let mut stat = PerTermStat::new(term, freq, 1);
            if global.doc_freq > 0 {
                stat = stat.with_idf(classic_idf(global.doc_freq, doc_count));
            }
            if vocabulary_size > 0 {
                stat = stat.with_collection_probability(
                    global.total_term_freq as f64 / vocabulary_size as f64,
                );
            }
            stats.push(stat);
        }

        Ok(DocumentVector::new(doc_id, stats))
    }

    /// Pool document vectors. Frequencies add per term; no input is mutated.
    pub fn aggregate(&self, vectors: Vec<DocumentVector>) -> Result<FeedbackStatistics> {
        Ok(FeedbackStatistics::new(vectors, self.vocabulary_size()?))
    }

    /// Total term occurrences of the target field across the whole index.
    pub fn vocabulary_size(&self) -> Result<u64> {
        self.reader.vocabulary_size(self.field)
    }

    /// Pool the first `limit` documents of `ranked`.
    ///
    /// Documents without a term vector are skipped with a warning. An empty
    /// result is not an error here; the expansion strategies decide what an
    /// empty pool means.
    pub fn collect(&self, ranked: &[ScoreDoc], limit: usize) -> Result<FeedbackStatistics> {
        let pool = Self::build_pool(ranked, limit);

        let mut vectors = Vec::with_capacity(pool.len());
        for hit in pool {
            match self.extract_vector(hit.doc_id) {
                Ok(vector) => vectors.push(vector.with_score(hit.score)),
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping feedback document: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Feedback pool: {} of {} documents with term vectors",
            vectors.len(),
            pool.len()
        );
        self.aggregate(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::SimpleAnalyzer;
    use crate::engine::document::Document;
    use crate::engine::memory::MemoryIndex;
    use crate::engine::writer::{FieldOptions, IndexWriter};
    use std::sync::Arc;

    fn index(term_vectors: bool) -> MemoryIndex {
        let mut writer = IndexWriter::new(Arc::new(SimpleAnalyzer::new().unwrap()))
            .with_field("id", FieldOptions::keyword())
            .with_field(
                "paragraph",
                FieldOptions::text().with_term_vectors(term_vectors),
            );
        for (id, text) in [
            ("d0", "alpha alpha alpha gamma gamma"),
            ("d1", "beta gamma gamma gamma gamma"),
            ("d2", "delta delta epsilon zeta eta theta"),
            ("d3", "theta iota kappa lambda mu"),
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

    fn ranked(ids: &[u64]) -> Vec<ScoreDoc> {
        ids.iter()
            .enumerate()
            .map(|(rank, &id)| ScoreDoc::new(id, 10.0 - rank as f32))
            .collect()
    }

    #[test]
    fn test_build_pool_keeps_rank_order() {
        let ranked = ranked(&[3, 1, 2]);
        let pool = FeedbackAggregator::build_pool(&ranked, 2);
        assert_eq!(pool.iter().map(|d| d.doc_id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(FeedbackAggregator::build_pool(&ranked, 10).len(), 3);
        assert!(FeedbackAggregator::build_pool(&ranked, 0).is_empty());
    }

    #[test]
    fn test_extract_vector_enrichment() {
        let index = index(true);
        let aggregator = FeedbackAggregator::new(&index, "paragraph");

        let vector = aggregator.extract_vector(0).unwrap();
        assert_eq!(vector.length(), 5);

        let gamma = vector.get("gamma").unwrap();
        assert_eq!(gamma.corpus_freq(), 2);
        assert_eq!(gamma.doc_freq(), 1);
        // gamma: 6 of 21 tokens, in 2 of 4 documents
        assert!((gamma.collection_probability().unwrap() - 6.0 / 21.0).abs() < 1e-12);
        assert!((gamma.idf().unwrap() - classic_idf(2, 4)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_term_vector_is_recoverable() {
        let index = index(false);
        let aggregator = FeedbackAggregator::new(&index, "paragraph");

        let err = aggregator.extract_vector(0).unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            RicochetError::TermVectorUnavailable { doc_id: 0, .. }
        ));
    }

    #[test]
    fn test_collect_pools_top_documents() {
        let index = index(true);
        let aggregator = FeedbackAggregator::new(&index, "paragraph");

        let stats = aggregator.collect(&ranked(&[1, 0, 2]), 2).unwrap();
        assert_eq!(stats.pool_size(), 2);
        assert_eq!(stats.vocabulary_size(), 21);
        assert_eq!(stats.documents()[0].doc_id(), 1);
        assert_eq!(stats.documents()[0].score(), Some(10.0));
        assert_eq!(stats.pooled("gamma").unwrap().corpus_freq(), 6);
        assert!(stats.pooled("delta").is_none());

        let terms: Vec<&str> = stats.pooled_terms().iter().map(|s| s.term()).collect();
        assert_eq!(terms, vec!["beta", "gamma", "alpha"]);
    }

    #[test]
    fn test_collect_without_term_vectors_is_empty() {
        let index = index(false);
        let aggregator = FeedbackAggregator::new(&index, "paragraph");

        let stats = aggregator.collect(&ranked(&[0, 1]), 5).unwrap();
        assert!(stats.is_empty());
        assert_eq!(stats.pool_size(), 0);
    }
}
