//! Term-at-a-time boolean search.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::engine::collector::{TopDocs, TopDocsCollector};
use crate::engine::document::Document;
use crate::engine::query::{BooleanQuery, Occur};
use crate::engine::reader::IndexReader;
use crate::engine::similarity::Similarity;
use crate::error::Result;

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    score: f32,
    must_matches: usize,
    should_matches: usize,
}

/// Runs queries against a reader with a fixed similarity.
#[derive(Debug, Clone)]
pub struct IndexSearcher {
    reader: Arc<dyn IndexReader>,
    similarity: Arc<dyn Similarity>,
}

impl IndexSearcher {
    pub fn new(reader: Arc<dyn IndexReader>, similarity: Arc<dyn Similarity>) -> Self {
        IndexSearcher { reader, similarity }
    }

    pub fn reader(&self) -> &Arc<dyn IndexReader> {
        &self.reader
    }

    pub fn similarity(&self) -> &Arc<dyn Similarity> {
        &self.similarity
    }

    /// Stored fields of a document.
    pub fn doc(&self, doc_id: u64) -> Result<Option<Document>> {
        self.reader.document(doc_id)
    }

    /// Return the `k` best documents for `query`.
    ///
    /// A document matches when it matches every must clause, no must-not
    /// clause, and (absent must clauses) at least one should clause. Its
    /// score is the sum of the boosted scores of its matching clauses.
    pub fn search(&self, query: &BooleanQuery, k: usize) -> Result<TopDocs> {
        let doc_count = self.reader.doc_count();
        let mut accumulators: AHashMap<u64, Accumulator> = AHashMap::new();
        let mut excluded: AHashSet<u64> = AHashSet::new();
        let mut avg_lengths: AHashMap<&str, f32> = AHashMap::new();
        let mut must_clauses = 0;

        for clause in query.clauses() {
            let field = clause.query.field();
            let term = clause.query.term();
            let postings = self.reader.postings(field, term)?;

            if clause.occur == Occur::MustNot {
                excluded.extend(postings.iter().map(|p| p.doc_id));
                continue;
            }
            if clause.occur == Occur::Must {
                must_clauses += 1;
            }
            if postings.is_empty() {
                continue;
            }

            let avg_length = match avg_lengths.get(field) {
                Some(avg) => *avg,
                None => {
                    let avg = self
                        .reader
                        .field_stats(field)?
                        .map(|stats| stats.avg_field_length() as f32)
                        .unwrap_or(0.0);
                    avg_lengths.insert(field, avg);
                    avg
                }
            };
            let idf = self.similarity.idf(postings.len() as u64, doc_count);
            let boost = clause.query.boost();

            for posting in &postings {
                let length = self.reader.field_length(posting.doc_id, field)?;
                let score = self.similarity.score(posting.freq, length, avg_length, idf);

                let acc = accumulators.entry(posting.doc_id).or_default();
                acc.score += boost * score;
                match clause.occur {
                    Occur::Must => acc.must_matches += 1,
                    _ => acc.should_matches += 1,
                }
            }
        }

        let mut collector = TopDocsCollector::new(k);
        for (doc_id, acc) in accumulators {
            if excluded.contains(&doc_id) {
                continue;
            }
            let matches = if must_clauses > 0 {
                acc.must_matches == must_clauses
            } else {
                acc.should_matches > 0
            };
            if matches {
                collector.collect(doc_id, acc.score);
            }
        }

        Ok(collector.top_docs())
    }
}
