//! Top-k collection of scored documents.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A document id with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDoc {
    pub doc_id: u64,
    pub score: f32,
}

impl ScoreDoc {
    pub fn new(doc_id: u64, score: f32) -> Self {
        ScoreDoc { doc_id, score }
    }

    /// Ranking order: higher score first, lower doc id first on ties.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// The ranked outcome of a search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopDocs {
    /// Number of matching documents, including those below the cut.
    pub total_hits: u64,
    /// The best documents, most relevant first.
    pub score_docs: Vec<ScoreDoc>,
}

impl TopDocs {
    pub fn is_empty(&self) -> bool {
        self.score_docs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.score_docs.len()
    }
}

/// Heap entry ordered so that the worst hit is on top.
#[derive(Debug, Clone, Copy)]
struct WorstFirst(ScoreDoc);

impl PartialEq for WorstFirst {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WorstFirst {}

impl PartialOrd for WorstFirst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorstFirst {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// A collector that keeps the top N documents by score.
#[derive(Debug)]
pub struct TopDocsCollector {
    max_docs: usize,
    hits: BinaryHeap<WorstFirst>,
    total_hits: u64,
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
        }
    }

    /// Get the maximum number of documents to collect.
    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    /// Offer a matching document.
    pub fn collect(&mut self, doc_id: u64, score: f32) {
        self.total_hits += 1;
        if self.max_docs == 0 {
            return;
        }

        let candidate = WorstFirst(ScoreDoc::new(doc_id, score));
        if self.hits.len() < self.max_docs {
            self.hits.push(candidate);
        } else if let Some(worst) = self.hits.peek() {
            if candidate < *worst {
                self.hits.pop();
                self.hits.push(candidate);
            }
        }
    }

    /// Get the total number of hits offered.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Finish collection.
    pub fn top_docs(self) -> TopDocs {
        let mut score_docs: Vec<ScoreDoc> = self.hits.into_iter().map(|hit| hit.0).collect();
        score_docs.sort_by(ScoreDoc::rank_cmp);
        TopDocs {
            total_hits: self.total_hits,
            score_docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(top: &TopDocs) -> Vec<u64> {
        top.score_docs.iter().map(|d| d.doc_id).collect()
    }

    #[test]
    fn test_keeps_best() {
        let mut collector = TopDocsCollector::new(2);
        collector.collect(0, 1.0);
        collector.collect(1, 3.0);
        collector.collect(2, 2.0);
        collector.collect(3, 0.5);

        assert_eq!(collector.total_hits(), 4);
        let top = collector.top_docs();
        assert_eq!(ids(&top), vec![1, 2]);
        assert_eq!(top.total_hits, 4);
    }

    #[test]
    fn test_ties_prefer_lower_doc_id() {
        let mut collector = TopDocsCollector::new(2);
        collector.collect(5, 1.0);
        collector.collect(3, 1.0);
        collector.collect(9, 1.0);
        collector.collect(1, 1.0);

        assert_eq!(ids(&collector.top_docs()), vec![1, 3]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut collector = TopDocsCollector::new(0);
        collector.collect(0, 1.0);
        let top = collector.top_docs();
        assert!(top.is_empty());
        assert_eq!(top.total_hits, 1);
    }
}
