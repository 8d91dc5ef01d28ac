//! Index reader interface and the statistics it exposes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::document::Document;
use crate::error::Result;

/// Per-term corpus statistics for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermStats {
    /// Number of documents containing the term.
    pub doc_freq: u64,
    /// Total occurrences of the term across all documents.
    pub total_term_freq: u64,
}

/// Per-field corpus statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldStats {
    /// Number of documents that have this field.
    pub doc_count: u64,
    /// Total term occurrences in this field across the index.
    pub sum_total_term_freq: u64,
    /// Number of distinct terms in this field.
    pub unique_terms: u64,
}

impl FieldStats {
    /// Average field length in tokens.
    pub fn avg_field_length(&self) -> f64 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.sum_total_term_freq as f64 / self.doc_count as f64
        }
    }
}

/// One entry of a posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: u64,
    pub freq: u64,
}

/// Term frequencies of one field of one document, in lexicographic term order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermVector {
    terms: BTreeMap<String, u64>,
}

impl TermVector {
    /// Create an empty term vector.
    pub fn new() -> Self {
        TermVector {
            terms: BTreeMap::new(),
        }
    }

    /// Count one more occurrence of `term`.
    pub fn add(&mut self, term: &str) {
        *self.terms.entry(term.to_string()).or_insert(0) += 1;
    }

    /// Frequency of `term`, zero when absent.
    pub fn freq(&self, term: &str) -> u64 {
        self.terms.get(term).copied().unwrap_or(0)
    }

    /// Iterate over `(term, freq)` in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.terms.iter().map(|(term, freq)| (term.as_str(), *freq))
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of all frequencies, i.e. the field length.
    pub fn total_terms(&self) -> u64 {
        self.terms.values().sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for TermVector {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut terms = BTreeMap::new();
        for (term, freq) in iter {
            *terms.entry(term.into()).or_insert(0) += freq;
        }
        TermVector { terms }
    }
}

/// Read-only access to an index.
///
/// Lookups of unknown fields or terms are not errors: they return zero
/// statistics or empty results. Errors are reserved for I/O and corruption.
pub trait IndexReader: Send + Sync + std::fmt::Debug {
    /// Number of documents in the index.
    fn doc_count(&self) -> u64;

    /// Stored fields of a document.
    fn document(&self, doc_id: u64) -> Result<Option<Document>>;

    /// Term vector of a document field, `None` when the field was not indexed
    /// with term vectors or the document has no such field.
    fn term_vector(&self, doc_id: u64, field: &str) -> Result<Option<TermVector>>;

    /// Corpus statistics of a term in a field.
    fn term_stats(&self, field: &str, term: &str) -> Result<TermStats>;

    /// Corpus statistics of a field, `None` when no document has the field.
    fn field_stats(&self, field: &str) -> Result<Option<FieldStats>>;

    /// Posting list of a term, ordered by document id.
    fn postings(&self, field: &str, term: &str) -> Result<Vec<Posting>>;

    /// Number of tokens in a document field.
    fn field_length(&self, doc_id: u64, field: &str) -> Result<u64>;

    /// All terms of a field in lexicographic order.
    fn terms(&self, field: &str) -> Result<Vec<String>>;

    /// Total term occurrences in a field, zero for unknown fields.
    fn vocabulary_size(&self, field: &str) -> Result<u64> {
        Ok(self
            .field_stats(field)?
            .map(|stats| stats.sum_total_term_freq)
            .unwrap_or(0))
    }
}
