//! In-memory inverted index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::document::Document;
use crate::engine::reader::{FieldStats, IndexReader, Posting, TermStats, TermVector};
use crate::error::Result;

/// Inverted data for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct FieldIndex {
    /// term -> postings ordered by document id.
    postings: BTreeMap<String, Vec<Posting>>,
    /// doc id -> number of tokens.
    lengths: BTreeMap<u64, u64>,
    term_vectors: BTreeMap<u64, TermVector>,
    sum_total_term_freq: u64,
}

/// An inverted index held entirely in memory.
///
/// Document ids are dense and assigned in insertion order. The index is
/// append-only; it is the unit persisted by [`snapshot`](crate::engine::snapshot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryIndex {
    stored: Vec<Document>,
    fields: BTreeMap<String, FieldIndex>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next document id and record its stored fields.
    pub(crate) fn push_document(&mut self, stored: Document) -> u64 {
        let doc_id = self.stored.len() as u64;
        self.stored.push(stored);
        doc_id
    }

    /// Add the analyzed tokens of one document field.
    pub(crate) fn index_field(
        &mut self,
        doc_id: u64,
        field: &str,
        tokens: &[String],
        store_term_vector: bool,
    ) {
        let mut vector = TermVector::new();
        for token in tokens {
            vector.add(token);
        }

        let field_index = self.fields.entry(field.to_string()).or_default();
        for (term, freq) in vector.iter() {
            field_index
                .postings
                .entry(term.to_string())
                .or_default()
                .push(Posting { doc_id, freq });
        }
        field_index.lengths.insert(doc_id, tokens.len() as u64);
        field_index.sum_total_term_freq += tokens.len() as u64;
        if store_term_vector {
            field_index.term_vectors.insert(doc_id, vector);
        }
    }

    /// Names of all indexed fields.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

impl IndexReader for MemoryIndex {
    fn doc_count(&self) -> u64 {
        self.stored.len() as u64
    }

    fn document(&self, doc_id: u64) -> Result<Option<Document>> {
        Ok(usize::try_from(doc_id)
            .ok()
            .and_then(|idx| self.stored.get(idx))
            .cloned())
    }

    fn term_vector(&self, doc_id: u64, field: &str) -> Result<Option<TermVector>> {
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.term_vectors.get(&doc_id))
            .cloned())
    }

    fn term_stats(&self, field: &str, term: &str) -> Result<TermStats> {
        let postings = self.fields.get(field).and_then(|f| f.postings.get(term));
        Ok(match postings {
            Some(postings) => TermStats {
                doc_freq: postings.len() as u64,
                total_term_freq: postings.iter().map(|p| p.freq).sum(),
            },
            None => TermStats::default(),
        })
    }

    fn field_stats(&self, field: &str) -> Result<Option<FieldStats>> {
        Ok(self.fields.get(field).map(|f| FieldStats {
            doc_count: f.lengths.len() as u64,
            sum_total_term_freq: f.sum_total_term_freq,
            unique_terms: f.postings.len() as u64,
        }))
    }

    fn postings(&self, field: &str, term: &str) -> Result<Vec<Posting>> {
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.postings.get(term))
            .cloned()
            .unwrap_or_default())
    }

    fn field_length(&self, doc_id: u64, field: &str) -> Result<u64> {
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.lengths.get(&doc_id))
            .copied()
            .unwrap_or(0))
    }

    fn terms(&self, field: &str) -> Result<Vec<String>> {
        Ok(self
            .fields
            .get(field)
            .map(|f| f.postings.keys().cloned().collect())
            .unwrap_or_default())
    }
}
