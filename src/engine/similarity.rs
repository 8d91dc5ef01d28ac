//! Ranking functions.

use std::fmt::Debug;

/// Classic Lucene idf: `1 + ln(N / (df + 1))`.
///
/// Strictly decreasing in `doc_freq` and positive whenever `doc_freq <= doc_count`.
pub fn classic_idf(doc_freq: u64, doc_count: u64) -> f64 {
    1.0 + (doc_count as f64 / (doc_freq as f64 + 1.0)).ln()
}

/// Scores one term occurrence in one document.
pub trait Similarity: Send + Sync + Debug {
    /// Inverse document frequency of a term.
    fn idf(&self, doc_freq: u64, doc_count: u64) -> f32;

    /// Score of a term with frequency `freq` in a field of `field_length`
    /// tokens, given the term's idf.
    fn score(&self, freq: u64, field_length: u64, avg_field_length: f32, idf: f32) -> f32;

    /// Get the name of this similarity.
    fn name(&self) -> &'static str;
}

/// Okapi BM25 with the non-negative idf `ln(1 + (N - df + 0.5) / (df + 0.5))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Similarity {
    k1: f32,
    b: f32,
}

impl Bm25Similarity {
    pub fn new(k1: f32, b: f32) -> Self {
        Bm25Similarity { k1, b }
    }

    /// Get the k1 parameter.
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Get the b parameter.
    pub fn b(&self) -> f32 {
        self.b
    }
}

impl Default for Bm25Similarity {
    fn default() -> Self {
        Bm25Similarity { k1: 1.2, b: 0.75 }
    }
}

impl Similarity for Bm25Similarity {
    fn idf(&self, doc_freq: u64, doc_count: u64) -> f32 {
        if doc_freq == 0 {
            return 0.0;
        }
        let n = doc_count as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn score(&self, freq: u64, field_length: u64, avg_field_length: f32, idf: f32) -> f32 {
        if freq == 0 {
            return 0.0;
        }

        let tf = freq as f32;
        let norm = if avg_field_length > 0.0 {
            1.0 - self.b + self.b * (field_length as f32 / avg_field_length)
        } else {
            1.0
        };

        idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm)
    }

    fn name(&self) -> &'static str {
        "bm25"
    }
}

/// Lucene's classic TF-IDF: `sqrt(tf) · idf² · 1/sqrt(length)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassicSimilarity;

impl ClassicSimilarity {
    pub fn new() -> Self {
        ClassicSimilarity
    }
}

impl Similarity for ClassicSimilarity {
    fn idf(&self, doc_freq: u64, doc_count: u64) -> f32 {
        if doc_freq == 0 {
            return 0.0;
        }
        classic_idf(doc_freq, doc_count) as f32
    }

    fn score(&self, freq: u64, field_length: u64, _avg_field_length: f32, idf: f32) -> f32 {
        if freq == 0 {
            return 0.0;
        }
        let norm = if field_length > 0 {
            1.0 / (field_length as f32).sqrt()
        } else {
            1.0
        };
        (freq as f32).sqrt() * idf * idf * norm
    }

    fn name(&self) -> &'static str {
        "classic"
    }
}
