//! Analyzers turn raw paragraph or query text into index terms.
//!
//! Every analyzer is a tokenizer followed by a chain of filters. The same
//! analyzer must be used at index time and at query time, otherwise query
//! terms will not line up with the postings.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod english;
pub mod pipeline;
pub mod simple;

pub use english::EnglishAnalyzer;
pub use pipeline::PipelineAnalyzer;
pub use simple::SimpleAnalyzer;

/// Deterministic text-to-terms conversion.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    fn name(&self) -> &'static str;

    /// Term texts in input order. Repeated words are kept.
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let terms = self.analyze(text)?.map(|token| token.text).collect();
        Ok(terms)
    }
}
