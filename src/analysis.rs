//! Text analysis: tokenization, token filters and analysis pipelines.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
