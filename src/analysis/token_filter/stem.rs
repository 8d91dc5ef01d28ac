//! Suffix stripping.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod porter;

pub use porter::PorterStemmer;

/// Maps a word to its stem.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;

    fn name(&self) -> &'static str;
}

/// Rewrites every live token with a [`Stemmer`], Porter by default.
pub struct StemFilter {
    stemmer: std::sync::Arc<dyn Stemmer>,
}

impl StemFilter {
    pub fn new() -> Self {
        Self::with_stemmer(Box::new(PorterStemmer))
    }

    pub fn with_stemmer(stemmer: Box<dyn Stemmer>) -> Self {
        StemFilter {
            stemmer: stemmer.into(),
        }
    }
}

impl Default for StemFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StemFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StemFilter({})", self.stemmer.name())
    }
}

impl Filter for StemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stemmer = std::sync::Arc::clone(&self.stemmer);
        Ok(Box::new(tokens.map(move |token| {
            if token.stopped {
                token
            } else {
                let stem = stemmer.stem(&token.text);
                token.with_text(stem)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "stem"
    }
}
