//! Stop word removal.
//!
//! ```
//! use ricochet::analysis::token::Token;
//! use ricochet::analysis::token_filter::{Filter, StopFilter};
//!
//! let words = vec![Token::new("the", 0), Token::new("lava", 1)];
//! let kept: Vec<String> = StopFilter::new()
//!     .filter(Box::new(words.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(kept, vec!["lava"]);
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// The 33-word English list most Lucene-derived engines ship with.
pub const ENGLISH_STOP_WORDS: [&str; 33] = [
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

static ENGLISH: LazyLock<Arc<HashSet<String>>> = LazyLock::new(|| {
    Arc::new(ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect())
});

/// Drops (or only marks) tokens found in a word list.
///
/// Lookup is case sensitive; run it after [`LowercaseFilter`](super::LowercaseFilter).
#[derive(Clone, Debug)]
pub struct StopFilter {
    words: Arc<HashSet<String>>,
    mark_only: bool,
}

impl StopFilter {
    pub fn new() -> Self {
        StopFilter {
            words: Arc::clone(&ENGLISH),
            mark_only: false,
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            words: Arc::new(words.into_iter().map(Into::into).collect()),
            mark_only: false,
        }
    }

    /// Keep stop words in the stream as stopped tokens.
    pub fn mark_only(self, mark_only: bool) -> Self {
        StopFilter { mark_only, ..self }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words = Arc::clone(&self.words);
        let mark_only = self.mark_only;
        Ok(Box::new(tokens.filter_map(move |token| {
            match (token.stopped || !words.contains(&token.text), mark_only) {
                (true, _) => Some(token),
                (false, true) => Some(token.stop()),
                (false, false) => None,
            }
        })))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
