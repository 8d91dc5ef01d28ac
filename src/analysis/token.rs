//! Token type flowing through the analysis pipeline.
//!
//! Tokenizers emit [`Token`]s with their byte span in the source text; filters
//! then rewrite the text or mark the token as stopped. Stopped tokens stay in
//! the stream until a [`RemoveEmptyFilter`](crate::analysis::token_filter::RemoveEmptyFilter)
//! drops them, so positions keep counting words of the original paragraph.
//!
//! ```
//! use ricochet::analysis::token::Token;
//!
//! let token = Token::with_offsets("world", 1, 6, 11);
//! assert_eq!(token.span, 6..11);
//! assert!(!token.is_stopped());
//! ```

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One analyzed word.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Ordinal of the word in the tokenizer output.
    pub position: usize,
    /// Byte range in the analyzed text; empty for synthetic tokens.
    pub span: Range<usize>,
    pub stopped: bool,
}

impl Token {
    /// A token with no source span.
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self::with_offsets(text, position, 0, 0)
    }

    pub fn with_offsets(text: impl Into<String>, position: usize, start: usize, end: usize) -> Self {
        Token {
            text: text.into(),
            position,
            span: start..end,
            stopped: false,
        }
    }

    pub fn stop(self) -> Self {
        Token {
            stopped: true,
            ..self
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Swap in a rewritten text; position and span are untouched.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            ..self
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lazily evaluated sequence of tokens.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
