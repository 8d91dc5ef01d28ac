//! Splitting raw text into tokens.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod regex;

pub use self::regex::RegexTokenizer;

/// First stage of every analyzer.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    fn name(&self) -> &'static str;
}
