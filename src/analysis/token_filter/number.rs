//! Digit stripping.
//!
//! ASCII digits are removed from token text. A token made only of digits ends
//! up empty and is dropped by [`RemoveEmptyFilter`](super::RemoveEmptyFilter).

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

#[derive(Clone, Copy, Debug, Default)]
pub struct NumberFilter;

impl NumberFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Filter for NumberFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.stopped || !token.text.bytes().any(|b| b.is_ascii_digit()) {
                return token;
            }
            let letters = token.text.replace(|c: char| c.is_ascii_digit(), "");
            token.with_text(letters)
        })))
    }

    fn name(&self) -> &'static str {
        "number"
    }
}
