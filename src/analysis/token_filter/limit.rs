//! Caps the number of tokens an analyzer emits.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Passes through the first `max` tokens and ends the stream there.
#[derive(Clone, Copy, Debug)]
pub struct LimitFilter {
    max: usize,
}

impl LimitFilter {
    pub fn new(max: usize) -> Self {
        LimitFilter { max }
    }

    pub fn limit(&self) -> usize {
        self.max
    }
}

impl Filter for LimitFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.take(self.max)))
    }

    fn name(&self) -> &'static str {
        "limit"
    }
}
