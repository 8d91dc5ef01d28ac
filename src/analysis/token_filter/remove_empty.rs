//! Drops tokens that should never reach the index.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Removes stopped tokens and tokens whose text was emptied by an earlier
/// filter.
#[derive(Clone, Copy, Debug, Default)]
pub struct RemoveEmptyFilter;

impl RemoveEmptyFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Filter for RemoveEmptyFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.filter(|t| !(t.stopped || t.is_empty()))))
    }

    fn name(&self) -> &'static str {
        "remove_empty"
    }
}
