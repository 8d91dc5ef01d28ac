//! Case folding.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Lowercases every live token; stopped tokens are left as they are.
#[derive(Clone, Copy, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.stopped || !token.text.chars().any(char::is_uppercase) {
                return token;
            }
            let folded = token.text.to_lowercase();
            token.with_text(folded)
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
