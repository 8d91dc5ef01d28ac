//! Token stream rewriting stages.
//!
//! Filters are lazy: each wraps the incoming stream and does its work as the
//! next stage pulls tokens. A filter must leave stopped tokens unchanged
//! unless its job is to remove them.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod ascii_folding;
pub mod limit;
pub mod lowercase;
pub mod number;
pub mod remove_empty;
pub mod stem;
pub mod stop;

pub use ascii_folding::AsciiFoldingFilter;
pub use limit::LimitFilter;
pub use lowercase::LowercaseFilter;
pub use number::NumberFilter;
pub use remove_empty::RemoveEmptyFilter;
pub use stem::{PorterStemmer, StemFilter, Stemmer};
pub use stop::StopFilter;

pub trait Filter: Send + Sync {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    fn name(&self) -> &'static str;
}
