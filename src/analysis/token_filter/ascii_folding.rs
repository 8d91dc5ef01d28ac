//! Accent and ligature folding, so that "Café" and "cafe" index to the same
//! term.
//!
//! ```
//! use ricochet::analysis::token_filter::ascii_folding::fold_to_ascii;
//!
//! assert_eq!(fold_to_ascii("naïve"), "naive");
//! assert_eq!(fold_to_ascii("straße"), "strasse");
//! ```

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Letters that do not decompose under NFKD but still have a conventional
/// ASCII spelling.
fn fold_special(c: char) -> Option<&'static str> {
    match c {
        'ß' => Some("ss"),
        'æ' => Some("ae"),
        'Æ' => Some("AE"),
        'œ' => Some("oe"),
        'Œ' => Some("OE"),
        'ø' => Some("o"),
        'Ø' => Some("O"),
        'đ' | 'ð' => Some("d"),
        'Đ' | 'Ð' => Some("D"),
        'ł' => Some("l"),
        'Ł' => Some("L"),
        'þ' => Some("th"),
        'Þ' => Some("TH"),
        'ı' => Some("i"),
        _ => None,
    }
}

/// Fold a single string to ASCII where a folding exists.
///
/// Characters with no ASCII form (CJK, for instance) are kept as they are.
pub fn fold_to_ascii(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let mut folded = String::with_capacity(text.len());
    for c in text.nfkd() {
        if is_combining_mark(c) {
            continue;
        }
        match fold_special(c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(c),
        }
    }
    folded
}

/// Folds live tokens to ASCII with [`fold_to_ascii`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiFoldingFilter;

impl AsciiFoldingFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Filter for AsciiFoldingFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.stopped || token.text.is_ascii() {
                return token;
            }
            let folded = fold_to_ascii(&token.text);
            token.with_text(folded)
        })))
    }

    fn name(&self) -> &'static str {
        "ascii_folding"
    }
}
