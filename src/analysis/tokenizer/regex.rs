//! Pattern-driven word splitting.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, RicochetError};

const WORD_PATTERN: &str = r"\w+";

/// Emits one token per non-overlapping match of a regular expression.
///
/// [`RegexTokenizer::new`] matches runs of Unicode word characters.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    matcher: Arc<Regex>,
}

impl RegexTokenizer {
    pub fn new() -> Result<Self> {
        Self::with_pattern(WORD_PATTERN)
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(|matcher| RegexTokenizer {
                matcher: Arc::new(matcher),
            })
            .map_err(|e| RicochetError::analysis(format!("bad token pattern {pattern:?}: {e}")))
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        // The stream must own its data, so matches are resolved up front.
        let mut tokens = Vec::new();
        for (position, found) in self.matcher.find_iter(text).enumerate() {
            tokens.push(Token::with_offsets(
                found.as_str(),
                position,
                found.start(),
                found.end(),
            ));
        }
        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_spans() {
        let tokens: Vec<Token> = RegexTokenizer::new()
            .unwrap()
            .tokenize("basil, tomato")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!((tokens[0].text.as_str(), tokens[0].span.clone()), ("basil", 0..5));
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].span, 7..13);
        assert_eq!(&"basil, tomato"[tokens[1].span.clone()], "tomato");
    }

    #[test]
    fn test_comma_separated_pattern() {
        let tokenizer = RegexTokenizer::with_pattern(r"[^,]+").unwrap();
        assert_eq!(tokenizer.pattern(), r"[^,]+");

        let texts: Vec<String> = tokenizer
            .tokenize("query expansion,rm3")
            .unwrap()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["query expansion", "rm3"]);
    }

    #[test]
    fn test_unbalanced_pattern_is_an_analysis_error() {
        let err = RegexTokenizer::with_pattern("(").unwrap_err();
        assert!(matches!(err, RicochetError::Analysis(_)));
    }
}
