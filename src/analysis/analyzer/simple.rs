//! Word splitting and lowercasing only.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::LowercaseFilter;
use crate::analysis::tokenizer::RegexTokenizer;
use crate::error::Result;

/// Keeps every word, stop words included, in lowercase. Term statistics stay
/// easy to compute by hand.
#[derive(Clone, Debug)]
pub struct SimpleAnalyzer(PipelineAnalyzer);

impl SimpleAnalyzer {
    pub fn new() -> Result<Self> {
        let pipeline = PipelineAnalyzer::new(Arc::new(RegexTokenizer::new()?))
            .add_filter(Arc::new(LowercaseFilter))
            .with_name("simple");
        Ok(SimpleAnalyzer(pipeline))
    }
}

impl Analyzer for SimpleAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.0.analyze(text)
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_and_duplicates_survive() {
        let analyzer = SimpleAnalyzer::new().unwrap();
        assert_eq!(
            analyzer.tokenize("The Alpha alpha, BETA").unwrap(),
            vec!["the", "alpha", "alpha", "beta"]
        );
        assert!(analyzer.tokenize("  ,;  ").unwrap().is_empty());
    }
}
