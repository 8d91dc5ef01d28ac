//! Default analyzer for English paragraphs.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{
    AsciiFoldingFilter, Filter, LowercaseFilter, NumberFilter, RemoveEmptyFilter, StemFilter,
    StopFilter,
};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::error::Result;

/// Words are lowercased and folded to ASCII. Stop words are dropped, digits
/// are stripped, and what is left goes through the Porter stemmer.
#[derive(Clone, Debug)]
pub struct EnglishAnalyzer {
    pipeline: PipelineAnalyzer,
}

impl EnglishAnalyzer {
    pub fn new() -> Result<Self> {
        let mut pipeline = PipelineAnalyzer::new(Arc::new(RegexTokenizer::new()?));
        let stages: [Arc<dyn Filter>; 6] = [
            Arc::new(LowercaseFilter),
            Arc::new(AsciiFoldingFilter::new()),
            Arc::new(StopFilter::new()),
            Arc::new(NumberFilter),
            Arc::new(RemoveEmptyFilter),
            Arc::new(StemFilter::new()),
        ];
        for stage in stages {
            pipeline = pipeline.add_filter(stage);
        }

        Ok(EnglishAnalyzer {
            pipeline: pipeline.with_name("english"),
        })
    }
}

impl Analyzer for EnglishAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.pipeline.analyze(text)
    }

    fn name(&self) -> &'static str {
        "english"
    }
}
