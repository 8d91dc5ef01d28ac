//! Tokenizer plus an ordered list of filters.

use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Builder-style analyzer. Filters run in the order they were added.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    label: String,
    tokenizer: Arc<dyn Tokenizer>,
    stages: Vec<Arc<dyn Filter>>,
}

impl PipelineAnalyzer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            label: tokenizer.name().to_string(),
            tokenizer,
            stages: Vec::new(),
        }
    }

    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.stages.push(filter);
        self
    }

    pub fn with_name(self, label: impl Into<String>) -> Self {
        PipelineAnalyzer {
            label: label.into(),
            ..self
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Names of the filters, in application order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.stages
            .iter()
            .try_fold(self.tokenizer.tokenize(text)?, |stream, stage| {
                stage.filter(stream)
            })
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}", self.label, self.tokenizer.name())?;
        for stage in &self.stages {
            write!(f, " > {}", stage.name())?;
        }
        f.write_str("]")
    }
}
