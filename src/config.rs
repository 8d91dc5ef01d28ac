//! Solver configuration.
//!
//! # Examples
//!
//! ```
//! use ricochet::config::SolverConfig;
//! use ricochet::expansion::ExpansionKind;
//!
//! let config = SolverConfig::default()
//!     .with_strategy(ExpansionKind::Rm3)
//!     .with_feedback_term_limit(20);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.target_field, "paragraph");
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, EnglishAnalyzer, SimpleAnalyzer};
use crate::engine::similarity::{Bm25Similarity, ClassicSimilarity, Similarity};
use crate::error::{Result, RicochetError};
use crate::expansion::ExpansionKind;

/// Ranking function used for both retrieval passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum SimilarityConfig {
    Bm25 { k1: f32, b: f32 },
    Classic,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        SimilarityConfig::Bm25 { k1: 1.2, b: 0.75 }
    }
}

impl SimilarityConfig {
    pub fn build(&self) -> Arc<dyn Similarity> {
        match *self {
            SimilarityConfig::Bm25 { k1, b } => Arc::new(Bm25Similarity::new(k1, b)),
            SimilarityConfig::Classic => Arc::new(ClassicSimilarity::new()),
        }
    }

    fn validate(&self) -> Result<()> {
        if let SimilarityConfig::Bm25 { k1, b } = *self {
            if !k1.is_finite() || k1 < 0.0 {
                return Err(RicochetError::invalid_config(format!(
                    "bm25 k1 must be a non-negative number, got {k1}"
                )));
            }
            if !b.is_finite() || !(0.0..=1.0).contains(&b) {
                return Err(RicochetError::invalid_config(format!(
                    "bm25 b must be within [0, 1], got {b}"
                )));
            }
        }
        Ok(())
    }
}

/// Text analysis applied at index and query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// Folding, stop words, digit stripping and Porter stemming.
    #[default]
    English,
    /// Lowercased word tokens.
    Simple,
}

impl AnalyzerKind {
    pub fn build(&self) -> Result<Arc<dyn Analyzer>> {
        Ok(match self {
            AnalyzerKind::English => Arc::new(EnglishAnalyzer::new()?),
            AnalyzerKind::Simple => Arc::new(SimpleAnalyzer::new()?),
        })
    }
}

/// Construction-time parameters of a [`QuerySolver`](crate::solver::QuerySolver).
///
/// Missing keys in a JSON document take the default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Field queries run against and feedback statistics come from.
    pub target_field: String,
    /// Stored field holding the external document identifier.
    pub id_field: String,
    /// Number of results k of each retrieval pass.
    pub result_count: usize,
    /// Number of top documents in the feedback pool.
    pub feedback_document_limit: usize,
    /// Number of expansion terms kept.
    pub feedback_term_limit: usize,
    /// λ: weight of the document model against the collection model.
    pub mixing_lambda: f64,
    /// λ_q: weight of the relevance model against the query model (RM3).
    pub query_mix: f64,
    /// Rocchio weight of the original query.
    pub rocchio_alpha: f64,
    /// Rocchio weight of the feedback documents.
    pub rocchio_beta: f64,
    pub strategy: ExpansionKind,
    /// Use expansion weights as term boosts in the second pass.
    pub weighted_expansion: bool,
    /// Upper bound on analyzed query tokens.
    pub max_query_tokens: Option<usize>,
    pub similarity: SimilarityConfig,
    pub analyzer: AnalyzerKind,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            target_field: "paragraph".to_string(),
            id_field: "id".to_string(),
            result_count: 10,
            feedback_document_limit: 5,
            feedback_term_limit: 10,
            mixing_lambda: 0.7,
            query_mix: 0.7,
            rocchio_alpha: 1.0,
            rocchio_beta: 0.8,
            strategy: ExpansionKind::None,
            weighted_expansion: false,
            max_query_tokens: Some(128),
            similarity: SimilarityConfig::default(),
            analyzer: AnalyzerKind::default(),
        }
    }
}

impl SolverConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SolverConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter; the first violation is returned as
    /// `RicochetError::InvalidConfig`.
    pub fn validate(&self) -> Result<()> {
        if self.target_field.is_empty() {
            return Err(RicochetError::invalid_config("target_field must not be empty"));
        }
        if self.id_field.is_empty() {
            return Err(RicochetError::invalid_config("id_field must not be empty"));
        }
        for (name, value) in [
            ("result_count", self.result_count),
            ("feedback_document_limit", self.feedback_document_limit),
            ("feedback_term_limit", self.feedback_term_limit),
        ] {
            if value == 0 {
                return Err(RicochetError::invalid_config(format!(
                    "{name} must be positive"
                )));
            }
        }
        if self.max_query_tokens == Some(0) {
            return Err(RicochetError::invalid_config(
                "max_query_tokens must be positive when set",
            ));
        }
        for (name, value) in [
            ("mixing_lambda", self.mixing_lambda),
            ("query_mix", self.query_mix),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RicochetError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        for (name, value) in [
            ("rocchio_alpha", self.rocchio_alpha),
            ("rocchio_beta", self.rocchio_beta),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RicochetError::invalid_config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        self.similarity.validate()
    }

    pub fn with_target_field<S: Into<String>>(mut self, field: S) -> Self {
        self.target_field = field.into();
        self
    }

    pub fn with_id_field<S: Into<String>>(mut self, field: S) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_result_count(mut self, k: usize) -> Self {
        self.result_count = k;
        self
    }

    pub fn with_feedback_document_limit(mut self, limit: usize) -> Self {
        self.feedback_document_limit = limit;
        self
    }

    pub fn with_feedback_term_limit(mut self, limit: usize) -> Self {
        self.feedback_term_limit = limit;
        self
    }

    pub fn with_mixing_lambda(mut self, lambda: f64) -> Self {
        self.mixing_lambda = lambda;
        self
    }

    pub fn with_query_mix(mut self, query_mix: f64) -> Self {
        self.query_mix = query_mix;
        self
    }

    pub fn with_rocchio(mut self, alpha: f64, beta: f64) -> Self {
        self.rocchio_alpha = alpha;
        self.rocchio_beta = beta;
        self
    }

    pub fn with_strategy(mut self, strategy: ExpansionKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_weighted_expansion(mut self, weighted: bool) -> Self {
        self.weighted_expansion = weighted;
        self
    }

    pub fn with_max_query_tokens(mut self, max: Option<usize>) -> Self {
        self.max_query_tokens = max;
        self
    }

    pub fn with_similarity(mut self, similarity: SimilarityConfig) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerKind) -> Self {
        self.analyzer = analyzer;
        self
    }
}
