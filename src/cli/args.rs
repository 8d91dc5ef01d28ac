//! Command line argument parsing for the Ricochet CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{AnalyzerKind, SimilarityConfig, SolverConfig};
use crate::expansion::ExpansionKind;

/// Ricochet - pseudo-relevance-feedback query expansion
#[derive(Parser, Debug, Clone)]
#[command(name = "ricochet")]
#[command(about = "Ad-hoc retrieval with RM1/RM3 and Rocchio query expansion")]
#[command(version)]
pub struct RicochetArgs {
    /// More log output (-vv for info, -vvv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print results and errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl RicochetArgs {
    /// 0 when quiet, otherwise the -v count with a floor of 1.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index from a JSONL corpus
    Index(IndexArgs),

    /// Answer topic queries against an index
    Search(SearchArgs),

    /// Show index metadata
    Stats(StatsArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Corpus file, one JSON object {"id": .., "text": ..} per line
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus_file: PathBuf,

    /// Solver configuration file (JSON); supplies field names and analyzer
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Text analyzer
    #[arg(long)]
    pub analyzer: Option<AnalyzerArg>,

    /// Do not store term vectors for the text field
    #[arg(long)]
    pub no_term_vectors: bool,

    /// Overwrite an existing index
    #[arg(long)]
    pub force: bool,
}

/// Arguments for answering queries
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Topic file: JSONL {"id": .., "text": ..} or id<TAB>text lines
    #[arg(value_name = "TOPICS_FILE")]
    pub topics_file: PathBuf,

    /// Solver configuration file (JSON); flags below override it
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Expansion strategy (none, rm1, rm3, rocchio)
    #[arg(short, long)]
    pub strategy: Option<ExpansionKind>,

    /// Number of results per query
    #[arg(short = 'k', long)]
    pub result_count: Option<usize>,

    /// Number of feedback documents
    #[arg(long)]
    pub feedback_docs: Option<usize>,

    /// Number of expansion terms
    #[arg(long)]
    pub feedback_terms: Option<usize>,

    /// Document/collection mixing weight
    #[arg(long)]
    pub lambda: Option<f64>,

    /// RM3 weight of the relevance model against the query
    #[arg(long)]
    pub query_mix: Option<f64>,

    /// Rocchio query weight
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Rocchio feedback weight
    #[arg(long)]
    pub beta: Option<f64>,

    /// Boost expansion terms by their weights
    #[arg(long)]
    pub weighted: bool,

    /// Ranking function
    #[arg(long)]
    pub similarity: Option<SimilarityArg>,

    /// Text analyzer; must match the one used at index time
    #[arg(long)]
    pub analyzer: Option<AnalyzerArg>,
}

/// Arguments for index metadata
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityArg {
    /// Okapi BM25 (k1 = 1.2, b = 0.75)
    Bm25,
    /// Lucene classic TF-IDF
    Classic,
}

impl From<SimilarityArg> for SimilarityConfig {
    fn from(arg: SimilarityArg) -> Self {
        match arg {
            SimilarityArg::Bm25 => SimilarityConfig::default(),
            SimilarityArg::Classic => SimilarityConfig::Classic,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerArg {
    English,
    Simple,
}

impl From<AnalyzerArg> for AnalyzerKind {
    fn from(arg: AnalyzerArg) -> Self {
        match arg {
            AnalyzerArg::English => AnalyzerKind::English,
            AnalyzerArg::Simple => AnalyzerKind::Simple,
        }
    }
}

/// How results are printed
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text; search results as `query_id<TAB>rank<TAB>doc_id` lines
    Human,
    /// JSON output
    Json,
}

impl IndexArgs {
    /// Apply the flags on top of `config`.
    pub fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(analyzer) = self.analyzer {
            config = config.with_analyzer(analyzer.into());
        }
        config
    }
}

impl SearchArgs {
    /// Apply the flags on top of `config`.
    pub fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy);
        }
        if let Some(k) = self.result_count {
            config = config.with_result_count(k);
        }
        if let Some(limit) = self.feedback_docs {
            config = config.with_feedback_document_limit(limit);
        }
        if let Some(limit) = self.feedback_terms {
            config = config.with_feedback_term_limit(limit);
        }
        if let Some(lambda) = self.lambda {
            config = config.with_mixing_lambda(lambda);
        }
        if let Some(query_mix) = self.query_mix {
            config = config.with_query_mix(query_mix);
        }
        if let Some(alpha) = self.alpha {
            config.rocchio_alpha = alpha;
        }
        if let Some(beta) = self.beta {
            config.rocchio_beta = beta;
        }
        if self.weighted {
            config = config.with_weighted_expansion(true);
        }
        if let Some(similarity) = self.similarity {
            config = config.with_similarity(similarity.into());
        }
        if let Some(analyzer) = self.analyzer {
            config = config.with_analyzer(analyzer.into());
        }
        config
    }
}
