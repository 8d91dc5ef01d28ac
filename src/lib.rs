//! # Ricochet
//!
//! Pseudo-relevance-feedback query expansion for ad-hoc text retrieval.
//!
//! A query is answered in two passes. The first pass retrieves the top
//! documents for the analyzed query; an expansion strategy reads those
//! documents and proposes weighted terms; the second pass retrieves with the
//! reformulated query and replaces the first result.
//!
//! ## Features
//!
//! - Relevance models RM1 and RM3 over smoothed document language models
//! - Rocchio expansion over a throwaway index of the feedback documents
//! - A small in-memory search engine with BM25 and classic TF-IDF scoring,
//!   term vectors and checksummed on-disk snapshots
//! - English analysis: folding, stop words, Porter stemming
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use ricochet::config::SolverConfig;
//! use ricochet::engine::{Document, FieldOptions, IndexWriter};
//! use ricochet::expansion::ExpansionKind;
//! use ricochet::solver::QuerySolver;
//!
//! let config = SolverConfig::default().with_strategy(ExpansionKind::Rm3);
//! let analyzer = config.analyzer.build().unwrap();
//!
//! let mut writer = IndexWriter::new(analyzer.clone())
//!     .with_field("id", FieldOptions::keyword())
//!     .with_field("paragraph", FieldOptions::text_with_term_vectors());
//! writer
//!     .add_document(
//!         Document::builder()
//!             .add_text("id", "p1")
//!             .add_text("paragraph", "Borrowing rules keep Rust memory safe")
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let solver =
//!     QuerySolver::new(config, Arc::new(writer.into_ram_directory()), analyzer).unwrap();
//! solver.initiate().unwrap();
//! assert_eq!(solver.answer_query("rust memory", 10).unwrap(), vec!["p1"]);
//! solver.terminate();
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod expansion;
pub mod feedback;
pub mod query_builder;
pub mod solver;

pub mod prelude {
    pub use crate::config::SolverConfig;
    pub use crate::error::{Result, RicochetError};
    pub use crate::expansion::{ExpandedQuery, Expander, ExpansionKind};
    pub use crate::solver::{QuerySolver, TopicQuery};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
