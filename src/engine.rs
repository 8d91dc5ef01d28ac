//! Minimal full-text engine backing the solver.
//!
//! An index is built in memory by [`IndexWriter`], optionally committed to a
//! directory as a checksummed snapshot, and opened read-only through a
//! [`Directory`]. Search is term-at-a-time over [`BooleanQuery`] clauses with
//! a pluggable [`Similarity`].

pub mod collector;
pub mod directory;
pub mod document;
pub mod memory;
pub mod query;
pub mod reader;
pub mod searcher;
pub mod similarity;
pub mod snapshot;
pub mod writer;

pub use collector::{ScoreDoc, TopDocs, TopDocsCollector};
pub use directory::{Directory, FsDirectory, RamDirectory};
pub use document::{Document, DocumentBuilder};
pub use memory::MemoryIndex;
pub use query::{BooleanClause, BooleanQuery, Occur, TermQuery};
pub use reader::{FieldStats, IndexReader, Posting, TermStats, TermVector};
pub use searcher::IndexSearcher;
pub use similarity::{Bm25Similarity, ClassicSimilarity, Similarity, classic_idf};
pub use writer::{FieldOptions, IndexWriter};
