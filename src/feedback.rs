//! Pseudo-relevance feedback statistics.
//!
//! The top documents of a first retrieval pass are turned into per-document
//! term vectors ([`DocumentVector`]) and pooled into corpus-level statistics
//! ([`FeedbackStatistics`]). All of it lives for one query only.

pub mod aggregator;
pub mod stats;

pub use aggregator::FeedbackAggregator;
pub use stats::{DocumentVector, FeedbackStatistics, PerTermStat, WordProbability};
