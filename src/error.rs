//! Error handling.
//!
//! Every fallible call returns [`Result<T>`]. Most [`RicochetError`] variants
//! end the request. Three of them only mean that expansion cannot proceed;
//! [`RicochetError::is_recoverable`] tells them apart, and the solver answers
//! from the first pass when it sees one.
//!
//! ```
//! use ricochet::error::{Result, RicochetError};
//!
//! fn check_limit(limit: usize) -> Result<usize> {
//!     if limit == 0 {
//!         return Err(RicochetError::invalid_config("feedback_term_limit must be positive"));
//!     }
//!     Ok(limit)
//! }
//!
//! let err = check_limit(0).unwrap_err();
//! assert!(!err.is_recoverable());
//! ```

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RicochetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Rejected solver or engine parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The index is missing, unreadable or fails validation.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// No term vector is stored for this document and field.
    #[error("Term vector unavailable for document {doc_id} in field '{field}'")]
    TermVectorUnavailable { doc_id: u64, field: String },

    /// Nothing usable came back from the feedback documents.
    #[error("Empty feedback pool: {0}")]
    EmptyFeedback(String),

    /// Every weight of a distribution is zero.
    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Solver closed")]
    SolverClosed,

    #[error("Solver not initialized")]
    SolverNotInitialized,

    /// Tokenizer or filter failure.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A query that cannot be executed.
    #[error("Query error: {0}")]
    Query(String),

    /// Binary index encoding or decoding failed.
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Context-carrying errors from the command line layer.
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RicochetError>;

impl RicochetError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        RicochetError::InvalidConfig(msg.into())
    }

    pub fn index_unavailable(msg: impl Into<String>) -> Self {
        RicochetError::IndexUnavailable(msg.into())
    }

    pub fn term_vector_unavailable(doc_id: u64, field: impl Into<String>) -> Self {
        RicochetError::TermVectorUnavailable {
            doc_id,
            field: field.into(),
        }
    }

    pub fn empty_feedback(msg: impl Into<String>) -> Self {
        RicochetError::EmptyFeedback(msg.into())
    }

    pub fn normalization(msg: impl Into<String>) -> Self {
        RicochetError::Normalization(msg.into())
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        RicochetError::Analysis(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        RicochetError::Query(msg.into())
    }

    /// True for the conditions that degrade expansion to the unexpanded
    /// ranking instead of failing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RicochetError::TermVectorUnavailable { .. }
                | RicochetError::EmptyFeedback(_)
                | RicochetError::Normalization(_)
        )
    }
}

impl From<bincode::Error> for RicochetError {
    fn from(e: bincode::Error) -> Self {
        RicochetError::Codec(e.to_string())
    }
}
