//! Two-pass query answering: retrieve, expand, retrieve again.
//!
//! A [`QuerySolver`] moves through three states:
//!
//! ```text
//! Uninitialized --initiate()--> Ready --terminate()--> Closed
//! ```
//!
//! Only a ready solver answers queries. All feedback and expansion state is
//! local to one [`QuerySolver::answer_query`] call, so a ready solver can be
//! shared between threads.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::config::SolverConfig;
use crate::engine::collector::TopDocs;
use crate::engine::directory::Directory;
use crate::engine::searcher::IndexSearcher;
use crate::error::{Result, RicochetError};
use crate::expansion::{Expander, ExpansionContext, QueryExpander};
use crate::query_builder::QueryBuilder;

/// A query with an identifier, as found in a topic file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicQuery {
    pub id: String,
    pub text: String,
}

impl TopicQuery {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, text: T) -> Self {
        TopicQuery {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Parse one line: either a JSON object `{"id": .., "text": ..}` or
    /// `id<TAB>text`.
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim_start().starts_with('{') {
            return Ok(serde_json::from_str(line)?);
        }
        match line.split_once('\t') {
            Some((id, text)) => Ok(TopicQuery::new(id.trim(), text.trim())),
            None => Err(RicochetError::query(format!(
                "expected 'id<TAB>text' or a JSON object, got '{line}'"
            ))),
        }
    }

    /// Read every non-blank line of a topic file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut topics = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let topic = Self::parse_line(&line).map_err(|e| {
                RicochetError::query(format!(
                    "{}:{}: {e}",
                    path.as_ref().display(),
                    line_num + 1
                ))
            })?;
            topics.push(topic);
        }
        Ok(topics)
    }
}

/// One answer: the external identifier and the score of the final pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
}

enum SolverState {
    Uninitialized,
    Ready(IndexSearcher),
    Closed,
}

/// Answers free-text queries with optional pseudo-relevance feedback.
pub struct QuerySolver {
    config: SolverConfig,
    directory: Arc<dyn Directory>,
    analyzer: Arc<dyn Analyzer>,
    builder: QueryBuilder,
    expander: QueryExpander,
    state: RwLock<SolverState>,
}

impl std::fmt::Debug for QuerySolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.state.read() {
            SolverState::Uninitialized => "uninitialized",
            SolverState::Ready(_) => "ready",
            SolverState::Closed => "closed",
        };
        f.debug_struct("QuerySolver")
            .field("config", &self.config)
            .field("directory", &self.directory)
            .field("analyzer", &self.analyzer.name())
            .field("expander", &self.expander)
            .field("state", &state)
            .finish()
    }
}

impl QuerySolver {
    /// Create a solver over `directory`. The analyzer must be the one the
    /// index was built with.
    ///
    /// An invalid configuration is rejected here.
    pub fn new(
        config: SolverConfig,
        directory: Arc<dyn Directory>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Result<Self> {
        config.validate()?;
        let builder = QueryBuilder::new(analyzer.clone()).with_max_tokens(config.max_query_tokens);
        let expander = QueryExpander::from_config(&config);
        Ok(QuerySolver {
            config,
            directory,
            analyzer,
            builder,
            expander,
            state: RwLock::new(SolverState::Uninitialized),
        })
    }

    /// Create a solver using the analyzer named in the configuration.
    pub fn with_directory(config: SolverConfig, directory: Arc<dyn Directory>) -> Result<Self> {
        let analyzer = config.analyzer.build()?;
        Self::new(config, directory, analyzer)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn expander(&self) -> &QueryExpander {
        &self.expander
    }

    /// Open the index and bind the ranking function.
    ///
    /// Calling it on a ready solver does nothing. A closed solver cannot be
    /// reopened.
    pub fn initiate(&self) -> Result<()> {
        let mut state = self.state.write();
        match *state {
            SolverState::Ready(_) => return Ok(()),
            SolverState::Closed => return Err(RicochetError::SolverClosed),
            SolverState::Uninitialized => {}
        }

        let reader = self.directory.open_reader()?;
        let similarity = self.config.similarity.build();
        info!(
            "Solver ready: {} documents, similarity {}, expansion {}",
            reader.doc_count(),
            similarity.name(),
            self.expander.kind()
        );
        *state = SolverState::Ready(IndexSearcher::new(reader, similarity));
        Ok(())
    }

    /// Release the index. Later queries fail with `RicochetError::SolverClosed`.
    pub fn terminate(&self) {
        let mut state = self.state.write();
        if !matches!(*state, SolverState::Closed) {
            info!("Solver closed");
        }
        *state = SolverState::Closed;
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), SolverState::Ready(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.state.read(), SolverState::Closed)
    }

    fn searcher(&self) -> Result<IndexSearcher> {
        match &*self.state.read() {
            SolverState::Ready(searcher) => Ok(searcher.clone()),
            SolverState::Uninitialized => Err(RicochetError::SolverNotInitialized),
            SolverState::Closed => Err(RicochetError::SolverClosed),
        }
    }

    /// External identifiers of the `k` best documents for `text`, most
    /// relevant first.
    pub fn answer_query(&self, text: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .search(text, k)?
            .into_iter()
            .map(|hit| hit.id)
            .collect())
    }

    /// Like [`answer_query`](Self::answer_query), keeping the final scores.
    pub fn search(&self, text: &str, k: usize) -> Result<Vec<SearchHit>> {
        let searcher = self.searcher()?;
        let field = self.config.target_field.as_str();

        let tokens = self.builder.tokens(text)?;
        debug!("Query {text:?} analyzed to {tokens:?}");

        let first = searcher.search(&QueryBuilder::from_tokens(field, &tokens), k)?;
        let top = if self.expander.is_enabled() {
            self.second_pass(&searcher, &tokens, first, k)?
        } else {
            first
        };

        self.resolve(&searcher, &top)
    }

    /// Expand from the first-pass ranking and search again. The second
    /// ranking replaces the first; when expansion yields nothing the first
    /// ranking is returned as is.
    fn second_pass(
        &self,
        searcher: &IndexSearcher,
        tokens: &[String],
        first: TopDocs,
        k: usize,
    ) -> Result<TopDocs> {
        let field = self.config.target_field.as_str();
        let ctx = ExpansionContext {
            reader: searcher.reader().as_ref(),
            field,
            analyzer: self.analyzer.clone(),
        };

        let expanded = match self.expander.expand(&ctx, tokens, &first.score_docs) {
            Ok(expanded) => expanded,
            Err(e) if e.is_recoverable() => {
                debug!("Expansion skipped: {e}");
                return Ok(first);
            }
            Err(e) => return Err(e),
        };

        let query = QueryBuilder::build_expanded(field, &expanded, self.config.weighted_expansion);
        if query.is_empty() {
            debug!("Expansion produced no terms, keeping first pass");
            return Ok(first);
        }
        debug!("Expanded query: {query}");

        searcher.search(&query, k)
    }

    fn resolve(&self, searcher: &IndexSearcher, top: &TopDocs) -> Result<Vec<SearchHit>> {
        let id_field = self.config.id_field.as_str();
        let mut hits = Vec::with_capacity(top.len());
        for score_doc in &top.score_docs {
            let id = searcher
                .doc(score_doc.doc_id)?
                .and_then(|doc| doc.get_field(id_field).map(str::to_string));
            match id {
                Some(id) => {
                    debug!("{id}: {}", score_doc.score);
                    hits.push(SearchHit {
                        id,
                        score: score_doc.score,
                    });
                }
                None => warn!(
                    "Document {} has no stored '{id_field}' field, skipping",
                    score_doc.doc_id
                ),
            }
        }
        Ok(hits)
    }

    /// Answer a batch of topics, keyed by topic id.
    pub fn answer_queries(
        &self,
        topics: &[TopicQuery],
        k: usize,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let mut answers = BTreeMap::new();
        for topic in topics {
            answers.insert(topic.id.clone(), self.answer_query(&topic.text, k)?);
        }
        Ok(answers)
    }
}
