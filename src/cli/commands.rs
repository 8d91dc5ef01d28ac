//! Command implementations for the Ricochet CLI.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use log::{info, warn};
use serde::Deserialize;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SolverConfig;
use crate::engine::directory::FsDirectory;
use crate::engine::document::Document;
use crate::engine::snapshot;
use crate::engine::writer::{FieldOptions, IndexWriter};
use crate::error::{Result, RicochetError};
use crate::solver::{QuerySolver, TopicQuery};

/// One paragraph of a JSONL corpus.
#[derive(Debug, Deserialize)]
struct CorpusRecord {
    id: String,
    text: String,
}

/// Execute a CLI command.
pub fn execute_command(args: RicochetArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => build_index(index_args, &args),
        Command::Search(search_args) => run_search(search_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

fn load_config(path: Option<&Path>) -> Result<SolverConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            SolverConfig::from_json_file(path)
        }
        None => Ok(SolverConfig::default()),
    }
}

/// Build an index from a JSONL corpus.
fn build_index(args: &IndexArgs, cli_args: &RicochetArgs) -> Result<()> {
    if args.index_path.join(snapshot::METADATA_FILE).exists() && !args.force {
        return Err(RicochetError::invalid_config(format!(
            "an index already exists at {}; use --force to overwrite",
            args.index_path.display()
        )));
    }

    // Field names and analyzer come from the config file, flags override it
    let config = args.apply(load_config(args.config.as_deref())?);
    config.validate()?;

    let start_time = Instant::now();
    let mut writer = IndexWriter::new(config.analyzer.build()?)
        .with_field(config.id_field.as_str(), FieldOptions::keyword())
        .with_field(
            config.target_field.as_str(),
            FieldOptions::text().with_term_vectors(!args.no_term_vectors),
        );

    // Malformed lines are counted and skipped, not fatal
    let file = File::open(&args.corpus_file)
        .with_context(|| format!("cannot open corpus {}", args.corpus_file.display()))?;
    let mut skipped = 0;
    for (line_num, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<CorpusRecord>(&line) {
            Ok(record) => {
                writer.add_document(
                    Document::builder()
                        .add_text(config.id_field.as_str(), record.id)
                        .add_text(config.target_field.as_str(), record.text)
                        .build(),
                )?;
            }
            Err(e) => {
                warn!("Skipping corpus line {}: {e}", line_num + 1);
                skipped += 1;
            }
        }
    }

    // Write metadata.json and index.bin
    let metadata = writer.commit(&args.index_path)?;

    output_result(
        "Index created successfully",
        &IndexCreationResult {
            path: args.index_path.to_string_lossy().to_string(),
            documents_indexed: metadata.doc_count,
            documents_skipped: skipped,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Answer every topic of a topic file.
fn run_search(args: &SearchArgs, cli_args: &RicochetArgs) -> Result<()> {
    let config = args.apply(load_config(args.config.as_deref())?);
    let topics = TopicQuery::read_file(&args.topics_file)?;
    info!(
        "Answering {} topics from {}",
        topics.len(),
        args.topics_file.display()
    );

    // Open the index once for the whole topic file
    let k = config.result_count;
    let solver =
        QuerySolver::with_directory(config, Arc::new(FsDirectory::new(&args.index_path)))?;
    solver.initiate()?;

    let start_time = Instant::now();
    let results = topics
        .iter()
        .map(|topic| {
            Ok(TopicResult {
                query_id: topic.id.clone(),
                hits: solver.search(&topic.text, k)?,
            })
        })
        .collect::<Result<Vec<_>>>();
    let strategy = solver.expander().kind().to_string();
    // Release the index before printing, even when a topic failed
    solver.terminate();

    output_search_run(
        &SearchRun {
            strategy,
            topics: results?,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Show the metadata of an index.
fn show_stats(args: &StatsArgs, cli_args: &RicochetArgs) -> Result<()> {
    let metadata = snapshot::read_metadata(&args.index_path)?;

    output_result(
        "Index statistics",
        &IndexStats {
            path: args.index_path.to_string_lossy().to_string(),
            format_version: metadata.format_version,
            created_at: metadata.created_at.to_rfc3339(),
            doc_count: metadata.doc_count,
            fields: metadata.fields,
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn corpus(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("corpus.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"id\": \"p1\", \"text\": \"Rust ownership and borrowing\"}\n",
                "not json\n",
                "\n",
                "{\"id\": \"p2\", \"text\": \"Cooking pasta with tomatoes\"}\n",
            ),
        )
        .unwrap();
        path
    }

    fn run(args: &[&str]) -> Result<()> {
        let mut argv = vec!["ricochet", "--quiet"];
        argv.extend_from_slice(args);
        execute_command(RicochetArgs::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_index_search_and_stats() {
        let dir = TempDir::new().unwrap();
        let corpus = corpus(&dir);
        let index = dir.path().join("index");
        let topics = dir.path().join("topics.tsv");
        fs::write(&topics, "q1\tborrowing\nq2\ttomato\n").unwrap();

        let index_str = index.to_str().unwrap();
        run(&["index", index_str, corpus.to_str().unwrap()]).unwrap();
        assert_eq!(snapshot::read_metadata(&index).unwrap().doc_count, 2);

        run(&["stats", index_str]).unwrap();
        run(&["search", index_str, topics.to_str().unwrap(), "--strategy", "rm3"]).unwrap();

        // A second build needs --force.
        assert!(run(&["index", index_str, corpus.to_str().unwrap()]).is_err());
        run(&["index", index_str, corpus.to_str().unwrap(), "--force"]).unwrap();
    }

    #[test]
    fn test_missing_corpus() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("index");
        let err = run(&["index", index.to_str().unwrap(), "/nonexistent/corpus.jsonl"]).unwrap_err();
        assert!(matches!(err, RicochetError::Anyhow(_)));
    }

    #[test]
    fn test_search_missing_index() {
        let dir = TempDir::new().unwrap();
        let topics = dir.path().join("topics.tsv");
        fs::write(&topics, "q1\tanything\n").unwrap();

        let err = run(&[
            "search",
            dir.path().join("missing").to_str().unwrap(),
            topics.to_str().unwrap(),
        ])
        .unwrap_err();
        assert!(matches!(err, RicochetError::IndexUnavailable(_)));
    }
}
