//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, RicochetArgs};
use crate::error::Result;
use crate::solver::SearchHit;

/// Result structure for index creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexCreationResult {
    pub path: String,
    pub documents_indexed: u64,
    pub documents_skipped: usize,
    pub duration_ms: u64,
}

/// Ranked answers of one topic.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopicResult {
    pub query_id: String,
    pub hits: Vec<SearchHit>,
}

/// Result structure for a search run.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRun {
    pub strategy: String,
    pub topics: Vec<TopicResult>,
    pub duration_ms: u64,
}

/// Index metadata as shown by `stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStats {
    pub path: String,
    pub format_version: u32,
    pub created_at: String,
    pub doc_count: u64,
    pub fields: Vec<String>,
}

/// Print a search run.
///
/// The human format is one `query_id<TAB>rank<TAB>doc_id` line per hit, ranks
/// starting at 1.
pub fn output_search_run(run: &SearchRun, args: &RicochetArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(run, args),
        OutputFormat::Human => {
            for line in run_lines(run) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// Run-file lines of a search run.
pub fn run_lines(run: &SearchRun) -> Vec<String> {
    run.topics
        .iter()
        .flat_map(|topic| {
            topic
                .hits
                .iter()
                .enumerate()
                .map(move |(rank, hit)| format!("{}\t{}\t{}", topic.query_id, rank + 1, hit.id))
        })
        .collect()
}

/// Print a command result.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &RicochetArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format: the message, then one `key: value` line
/// per field.
fn output_human<T: Serialize>(message: &str, result: &T, args: &RicochetArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    let fields: BTreeMap<String, serde_json::Value> = match value {
        serde_json::Value::Object(obj) => obj.into_iter().collect(),
        other => {
            println!("{other}");
            return Ok(());
        }
    };
    for (key, value) in fields {
        match value {
            serde_json::Value::String(s) => println!("{key}: {s}"),
            serde_json::Value::Array(items) => {
                let items: Vec<String> = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect();
                println!("{key}: {}", items.join(", "));
            }
            other => println!("{key}: {other}"),
        }
    }
    Ok(())
}

fn output_json<T: Serialize>(result: &T, args: &RicochetArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}
