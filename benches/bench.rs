//! Criterion benchmarks for Ricochet.
//!
//! Covers the expensive pieces of a query:
//! - relevance-model (RM3) expansion over a feedback pool
//! - Rocchio expansion, which re-indexes the feedback documents
//! - a full two-pass query through the solver

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use ricochet::analysis::analyzer::{Analyzer, EnglishAnalyzer};
use ricochet::config::SolverConfig;
use ricochet::engine::{
    Bm25Similarity, BooleanQuery, Document, FieldOptions, IndexSearcher, IndexWriter, MemoryIndex,
    ScoreDoc,
};
use ricochet::expansion::{
    Expander, ExpansionContext, ExpansionKind, RelevanceModel, RelevanceModelVariant, Rocchio,
};
use ricochet::query_builder::QueryBuilder;
use ricochet::solver::QuerySolver;

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let words = [
        "search",
        "engine",
        "index",
        "query",
        "document",
        "term",
        "relevance",
        "feedback",
        "expansion",
        "model",
        "probability",
        "smoothing",
        "collection",
        "vocabulary",
        "ranking",
        "retrieval",
        "passage",
        "paragraph",
        "topic",
        "judgment",
    ];

    (0..count)
        .map(|i| {
            let doc_length = 40 + (i % 60);
            (0..doc_length)
                .map(|j| words[(i * 7 + j * 13) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn build_index(analyzer: Arc<dyn Analyzer>, count: usize) -> MemoryIndex {
    let mut writer = IndexWriter::new(analyzer)
        .with_field("id", FieldOptions::keyword())
        .with_field("paragraph", FieldOptions::text_with_term_vectors());
    for (i, text) in generate_test_documents(count).into_iter().enumerate() {
        writer
            .add_document(
                Document::builder()
                    .add_text("id", format!("p{i}"))
                    .add_text("paragraph", text)
                    .build(),
            )
            .unwrap();
    }
    writer.finish()
}

fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");

    let analyzer: Arc<dyn Analyzer> = Arc::new(EnglishAnalyzer::new().unwrap());
    let index = Arc::new(build_index(analyzer.clone(), 2000));
    let searcher = IndexSearcher::new(index.clone(), Arc::new(Bm25Similarity::default()));

    let tokens = analyzer.tokenize("relevance feedback expansion").unwrap();
    let query: BooleanQuery = QueryBuilder::from_tokens("paragraph", &tokens);
    let feedback: Vec<ScoreDoc> = searcher.search(&query, 10).unwrap().score_docs;

    let ctx = ExpansionContext {
        reader: index.as_ref(),
        field: "paragraph",
        analyzer: analyzer.clone(),
    };

    let rm3 = RelevanceModel::new(RelevanceModelVariant::Rm3, 10, 20, 0.7, 0.7);
    group.bench_function("rm3_expand", |b| {
        b.iter(|| black_box(rm3.expand(&ctx, black_box(&tokens), &feedback)))
    });

    let rocchio = Rocchio::new(1.0, 0.8, 10, 20);
    group.bench_function("rocchio_expand", |b| {
        b.iter(|| black_box(rocchio.expand(&ctx, black_box(&tokens), &feedback)))
    });

    group.finish();
}

fn bench_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver");
    group.sample_size(20);

    let config = SolverConfig::default().with_strategy(ExpansionKind::Rm3);
    let analyzer = config.analyzer.build().unwrap();
    let index = build_index(analyzer.clone(), 2000);

    let solver = QuerySolver::new(
        config,
        Arc::new(ricochet::engine::RamDirectory::new(index)),
        analyzer,
    )
    .unwrap();
    solver.initiate().unwrap();

    group.bench_function("answer_query_rm3", |b| {
        b.iter(|| black_box(solver.answer_query(black_box("ranking probability model"), 10)))
    });

    group.finish();
}

criterion_group!(benches, bench_expansion, bench_solver);
criterion_main!(benches);
