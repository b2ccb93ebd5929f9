//! Library side of the `wordfreq` binary: configuration layering, document
//! loading, lemma tables, report rendering and the strategy benchmark.

pub mod bench;
pub mod config;
pub mod document;
pub mod lemmas;
pub mod report;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use wordfreq_engine::{Analyzer, DocumentStats, sentences_of};

pub use bench::{BenchRow, run_strategies, write_rows};
pub use config::{AnalyzeArgs, BenchArgs, Flags, OutputFormat, Settings};
pub use document::{Document, LoadMode};
pub use lemmas::load_lemmas;
pub use report::{Lookup, Report, Row};

/// Load, count and summarize one document.
pub fn analyze_file(
    path: &Path,
    settings: &Settings,
    lemmas: Option<&Path>,
    lookups: &[String],
) -> Result<Report> {
    let start = Instant::now();
    let document = Document::load(path, settings.load_mode)
        .with_context(|| format!("loading document {}", path.display()))?;
    let text = document.text();
    info!(
        "loaded {} bytes from {} ({}) in {} ms",
        document.len(),
        path.display(),
        settings.load_mode,
        start.elapsed().as_millis()
    );

    let mut analyzer = Analyzer::new(settings.analyzer_config());
    if let Some(lemma_path) = lemmas {
        let table = load_lemmas(lemma_path)?;
        info!("loaded {} lemma mappings from {}", table.len(), lemma_path.display());
        analyzer = analyzer.with_normalizer(table);
    }

    let sentences: Vec<&str> = sentences_of(&text).collect();
    let analysis = analyzer.analyze_sentences(&sentences)?;
    info!(
        "counted {} words ({} distinct) with {} in {} ms",
        analysis.table().total_count(),
        analysis.table().len(),
        analysis.strategy(),
        analysis.elapsed().as_millis()
    );

    let mut report = Report::new(
        path.display().to_string(),
        settings.workers,
        &analysis,
        DocumentStats::of(&text),
        settings.top,
    );
    if !lookups.is_empty() {
        let trie = analysis.into_table().into_trie();
        report.lookups = lookups
            .iter()
            .map(|query| Lookup::resolve(&trie, query))
            .collect();
    }
    Ok(report)
}

/// Load one document and benchmark every strategy on it.
pub fn bench_file(path: &Path, settings: &Settings, rounds: usize) -> Result<Vec<BenchRow>> {
    let document = Document::load(path, settings.load_mode)
        .with_context(|| format!("loading document {}", path.display()))?;
    let text = document.text();
    let sentences: Vec<&str> = sentences_of(&text).collect();
    info!(
        "benchmarking {} sentences with {} workers, {} rounds",
        sentences.len(),
        settings.workers,
        rounds
    );
    run_strategies(&Analyzer::new(settings.analyzer_config()), &sentences, rounds)
}
