use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use wordfreq_engine::{Analyzer, AnalyzerConfig, Strategy, sentences_of};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .context("usage: cargo run -p wordfreq-engine --example compare -- <text-file> [workers]")?;
    let workers = match env::args().nth(2) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid worker count `{raw}`"))?,
        None => wordfreq_engine::default_worker_count(),
    };

    let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let sentences: Vec<&str> = sentences_of(&text).collect();
    let analyzer = Analyzer::new(AnalyzerConfig::default().with_worker_count(workers));

    println!("{} sentences, {} workers", sentences.len(), workers);
    let baseline = analyzer.count(Strategy::Sequential, &sentences)?;
    for strategy in Strategy::ALL {
        let analysis = analyzer.count(strategy, &sentences)?;
        if !analysis.table().equivalent(baseline.table()) {
            bail!("{strategy} disagrees with the sequential baseline");
        }
        println!(
            "{:<18} {:>8} words {:>10.2?}",
            strategy.as_str(),
            analysis.table().len(),
            analysis.elapsed()
        );
    }

    for record in baseline.table().top(10) {
        println!("{record}  [{}]", record.context());
    }
    Ok(())
}
