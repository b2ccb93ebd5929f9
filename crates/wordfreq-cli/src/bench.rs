use std::io::Write;
use std::time::Duration;

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::info;
use wordfreq_engine::Analyzer;
use wordfreq_types::Strategy;

#[derive(Clone, Debug, Serialize)]
pub struct BenchRow {
    pub strategy: Strategy,
    pub rounds: usize,
    pub best: Duration,
    pub mean: Duration,
    pub distinct_words: usize,
}

/// Time every strategy on the same sentences. Fails when any strategy
/// disagrees with the sequential baseline or does not finish.
pub fn run_strategies(
    analyzer: &Analyzer,
    sentences: &[&str],
    rounds: usize,
) -> Result<Vec<BenchRow>> {
    let rounds = rounds.max(1);
    let baseline = analyzer.count(Strategy::Sequential, sentences)?;
    let mut rows = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let mut timings = Vec::with_capacity(rounds);
        let mut distinct_words = 0;
        for _ in 0..rounds {
            let analysis = analyzer.count(strategy, sentences)?;
            if !analysis.is_complete() {
                bail!("{strategy} did not cover every sentence");
            }
            if !analysis.table().equivalent(baseline.table()) {
                bail!("{strategy} disagrees with the sequential baseline");
            }
            distinct_words = analysis.table().len();
            timings.push(analysis.elapsed());
        }
        let best = timings.iter().copied().min().unwrap_or_default();
        let mean = timings.iter().sum::<Duration>() / rounds as u32;
        info!(%strategy, ?best, ?mean, "benchmarked");
        rows.push(BenchRow {
            strategy,
            rounds,
            best,
            mean,
            distinct_words,
        });
    }
    Ok(rows)
}

pub fn write_rows(rows: &[BenchRow], out: &mut impl Write) -> Result<()> {
    writeln!(out, "{:<18} {:>12} {:>12} {:>8}", "strategy", "best", "mean", "words")?;
    for row in rows {
        writeln!(
            out,
            "{:<18} {:>12.3?} {:>12.3?} {:>8}",
            row.strategy.as_str(),
            row.best,
            row.mean,
            row.distinct_words
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use wordfreq_engine::AnalyzerConfig;

    use super::*;

    #[test]
    fn benchmarks_every_strategy() {
        let sentences = ["Harbor lights glow", "Harbor bells ring", "Quiet harbor"];
        let analyzer = Analyzer::new(AnalyzerConfig::default().with_worker_count(2));
        let rows = run_strategies(&analyzer, &sentences, 2).unwrap();
        assert_eq!(rows.len(), Strategy::ALL.len());
        assert!(rows.iter().all(|row| row.distinct_words == 6 && row.rounds == 2));

        let mut out = Vec::new();
        write_rows(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("producer-consumer"));
    }
}
