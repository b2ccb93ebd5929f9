use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use wordfreq_engine::{Analysis, DocumentStats, TernaryTrie};
use wordfreq_types::{Strategy, WordRecord};

/// Everything printed for one analyzed document.
#[derive(Debug, Serialize)]
pub struct Report {
    pub path: String,
    pub strategy: Strategy,
    pub workers: usize,
    pub sentences: usize,
    pub complete: bool,
    pub elapsed_ms: f64,
    pub distinct_words: usize,
    pub counted_words: u64,
    pub stats: DocumentStats,
    pub flesch: Option<f64>,
    pub top: Vec<Row>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lookups: Vec<Lookup>,
}

#[derive(Debug, Serialize)]
pub struct Row {
    pub rank: usize,
    #[serde(flatten)]
    pub record: WordRecord,
}

#[derive(Debug, Serialize)]
pub struct Lookup {
    pub query: String,
    pub exact: bool,
    pub word: Option<String>,
    pub count: Option<u64>,
}

impl Lookup {
    pub fn resolve(trie: &TernaryTrie, query: &str) -> Self {
        let query = query.to_ascii_lowercase();
        let exact = trie.get_exact(&query);
        let found = exact.or_else(|| trie.get(&query));
        Self {
            exact: exact.is_some(),
            word: found.map(|record| record.word().to_string()),
            count: found.map(WordRecord::count),
            query,
        }
    }
}

impl Report {
    pub fn new(
        path: String,
        workers: usize,
        analysis: &Analysis,
        stats: DocumentStats,
        top: usize,
    ) -> Self {
        let table = analysis.table();
        Self {
            path,
            strategy: analysis.strategy(),
            workers,
            sentences: analysis.coverage().total(),
            complete: analysis.is_complete(),
            elapsed_ms: analysis.elapsed().as_secs_f64() * 1000.0,
            distinct_words: table.len(),
            counted_words: table.total_count(),
            stats,
            flesch: stats.flesch_score(),
            top: table
                .top(top)
                .into_iter()
                .enumerate()
                .map(|(i, record)| Row {
                    rank: i + 1,
                    record: record.clone(),
                })
                .collect(),
            lookups: Vec::new(),
        }
    }

    pub fn write_json(&self, out: &mut impl Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }

    pub fn write_text(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "document   {}", self.path)?;
        writeln!(
            out,
            "strategy   {} ({} workers, {:.2} ms)",
            self.strategy, self.workers, self.elapsed_ms
        )?;
        writeln!(
            out,
            "sentences  {}{}",
            self.sentences,
            if self.complete { "" } else { " (incomplete)" }
        )?;
        writeln!(
            out,
            "words      {} counted, {} distinct",
            self.counted_words, self.distinct_words
        )?;
        match self.flesch {
            Some(score) => writeln!(out, "flesch     {score:.1}")?,
            None => writeln!(out, "flesch     n/a")?,
        }
        writeln!(out)?;
        for row in &self.top {
            writeln!(
                out,
                "{:>4}  {:<20} {:>8}  {}",
                row.rank,
                row.record.word(),
                row.record.count(),
                row.record.context()
            )?;
        }
        if !self.lookups.is_empty() {
            writeln!(out)?;
        }
        for lookup in &self.lookups {
            match (&lookup.word, lookup.count) {
                (Some(word), Some(count)) if lookup.exact => {
                    writeln!(out, "lookup {:<14} {word} :: {count}", lookup.query)?
                }
                (Some(word), Some(count)) => {
                    writeln!(out, "lookup {:<14} ~{word} :: {count}", lookup.query)?
                }
                _ => writeln!(out, "lookup {:<14} not found", lookup.query)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wordfreq_engine::{Analyzer, AnalyzerConfig};

    use super::*;

    fn report() -> Report {
        let text = "The harbor lights glow. The harbor sleeps tonight. Lights fade.";
        let analysis = Analyzer::new(AnalyzerConfig::default().with_worker_count(2))
            .analyze(text)
            .unwrap();
        let trie = analysis.table().to_trie();
        let mut report = Report::new("doc.txt".into(), 2, &analysis, DocumentStats::of(text), 2);
        report.lookups = vec![
            Lookup::resolve(&trie, "Harbor"),
            Lookup::resolve(&trie, "zzz"),
        ];
        report
    }

    #[test]
    fn text_lists_ranked_rows() {
        let mut out = Vec::new();
        report().write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("strategy   sequential (2 workers"));
        assert!(text.contains("sentences  3\n"));
        let harbor = text.find("harbor").unwrap();
        let lights = text.find("lights").unwrap();
        assert!(harbor < lights, "{text}");
        assert!(!text.contains("tonight "), "only two rows expected:\n{text}");
        assert!(text.contains("lookup harbor"));
        assert!(text.contains("not found"));
    }

    #[test]
    fn json_carries_records_and_scores() {
        let mut out = Vec::new();
        report().write_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["strategy"], "sequential");
        assert_eq!(json["top"][0]["rank"], 1);
        assert_eq!(json["top"][0]["word"], "harbor");
        assert_eq!(json["top"][0]["count"], 2);
        assert_eq!(json["top"][0]["context"], "The harbor lights glow");
        assert!(json["flesch"].is_number());
        assert_eq!(json["lookups"][0]["exact"], true);
        assert_eq!(json["lookups"][1]["word"], serde_json::Value::Null);
    }
}
