use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, ValueEnum};
use tracing::warn;
use wordfreq_engine::{AnalyzerConfig, default_worker_count};
use wordfreq_types::{DEFAULT_MIN_WORD_LEN, Strategy};

use crate::document::LoadMode;

pub const DEFAULT_TOP: usize = 25;
pub const DEFAULT_BENCH_ROUNDS: usize = 3;

pub const STRATEGY_VAR: &str = "WORDFREQ_STRATEGY";
pub const WORKERS_VAR: &str = "WORDFREQ_WORKERS";
pub const MIN_LEN_VAR: &str = "WORDFREQ_MIN_LEN";
pub const LOAD_MODE_VAR: &str = "WORDFREQ_LOAD_MODE";
pub const TOP_VAR: &str = "WORDFREQ_TOP";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Flags that override environment variables and defaults.
#[derive(Args, Clone, Debug, Default)]
pub struct Flags {
    /// Concurrency strategy [env: WORDFREQ_STRATEGY]
    #[arg(long, short)]
    pub strategy: Option<Strategy>,
    /// Worker threads and partitions [env: WORDFREQ_WORKERS]
    #[arg(long, short)]
    pub workers: Option<usize>,
    /// Count words longer than this many letters [env: WORDFREQ_MIN_LEN]
    #[arg(long)]
    pub min_len: Option<usize>,
    /// `mmap` or `owned` [env: WORDFREQ_LOAD_MODE]
    #[arg(long)]
    pub load_mode: Option<LoadMode>,
    /// Rows to print [env: WORDFREQ_TOP]
    #[arg(long, short = 'n')]
    pub top: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Plain-text document to analyze
    pub path: PathBuf,
    #[command(flatten)]
    pub flags: Flags,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Whitespace-separated `surface lemma` table used to normalize words
    #[arg(long)]
    pub lemmas: Option<PathBuf>,
    /// Look words up in a trie built from the result; falls back to the
    /// nearest word sharing the suffix
    #[arg(long = "lookup", value_name = "WORD")]
    pub lookups: Vec<String>,
}

#[derive(Args, Clone, Debug)]
pub struct BenchArgs {
    /// Plain-text document to benchmark on
    pub path: PathBuf,
    #[arg(long, short)]
    pub workers: Option<usize>,
    #[arg(long)]
    pub min_len: Option<usize>,
    #[arg(long)]
    pub load_mode: Option<LoadMode>,
    /// Timed runs per strategy
    #[arg(long, default_value_t = DEFAULT_BENCH_ROUNDS)]
    pub rounds: usize,
}

impl BenchArgs {
    pub fn flags(&self) -> Flags {
        Flags {
            workers: self.workers,
            min_len: self.min_len,
            load_mode: self.load_mode,
            ..Flags::default()
        }
    }
}

/// Effective configuration after layering flags, environment and defaults.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settings {
    pub strategy: Strategy,
    pub workers: usize,
    pub min_len: usize,
    pub load_mode: LoadMode,
    pub top: usize,
}

impl Settings {
    /// Resolve against the process environment.
    pub fn from_env(flags: &Flags) -> Self {
        Self::resolve(flags, |key| env::var(key).ok())
    }

    pub fn resolve(flags: &Flags, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let strategy = flags
            .strategy
            .or_else(|| parse_var(&lookup, STRATEGY_VAR))
            .unwrap_or_default();
        let workers = flags
            .workers
            .or_else(|| parse_var::<usize>(&lookup, WORKERS_VAR).filter(|w| *w > 0))
            .unwrap_or_else(default_worker_count);
        let min_len = flags
            .min_len
            .or_else(|| parse_var(&lookup, MIN_LEN_VAR))
            .unwrap_or(DEFAULT_MIN_WORD_LEN);
        let load_mode = flags
            .load_mode
            .or_else(|| parse_var(&lookup, LOAD_MODE_VAR))
            .unwrap_or_default();
        let top = flags
            .top
            .or_else(|| parse_var(&lookup, TOP_VAR))
            .unwrap_or(DEFAULT_TOP);
        Self {
            strategy,
            workers,
            min_len,
            load_mode,
            top,
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig::default()
            .with_strategy(self.strategy)
            .with_worker_count(self.workers)
            .with_min_word_len(self.min_len)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring invalid {key}={raw}");
            None
        }
    }
}
