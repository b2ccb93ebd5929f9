use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, warn};
use wordfreq_types::{DEFAULT_MIN_WORD_LEN, Strategy};

use crate::cancel::CancelToken;
use crate::error::EngineError;
use crate::job::Job;
use crate::normalizer::{Identity, Normalizer};
use crate::strategy;
use crate::table::{Analysis, Coverage, FrequencyTable};
use crate::tokenizer::{Tokenizer, sentences_of};

/// Worker count used when none is configured.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnalyzerConfig {
    /// Tokens are counted when longer than this.
    pub min_word_len: usize,
    /// Partition count, and pool size up to the hardware parallelism; zero
    /// acts as one.
    pub worker_count: usize,
    pub strategy: Strategy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_word_len: DEFAULT_MIN_WORD_LEN,
            worker_count: default_worker_count(),
            strategy: Strategy::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn with_min_word_len(mut self, min_word_len: usize) -> Self {
        self.min_word_len = min_word_len;
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Counts word frequencies in documents with a configured strategy.
///
/// ```rust
/// use wordfreq_engine::{Analyzer, AnalyzerConfig, Strategy};
///
/// let config = AnalyzerConfig::default()
///     .with_strategy(Strategy::DivideConquer)
///     .with_worker_count(4);
/// let analysis = Analyzer::new(config)
///     .analyze("The cat sat. The cat ran fast.")
///     .unwrap();
/// assert!(analysis.is_complete());
/// assert_eq!(analysis.table().count_of("fast"), 1);
/// assert_eq!(analysis.table().len(), 1);
/// ```
#[derive(Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    normalizer: Arc<dyn Normalizer>,
    cancel: CancelToken,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            normalizer: Arc::new(Identity),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the default identity normalizer.
    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Token observed by running analyses; cancel it to stop before the next
    /// partition starts.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn analyze(&self, text: &str) -> Result<Analysis, EngineError> {
        let sentences: Vec<&str> = sentences_of(text).collect();
        self.analyze_sentences(&sentences)
    }

    /// Count pre-split sentences with the configured strategy.
    pub fn analyze_sentences(&self, sentences: &[&str]) -> Result<Analysis, EngineError> {
        self.count(self.config.strategy, sentences)
    }

    /// Count pre-split sentences with an explicit strategy.
    pub fn count(&self, strategy: Strategy, sentences: &[&str]) -> Result<Analysis, EngineError> {
        let started = Instant::now();
        if sentences.is_empty() {
            debug!(%strategy, "empty input");
            return Ok(Analysis::new(
                FrequencyTable::default(),
                Coverage::new(0),
                strategy,
                started.elapsed(),
            ));
        }

        let job = Job {
            sentences,
            tokenizer: Tokenizer::new(self.config.min_word_len),
            normalizer: &*self.normalizer,
            cancel: &self.cancel,
            worker_count: self.config.worker_count.max(1),
        };
        let partial = strategy::run(strategy, &job).inspect_err(|err| {
            warn!(%strategy, error = %err, "analysis failed");
        })?;

        let mut coverage = Coverage::new(sentences.len());
        for range in partial.covered {
            coverage.mark(range);
        }
        if !coverage.is_complete() {
            warn!(
                %strategy,
                covered = coverage.covered(),
                total = coverage.total(),
                "analysis cancelled before all sentences were counted"
            );
        }

        let table = FrequencyTable::from(partial.store);
        let elapsed = started.elapsed();
        debug!(
            %strategy,
            words = table.len(),
            tokens = table.total_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "analysis finished"
        );
        Ok(Analysis::new(table, coverage, strategy, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builders_override_defaults() {
        let config = AnalyzerConfig::default()
            .with_min_word_len(5)
            .with_worker_count(0)
            .with_strategy(Strategy::SharedMap);
        assert_eq!(config.min_word_len, 5);
        assert_eq!(config.worker_count, 0);
        assert_eq!(config.strategy, Strategy::SharedMap);
        assert!(AnalyzerConfig::default().worker_count >= 1);
    }

    #[test]
    fn whitespace_input_is_an_empty_complete_analysis() {
        let analysis = Analyzer::default().analyze("  \n\t ").unwrap();
        assert!(analysis.is_complete());
        assert!(analysis.table().is_empty());
        assert_eq!(analysis.coverage().total(), 0);
    }

    #[test]
    fn zero_workers_still_counts() {
        let config = AnalyzerConfig::default()
            .with_worker_count(0)
            .with_strategy(Strategy::ProducerConsumer);
        let analysis = Analyzer::new(config)
            .analyze("Counting words works. Words count.")
            .unwrap();
        assert_eq!(analysis.table().count_of("words"), 2);
        assert_eq!(analysis.table().count_of("count"), 1);
        assert_eq!(analysis.strategy(), Strategy::ProducerConsumer);
    }
}
