use std::any::Any;
use std::borrow::Cow;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};
use wordfreq_types::Occurrence;

use crate::analyzer::default_worker_count;
use crate::cancel::CancelToken;
use crate::error::EngineError;
use crate::merge::merge;
use crate::normalizer::{NormalizeError, Normalizer};
use crate::partition::partition;
use crate::store::{Tally, WordStore};
use crate::tokenizer::{Tokenizer, context_tokens};

/// Everything a strategy needs to count one document.
pub(crate) struct Job<'a> {
    pub sentences: &'a [&'a str],
    pub tokenizer: Tokenizer,
    pub normalizer: &'a dyn Normalizer,
    pub cancel: &'a CancelToken,
    pub worker_count: usize,
}

/// Counts from some partitions, and the sentence ranges they came from.
#[derive(Debug, Default)]
pub(crate) struct Partial {
    pub store: WordStore,
    pub covered: Vec<Range<usize>>,
}

impl Partial {
    pub fn covering(store: WordStore, range: Range<usize>) -> Self {
        Self {
            store,
            covered: vec![range],
        }
    }

    pub fn merge(mut self, other: Partial) -> Partial {
        self.covered.extend(other.covered);
        Partial {
            store: merge(self.store, other.store),
            covered: self.covered,
        }
    }
}

/// Combine two partition outcomes; with two failures the lower range wins.
pub(crate) fn combine(
    left: Result<Partial, EngineError>,
    right: Result<Partial, EngineError>,
) -> Result<Partial, EngineError> {
    match (left, right) {
        (Ok(left), Ok(right)) => Ok(left.merge(right)),
        (Err(left), Err(right)) => Err(left.earliest(right)),
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => Err(err),
    }
}

/// A normalizer failure on one token, before it is tied to a partition.
#[derive(Debug)]
pub(crate) struct TokenFailure {
    token: String,
    source: NormalizeError,
}

impl TokenFailure {
    pub fn into_worker_failure(self, range: Range<usize>) -> EngineError {
        EngineError::worker(
            range,
            format!("normalizer rejected `{}`: {}", self.token, self.source),
        )
    }
}

impl<'a> Job<'a> {
    pub fn partitions(&self) -> Vec<Range<usize>> {
        let ranges = partition(self.sentences.len(), self.worker_count);
        debug!(
            sentences = self.sentences.len(),
            workers = self.worker_count,
            partitions = ranges.len(),
            "partition plan"
        );
        ranges
    }

    /// Pool for this job. `worker_count` sets the partition plan; threads
    /// are capped at the hardware parallelism.
    pub fn pool(&self) -> Result<ThreadPool, EngineError> {
        let threads = self.worker_count.clamp(1, default_worker_count());
        debug!(threads, workers = self.worker_count, "building worker pool");
        Ok(ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("wordfreq-worker-{i}"))
            .build()?)
    }

    fn occurrence(&self, index: usize) -> Occurrence<'a> {
        let sentence = self.sentences[index];
        Occurrence {
            sentence,
            tokens: context_tokens(sentence),
            index,
        }
    }

    /// Count every qualifying token of `range` into `tally`.
    pub fn tally_range<T: Tally>(
        &self,
        range: Range<usize>,
        tally: &mut T,
    ) -> Result<(), EngineError> {
        for index in range.clone() {
            let occurrence = self.occurrence(index);
            for token in self.tokenizer.words_of(occurrence.sentence) {
                let word = self
                    .normalize(token)
                    .map_err(|failure| failure.into_worker_failure(range.clone()))?;
                if let Some(word) = word {
                    tally.record(word, &occurrence);
                }
            }
        }
        Ok(())
    }

    /// Normalized tokens of one sentence, each paired with its occurrence.
    pub fn observe_sentence(
        &self,
        index: usize,
    ) -> Result<Vec<(Cow<'a, str>, Occurrence<'a>)>, TokenFailure> {
        let occurrence = self.occurrence(index);
        self.tokenizer
            .words_of(occurrence.sentence)
            .filter_map(|token| self.normalize(token).transpose())
            .map(|word| word.map(|word| (word, occurrence)))
            .collect()
    }

    /// `None` drops the token.
    fn normalize(&self, token: Cow<'a, str>) -> Result<Option<Cow<'a, str>>, TokenFailure> {
        let replacement = match self.normalizer.normalize(&token) {
            Ok(Cow::Borrowed(same)) if same == token.as_ref() => None,
            Ok(other) => Some(other.into_owned()),
            Err(source) => {
                return Err(TokenFailure {
                    token: token.to_string(),
                    source,
                });
            }
        };
        Ok(match replacement {
            None => Some(token),
            Some(word) if word.is_empty() => None,
            Some(word) => Some(Cow::Owned(word)),
        })
    }

    /// Run `work` over one partition unless the job was cancelled.
    ///
    /// A panic inside `work` is caught and reported against `range`.
    pub fn run_partition<T, F>(&self, range: Range<usize>, work: F) -> Result<Option<T>, EngineError>
    where
        F: FnOnce(Range<usize>) -> Result<T, EngineError>,
    {
        if self.cancel.is_cancelled() {
            debug!(start = range.start, end = range.end, "skipping cancelled partition");
            return Ok(None);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| work(range.clone()))) {
            Ok(outcome) => outcome.map(Some),
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!(start = range.start, end = range.end, %reason, "partition panicked");
                Err(EngineError::worker(range, format!("panicked: {reason}")))
            }
        }
    }

    /// Count one partition into a fresh store.
    pub fn count_partition(&self, range: Range<usize>) -> Result<Partial, EngineError> {
        self.run_partition(range.clone(), |range| {
            let mut store = WordStore::new();
            self.tally_range(range, &mut store)?;
            Ok(store)
        })
        .map(|store| match store {
            Some(store) => Partial::covering(store, range),
            None => Partial::default(),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
