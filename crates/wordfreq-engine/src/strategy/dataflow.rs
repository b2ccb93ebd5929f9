use std::ops::Range;

use rayon::prelude::*;

use crate::error::EngineError;
use crate::job::{Job, Partial, TokenFailure, combine};
use crate::merge::merge;
use crate::store::{Tally, WordStore};

/// Map sentences to tokens in parallel, fold them into per-thread stores and
/// reduce with the merge, first inside each partition and then across them.
pub(super) fn run(job: &Job<'_>) -> Result<Partial, EngineError> {
    let pool = job.pool()?;
    let partitions = job.partitions();
    pool.install(|| {
        partitions
            .into_par_iter()
            .map(|range| -> Result<Partial, EngineError> {
                let store = job.run_partition(range.clone(), |range| fold_partition(job, range))?;
                Ok(match store {
                    Some(store) => Partial::covering(store, range),
                    None => Partial::default(),
                })
            })
            .reduce(|| Ok(Partial::default()), combine)
    })
}

fn fold_partition(job: &Job<'_>, range: Range<usize>) -> Result<WordStore, EngineError> {
    range
        .clone()
        .into_par_iter()
        .map(|index| job.observe_sentence(index))
        .try_fold(WordStore::new, |mut store, tokens| {
            for (word, occurrence) in tokens? {
                store.record(word, &occurrence);
            }
            Ok::<_, TokenFailure>(store)
        })
        .try_reduce(WordStore::new, |left, right| Ok(merge(left, right)))
        .map_err(|failure| failure.into_worker_failure(range))
}
