use std::ops::Range;

use tracing::debug;

use crate::error::EngineError;
use crate::job::{Job, Partial, combine};
use crate::partition::chunk_size;

/// Halve the sentence range until it fits a partition, count the leaves on
/// the pool and merge siblings on the way back up.
pub(super) fn run(job: &Job<'_>) -> Result<Partial, EngineError> {
    let threshold = chunk_size(job.sentences.len(), job.worker_count).max(1);
    debug!(threshold, "fork/join split threshold");
    let pool = job.pool()?;
    pool.install(|| split(job, 0..job.sentences.len(), threshold))
}

fn split(job: &Job<'_>, range: Range<usize>, threshold: usize) -> Result<Partial, EngineError> {
    if range.len() <= threshold {
        return job.count_partition(range);
    }
    let mid = range.start + range.len() / 2;
    let (left, right) = rayon::join(
        || split(job, range.start..mid, threshold),
        || split(job, mid..range.end, threshold),
    );
    combine(left, right)
}
