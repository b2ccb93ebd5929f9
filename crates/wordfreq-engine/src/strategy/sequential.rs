use crate::error::EngineError;
use crate::job::{Job, Partial};
use crate::store::WordStore;

/// Partitions in order on the calling thread, all into one store.
pub(super) fn run(job: &Job<'_>) -> Result<Partial, EngineError> {
    let mut store = WordStore::new();
    let mut covered = Vec::new();
    for range in job.partitions() {
        let counted = job.run_partition(range.clone(), |range| job.tally_range(range, &mut store))?;
        if counted.is_some() {
            covered.push(range);
        }
    }
    Ok(Partial { store, covered })
}
