use rayon::prelude::*;

use crate::error::EngineError;
use crate::job::{Job, Partial, combine};
use crate::store::SharedWordStore;

/// All workers write into one [`SharedWordStore`]; nothing is merged.
pub(super) fn run(job: &Job<'_>) -> Result<Partial, EngineError> {
    let shared = SharedWordStore::new();
    let pool = job.pool()?;
    let partitions = job.partitions();
    let covered = pool.install(|| {
        partitions
            .into_par_iter()
            .map(|range| -> Result<Partial, EngineError> {
                let counted = job.run_partition(range.clone(), |range| {
                    let mut tally = &shared;
                    job.tally_range(range, &mut tally)
                })?;
                Ok(Partial {
                    covered: counted.map(|()| range).into_iter().collect(),
                    ..Partial::default()
                })
            })
            .reduce(|| Ok(Partial::default()), combine)
    })?;
    Ok(Partial {
        store: shared.into_store(),
        covered: covered.covered,
    })
}
