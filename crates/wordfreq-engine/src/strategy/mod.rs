//! One executor per [`Strategy`] variant. Every executor returns the merged
//! counts together with the sentence ranges that were actually counted.

mod dataflow;
mod divide;
mod pipeline;
mod sequential;
mod shared;

use wordfreq_types::Strategy;

use crate::error::EngineError;
use crate::job::{Job, Partial};

pub(crate) fn run(strategy: Strategy, job: &Job<'_>) -> Result<Partial, EngineError> {
    match strategy {
        Strategy::Sequential => sequential::run(job),
        Strategy::DivideConquer => divide::run(job),
        Strategy::ProducerConsumer => pipeline::run(job),
        Strategy::SharedMap => shared::run(job),
        Strategy::DataParallel => dataflow::run(job),
    }
}
