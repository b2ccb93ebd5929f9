use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("worker failed on sentences {}..{}: {reason}", .range.start, .range.end)]
    WorkerFailure { range: Range<usize>, reason: String },
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl EngineError {
    pub(crate) fn worker(range: Range<usize>, reason: impl Into<String>) -> Self {
        EngineError::WorkerFailure {
            range,
            reason: reason.into(),
        }
    }

    /// Sentence range of a worker failure.
    pub fn range(&self) -> Option<&Range<usize>> {
        match self {
            EngineError::WorkerFailure { range, .. } => Some(range),
            EngineError::Pool(_) => None,
        }
    }

    /// Keep whichever failure names the lower partition.
    pub(crate) fn earliest(self, other: EngineError) -> EngineError {
        match (self.range().map(|r| r.start), other.range().map(|r| r.start)) {
            (Some(a), Some(b)) if b < a => other,
            (None, Some(_)) => other,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_lowest_failing_range() {
        let late = EngineError::worker(10..20, "late");
        let early = EngineError::worker(0..10, "early");
        let kept = late.earliest(early);
        assert_eq!(kept.range(), Some(&(0..10)));
        assert_eq!(kept.to_string(), "worker failed on sentences 0..10: early");
    }
}
