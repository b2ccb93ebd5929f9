use std::ops::Range;

/// Sentences per partition for `worker_count` workers; zero workers act as one.
pub fn chunk_size(sentence_count: usize, worker_count: usize) -> usize {
    sentence_count.div_ceil(worker_count.max(1))
}

/// Split `[0, sentence_count)` into contiguous ranges of [`chunk_size`]
/// sentences. The last range may be shorter; no sentences means no ranges.
pub fn partition(sentence_count: usize, worker_count: usize) -> Vec<Range<usize>> {
    let chunk = chunk_size(sentence_count, worker_count).max(1);
    (0..sentence_count)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(sentence_count))
        .collect()
}

#[cfg(test)]
mod tests {
    use bitvec::prelude::*;

    use super::*;

    #[test]
    fn ranges_cover_input_exactly_once() {
        for n in 0..64 {
            for workers in 0..12 {
                let ranges = partition(n, workers);
                let mut seen = bitvec![0; n];
                let mut next = 0;
                for range in &ranges {
                    assert_eq!(range.start, next, "n={n} workers={workers}");
                    assert!(!range.is_empty());
                    for i in range.clone() {
                        assert!(!seen[i]);
                        seen.set(i, true);
                    }
                    next = range.end;
                }
                assert!(seen.all(), "n={n} workers={workers}");
                assert!(ranges.len() <= workers.max(1));
            }
        }
    }

    #[test]
    fn last_range_may_be_shorter() {
        assert_eq!(partition(10, 4), vec![0..3, 3..6, 6..9, 9..10]);
        assert_eq!(partition(3, 8), vec![0..1, 1..2, 2..3]);
        assert_eq!(partition(5, 0), vec![0..5]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn chunk_size_rounds_up() {
        assert_eq!(chunk_size(10, 4), 3);
        assert_eq!(chunk_size(8, 4), 2);
        assert_eq!(chunk_size(0, 4), 0);
        assert_eq!(chunk_size(7, 0), 7);
    }
}
