use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;
use std::time::Duration;

use bitvec::prelude::*;
use wordfreq_trie::TernaryTrie;
use wordfreq_types::{MIN_CONTEXT_TOKENS, Strategy, WordRecord};

use crate::store::WordStore;

/// Which sentences of the input contributed to a result.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Coverage {
    bits: BitVec<usize, Lsb0>,
}

impl Coverage {
    /// Coverage over `sentence_count` sentences, none of them covered yet.
    pub fn new(sentence_count: usize) -> Self {
        Self {
            bits: bitvec![usize, Lsb0; 0; sentence_count],
        }
    }

    pub fn full(sentence_count: usize) -> Self {
        Self {
            bits: bitvec![usize, Lsb0; 1; sentence_count],
        }
    }

    pub fn mark(&mut self, range: Range<usize>) {
        self.bits[range].fill(true);
    }

    pub fn is_complete(&self) -> bool {
        self.bits.all()
    }

    pub fn covered(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn total(&self) -> usize {
        self.bits.len()
    }

    pub fn contains(&self, sentence: usize) -> bool {
        self.bits.get(sentence).is_some_and(|bit| *bit)
    }

    /// Maximal runs of sentences that were not counted.
    pub fn missing_ranges(&self) -> Vec<Range<usize>> {
        let mut missing = Vec::new();
        let mut start = None;
        for (index, bit) in self.bits.iter().by_vals().enumerate() {
            match (bit, start) {
                (false, None) => start = Some(index),
                (true, Some(from)) => {
                    missing.push(from..index);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(from) = start {
            missing.push(from..self.bits.len());
        }
        missing
    }
}

/// Final word → record mapping of one analysis. Unordered; use
/// [`FrequencyTable::ranked`] for presentation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    words: HashMap<String, WordRecord>,
}

impl From<WordStore> for FrequencyTable {
    fn from(store: WordStore) -> Self {
        Self {
            words: store.into_map(),
        }
    }
}

impl FrequencyTable {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.words.get(word)
    }

    pub fn get_mut(&mut self, word: &str) -> Option<&mut WordRecord> {
        self.words.get_mut(word)
    }

    pub fn count_of(&self, word: &str) -> u64 {
        self.words.get(word).map_or(0, WordRecord::count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordRecord> + '_ {
        self.words.values()
    }

    /// Number of counted token occurrences.
    pub fn total_count(&self) -> u64 {
        self.words.values().map(WordRecord::count).sum()
    }

    /// Records by count descending, then first sighting, then word.
    pub fn ranked(&self) -> Vec<&WordRecord> {
        let mut rows: Vec<&WordRecord> = self.words.values().collect();
        rows.sort_unstable_by(|a, b| rank(a, b));
        rows
    }

    pub fn top(&self, n: usize) -> Vec<&WordRecord> {
        let mut rows = self.ranked();
        rows.truncate(n);
        rows
    }

    /// Word → count projection.
    pub fn counts(&self) -> HashMap<&str, u64> {
        self.words
            .iter()
            .map(|(word, record)| (word.as_str(), record.count()))
            .collect()
    }

    /// Same words with the same counts, and the same context length wherever
    /// an informative context exists.
    ///
    /// Which of several equally short sentences ends up as the context depends
    /// on merge order, so only context lengths are compared.
    pub fn equivalent(&self, other: &FrequencyTable) -> bool {
        self.len() == other.len()
            && self.words.iter().all(|(word, mine)| {
                other.words.get(word).is_some_and(|theirs| {
                    mine.count() == theirs.count()
                        && same_context_length(mine.context_tokens(), theirs.context_tokens())
                })
            })
    }

    /// Load every record into a trie.
    pub fn to_trie(&self) -> TernaryTrie {
        self.words.values().cloned().collect()
    }

    pub fn into_trie(self) -> TernaryTrie {
        self.words.into_values().collect()
    }

    pub fn into_records(self) -> Vec<WordRecord> {
        self.words.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = &'a WordRecord;
    type IntoIter = std::collections::hash_map::Values<'a, String, WordRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.values()
    }
}

fn rank(a: &WordRecord, b: &WordRecord) -> Ordering {
    b.count()
        .cmp(&a.count())
        .then_with(|| a.first_seen().cmp(&b.first_seen()))
        .then_with(|| a.word().cmp(b.word()))
}

fn same_context_length(a: usize, b: usize) -> bool {
    if a >= MIN_CONTEXT_TOKENS || b >= MIN_CONTEXT_TOKENS {
        a == b
    } else {
        true
    }
}

/// Result of running one strategy over one document.
#[derive(Clone, Debug)]
pub struct Analysis {
    table: FrequencyTable,
    coverage: Coverage,
    strategy: Strategy,
    elapsed: Duration,
}

impl Analysis {
    pub(crate) fn new(
        table: FrequencyTable,
        coverage: Coverage,
        strategy: Strategy,
        elapsed: Duration,
    ) -> Self {
        Self {
            table,
            coverage,
            strategy,
            elapsed,
        }
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut FrequencyTable {
        &mut self.table
    }

    pub fn into_table(self) -> FrequencyTable {
        self.table
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// False when cancellation left some sentences uncounted.
    pub fn is_complete(&self) -> bool {
        self.coverage.is_complete()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Wall time spent counting, excluding sentence splitting.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(records: &[(&str, u64, usize, usize)]) -> FrequencyTable {
        let store: WordStore = records
            .iter()
            .map(|&(word, count, tokens, first)| {
                WordRecord::from_parts(word, count, format!("{word} context"), tokens, first)
            })
            .collect();
        FrequencyTable::from(store)
    }

    #[test]
    fn ranks_by_count_then_first_seen_then_word() {
        let table = table(&[
            ("delta", 2, 4, 5),
            ("alpha", 5, 4, 9),
            ("charlie", 2, 4, 1),
            ("bravo", 2, 4, 1),
        ]);
        let words: Vec<&str> = table.ranked().iter().map(|r| r.word()).collect();
        assert_eq!(words, vec!["alpha", "bravo", "charlie", "delta"]);
        assert_eq!(table.top(2).len(), 2);
        assert_eq!(table.total_count(), 11);
        assert_eq!(table.count_of("missing"), 0);
    }

    #[test]
    fn equivalence_ignores_uninformative_context_lengths() {
        let a = table(&[("word", 2, 2, 0), ("other", 1, 5, 0)]);
        let b = table(&[("word", 2, 3, 1), ("other", 1, 5, 0)]);
        let c = table(&[("word", 2, 3, 1), ("other", 1, 6, 0)]);
        let d = table(&[("word", 3, 2, 0), ("other", 1, 5, 0)]);
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&c));
        assert!(!a.equivalent(&d));
    }

    #[test]
    fn coverage_tracks_missing_runs() {
        let mut coverage = Coverage::new(10);
        coverage.mark(0..3);
        coverage.mark(6..8);
        assert!(!coverage.is_complete());
        assert_eq!(coverage.covered(), 5);
        assert!(coverage.contains(7));
        assert!(!coverage.contains(42));
        assert_eq!(coverage.missing_ranges(), vec![3..6, 8..10]);
        coverage.mark(3..6);
        coverage.mark(8..10);
        assert!(coverage.is_complete());
        assert!(Coverage::new(0).is_complete());
        assert_eq!(Coverage::full(4).covered(), 4);
    }

    #[test]
    fn converts_into_trie() {
        let table = table(&[("taste", 1, 4, 0), ("task", 2, 4, 1)]);
        let trie = table.to_trie();
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get_exact("task").unwrap().count(), 2);
        assert_eq!(table.into_trie().len(), 2);
    }
}
