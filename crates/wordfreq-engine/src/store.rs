//! Hash-table word stores.
//!
//! [`WordStore`] is the single-owner store every partition fills on its own.
//! [`SharedWordStore`] is the one store with interior mutability: many
//! workers write to it at once through per-record atomics. Both accept
//! occurrences through [`Tally`], so the counting loop is written once.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use wordfreq_types::{Occurrence, WordRecord, context_replaces};

/// Sink for counted occurrences.
pub trait Tally {
    /// Upsert `word`: insert with count 1, or count one more and offer the
    /// occurrence's sentence as context.
    fn record(&mut self, word: Cow<'_, str>, occurrence: &Occurrence<'_>);
}

/// Unsynchronized word → record map owned by one worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordStore {
    words: HashMap<String, WordRecord>,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.words.get(word)
    }

    pub fn records(&self) -> impl Iterator<Item = &WordRecord> + '_ {
        self.words.values()
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> u64 {
        self.words.values().map(WordRecord::count).sum()
    }

    pub(crate) fn into_map(self) -> HashMap<String, WordRecord> {
        self.words
    }

    /// Fold `incoming` into this store. On context ties the record already in
    /// `self` wins, unless `incoming_wins_ties` flips the roles.
    pub(crate) fn absorb(&mut self, incoming: WordStore, incoming_wins_ties: bool) {
        self.words.reserve(incoming.words.len());
        for (word, record) in incoming.words {
            match self.words.entry(word) {
                MapEntry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    if incoming_wins_ties {
                        let mut demoted = record;
                        std::mem::swap(existing, &mut demoted);
                        existing.absorb(demoted);
                    } else {
                        existing.absorb(record);
                    }
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
    }
}

impl Tally for WordStore {
    fn record(&mut self, word: Cow<'_, str>, occurrence: &Occurrence<'_>) {
        if let Some(existing) = self.words.get_mut(word.as_ref()) {
            existing.observe(occurrence);
            return;
        }
        let word = word.into_owned();
        let record = WordRecord::new(word.clone(), occurrence);
        self.words.insert(word, record);
    }
}

impl FromIterator<WordRecord> for WordStore {
    fn from_iter<I: IntoIterator<Item = WordRecord>>(iter: I) -> Self {
        let mut store = WordStore::new();
        for record in iter {
            let mut single = HashMap::with_capacity(1);
            single.insert(record.word().to_string(), record);
            store.absorb(WordStore { words: single }, false);
        }
        store
    }
}

/// Record whose count and context can be updated through `&self`.
///
/// This is the only state the engine writes from several threads at once.
/// The count is a plain atomic. The context sentence and its token count sit
/// together behind a mutex, with an atomic mirror of the token count so most
/// occurrences never take the lock.
#[derive(Debug)]
pub struct AtomicWordRecord {
    word: String,
    count: AtomicU64,
    first_seen: AtomicUsize,
    context_tokens: AtomicUsize,
    context: Mutex<ContextSlot>,
}

#[derive(Debug)]
struct ContextSlot {
    sentence: String,
    tokens: usize,
}

impl AtomicWordRecord {
    pub fn new(word: impl Into<String>, occurrence: &Occurrence<'_>) -> Self {
        Self {
            word: word.into(),
            count: AtomicU64::new(1),
            first_seen: AtomicUsize::new(occurrence.index),
            context_tokens: AtomicUsize::new(occurrence.tokens),
            context: Mutex::new(ContextSlot {
                sentence: occurrence.sentence.to_string(),
                tokens: occurrence.tokens,
            }),
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    fn slot(&self) -> MutexGuard<'_, ContextSlot> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the count after this occurrence was added.
    pub fn observe(&self, occurrence: &Occurrence<'_>) -> u64 {
        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        self.first_seen
            .fetch_min(occurrence.index, Ordering::AcqRel);
        // The mirror only ever improves, so a candidate that loses to it
        // loses to the slot as well.
        if context_replaces(
            occurrence.tokens,
            self.context_tokens.load(Ordering::Acquire),
        ) {
            let mut slot = self.slot();
            if context_replaces(occurrence.tokens, slot.tokens) {
                slot.sentence.clear();
                slot.sentence.push_str(occurrence.sentence);
                slot.tokens = occurrence.tokens;
                self.context_tokens
                    .store(occurrence.tokens, Ordering::Release);
            }
        }
        count
    }

    /// Copy of the current state as a plain record.
    pub fn snapshot(&self) -> WordRecord {
        let (context, tokens) = {
            let slot = self.slot();
            (slot.sentence.clone(), slot.tokens)
        };
        WordRecord::from_parts(
            self.word.clone(),
            self.count(),
            context,
            tokens,
            self.first_seen.load(Ordering::Acquire),
        )
    }

    pub fn into_record(self) -> WordRecord {
        let slot = self
            .context
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        WordRecord::from_parts(
            self.word,
            self.count.into_inner(),
            slot.sentence,
            slot.tokens,
            self.first_seen.into_inner(),
        )
    }
}

/// Concurrent word → record map shared by all workers.
///
/// Brand-new keys are inserted through DashMap's shard-locked entry API, so a
/// word is never inserted twice; existing records are updated under a shard
/// read lock with atomic increments.
#[derive(Debug, Default)]
pub struct SharedWordStore {
    words: DashMap<String, AtomicWordRecord>,
}

impl SharedWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn count_of(&self, word: &str) -> Option<u64> {
        self.words.get(word).map(|record| record.count())
    }

    pub fn snapshot(&self, word: &str) -> Option<WordRecord> {
        self.words.get(word).map(|record| record.snapshot())
    }

    /// Upsert through a shared reference.
    pub fn upsert(&self, word: Cow<'_, str>, occurrence: &Occurrence<'_>) {
        if let Some(existing) = self.words.get(word.as_ref()) {
            existing.observe(occurrence);
            return;
        }
        match self.words.entry(word.into_owned()) {
            Entry::Occupied(slot) => {
                slot.get().observe(occurrence);
            }
            Entry::Vacant(slot) => {
                let record = AtomicWordRecord::new(slot.key().clone(), occurrence);
                slot.insert(record);
            }
        }
    }

    /// Freeze the shared map into an owned store.
    pub fn into_store(self) -> WordStore {
        WordStore {
            words: self
                .words
                .into_iter()
                .map(|(word, record)| (word, record.into_record()))
                .collect(),
        }
    }
}

impl Tally for &SharedWordStore {
    fn record(&mut self, word: Cow<'_, str>, occurrence: &Occurrence<'_>) {
        self.upsert(word, occurrence);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn occ(sentence: &str, tokens: usize, index: usize) -> Occurrence<'_> {
        Occurrence {
            sentence,
            tokens,
            index,
        }
    }

    #[test]
    fn upsert_inserts_then_increments() {
        let mut store = WordStore::new();
        store.record(Cow::Borrowed("river"), &occ("ten token sentence", 10, 4));
        store.record(Cow::Borrowed("river"), &occ("tiny one", 3, 5));
        store.record(Cow::Borrowed("river"), &occ("five token one", 5, 1));
        let river = store.get("river").unwrap();
        assert_eq!(river.count(), 3);
        assert_eq!(river.context(), "five token one");
        assert_eq!(river.first_seen(), 1);
        assert_eq!(store.total_count(), 3);
    }

    #[test]
    fn absorb_can_flip_tie_break() {
        let left: WordStore = [WordRecord::from_parts("word", 1, "left", 5, 0)]
            .into_iter()
            .collect();
        let right: WordStore = [WordRecord::from_parts("word", 2, "right", 5, 1)]
            .into_iter()
            .collect();

        let mut receiver = right.clone();
        receiver.absorb(left.clone(), true);
        assert_eq!(receiver.get("word").unwrap().context(), "left");
        assert_eq!(receiver.get("word").unwrap().count(), 3);

        let mut receiver = right;
        receiver.absorb(left, false);
        assert_eq!(receiver.get("word").unwrap().context(), "right");
    }

    #[test]
    fn atomic_record_mirrors_plain_record() {
        let atomic = AtomicWordRecord::new("word", &occ("ten", 10, 3));
        atomic.observe(&occ("three", 3, 2));
        assert_eq!(atomic.observe(&occ("five", 5, 7)), 3);

        let mut plain = WordRecord::new("word", &occ("ten", 10, 3));
        plain.observe(&occ("three", 3, 2));
        plain.observe(&occ("five", 5, 7));

        assert_eq!(atomic.snapshot(), plain);
        assert_eq!(atomic.into_record(), plain);
    }

    #[test]
    fn shared_store_counts_from_many_threads() {
        let store = Arc::new(SharedWordStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let sentence = "word appears here again";
                    for i in 0..1_000 {
                        let occurrence = occ(sentence, 4, t * 1_000 + i);
                        store.upsert(Cow::Borrowed("word"), &occurrence);
                        store.upsert(Cow::Owned(format!("w{}", i % 10)), &occurrence);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.count_of("word"), Some(8_000));
        assert_eq!(store.len(), 11);
        let store = Arc::try_unwrap(store).unwrap().into_store();
        assert_eq!(store.total_count(), 16_000);
        assert_eq!(store.get("word").unwrap().first_seen(), 0);
    }

    #[test]
    fn snapshots_pair_context_with_its_token_count() {
        let record = Arc::new(AtomicWordRecord::new(
            "word",
            &occ("an opening sentence of twelve tokens that rambles on and on today", 12, 0),
        ));
        let sentences: Vec<String> = (4..12)
            .map(|tokens| vec!["word"; tokens].join(" "))
            .collect();
        thread::scope(|scope| {
            for (i, sentence) in sentences.iter().enumerate().rev() {
                let record = Arc::clone(&record);
                scope.spawn(move || {
                    for _ in 0..200 {
                        record.observe(&occ(sentence, i + 4, i + 1));
                    }
                });
            }
            for _ in 0..200 {
                let snapshot = record.snapshot();
                assert_eq!(
                    snapshot.context().split(' ').count(),
                    snapshot.context_tokens(),
                    "{snapshot:?}"
                );
            }
        });
        let settled = record.snapshot();
        assert_eq!(settled.context_tokens(), 4);
        assert_eq!(settled.count(), 1 + 8 * 200);
    }

    #[test]
    fn tally_through_shared_reference() {
        let shared = SharedWordStore::new();
        let mut tally = &shared;
        tally.record(Cow::Borrowed("word"), &occ("one two three four", 4, 0));
        tally.record(Cow::Borrowed("word"), &occ("one two three four", 4, 1));
        assert_eq!(shared.count_of("word"), Some(2));
        assert_eq!(shared.snapshot("missing"), None);
    }
}
