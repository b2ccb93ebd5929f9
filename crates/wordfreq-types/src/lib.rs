//! Shared types for the wordfreq workspace.
//!
//! [`WordRecord`] is the unit every store keeps per word: an occurrence count,
//! one exemplar sentence (the *context*), the index of the first sentence the
//! word appeared in, and two annotation fields owned by external
//! collaborators (`translation`, `known`). [`Occurrence`] describes a single
//! sighting of a word, and [`Strategy`] names the concurrency strategies the
//! engine can run.
//!
//! The context policy lives here so that every store, merger and trie agrees
//! on it: see [`context_replaces`].
//!
//! ```rust
//! use wordfreq_types::{Occurrence, Strategy, WordRecord};
//!
//! let first = Occurrence { sentence: "a long and winding road home", tokens: 6, index: 0 };
//! let mut record = WordRecord::new("winding", &first);
//! record.observe(&Occurrence { sentence: "winding down now okay", tokens: 4, index: 3 });
//! assert_eq!(record.count(), 2);
//! assert_eq!(record.context(), "winding down now okay");
//! assert_eq!("shared-map".parse::<Strategy>().unwrap(), Strategy::SharedMap);
//! ```

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Contexts with fewer tokens than this are too short to be informative.
pub const MIN_CONTEXT_TOKENS: usize = 4;

/// Default minimum word length; a token is counted when its length is
/// strictly greater than this.
pub const DEFAULT_MIN_WORD_LEN: usize = 3;

/// Decide whether a candidate context of `candidate` tokens should replace a
/// stored context of `current` tokens.
///
/// An uninformative candidate never wins. An informative candidate wins over
/// an uninformative stored context, or over a strictly longer one. Equal
/// lengths keep what is stored.
pub fn context_replaces(candidate: usize, current: usize) -> bool {
    candidate >= MIN_CONTEXT_TOKENS && (current < MIN_CONTEXT_TOKENS || candidate < current)
}

/// One sighting of a word: the sentence it occurred in, that sentence's token
/// count and the sentence's position in the document.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Occurrence<'a> {
    pub sentence: &'a str,
    pub tokens: usize,
    pub index: usize,
}

/// Counted word with its representative context.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    word: String,
    count: u64,
    context: String,
    context_tokens: usize,
    first_seen: usize,
    translation: String,
    known: bool,
}

impl WordRecord {
    /// Create a record for the first occurrence of `word`; count starts at 1.
    pub fn new(word: impl Into<String>, occurrence: &Occurrence<'_>) -> Self {
        Self {
            word: word.into(),
            count: 1,
            context: occurrence.sentence.to_string(),
            context_tokens: occurrence.tokens,
            first_seen: occurrence.index,
            translation: String::new(),
            known: false,
        }
    }

    /// Reassemble a record from parts, e.g. after concurrent counting.
    pub fn from_parts(
        word: impl Into<String>,
        count: u64,
        context: impl Into<String>,
        context_tokens: usize,
        first_seen: usize,
    ) -> Self {
        Self {
            word: word.into(),
            count,
            context: context.into(),
            context_tokens,
            first_seen,
            translation: String::new(),
            known: false,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn context_tokens(&self) -> usize {
        self.context_tokens
    }

    /// Index of the earliest sentence this word was seen in.
    pub fn first_seen(&self) -> usize {
        self.first_seen
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn is_known(&self) -> bool {
        self.known
    }

    pub fn set_translation(&mut self, translation: impl Into<String>) -> &mut Self {
        self.translation = translation.into();
        self
    }

    pub fn set_known(&mut self, known: bool) -> &mut Self {
        self.known = known;
        self
    }

    /// Count one more occurrence and offer its sentence as context.
    pub fn observe(&mut self, occurrence: &Occurrence<'_>) {
        self.count += 1;
        self.first_seen = self.first_seen.min(occurrence.index);
        self.offer_context(occurrence.sentence, occurrence.tokens);
    }

    /// Replace the stored context if the candidate is preferred.
    ///
    /// Returns whether the context changed.
    pub fn offer_context(&mut self, sentence: &str, tokens: usize) -> bool {
        if context_replaces(tokens, self.context_tokens) {
            self.context.clear();
            self.context.push_str(sentence);
            self.context_tokens = tokens;
            true
        } else {
            false
        }
    }

    /// Fold another record for the same word into this one.
    ///
    /// Counts are summed and the earliest sighting is kept. On a context tie
    /// the receiver's context stays. Annotations already present on the
    /// receiver are kept.
    pub fn absorb(&mut self, other: WordRecord) {
        debug_assert_eq!(self.word, other.word);
        self.count += other.count;
        self.first_seen = self.first_seen.min(other.first_seen);
        if context_replaces(other.context_tokens, self.context_tokens) {
            self.context = other.context;
            self.context_tokens = other.context_tokens;
        }
        if self.translation.is_empty() {
            self.translation = other.translation;
        }
        self.known |= other.known;
    }
}

impl fmt::Display for WordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {}", self.word, self.count)
    }
}

/// Concurrency strategy used to count a document.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One pass, one store.
    #[default]
    Sequential,
    /// Recursive halving with fork/join and bottom-up merges.
    DivideConquer,
    /// Partition tasks feeding a bounded merge queue.
    ProducerConsumer,
    /// One shared map mutated through per-record atomics.
    SharedMap,
    /// Declarative parallel map, fold and reduce.
    DataParallel,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Sequential,
        Strategy::DivideConquer,
        Strategy::ProducerConsumer,
        Strategy::SharedMap,
        Strategy::DataParallel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::DivideConquer => "divide-conquer",
            Strategy::ProducerConsumer => "producer-consumer",
            Strategy::SharedMap => "shared-map",
            Strategy::DataParallel => "data-parallel",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "sequential" | "seq" => Ok(Strategy::Sequential),
            "divide-conquer" | "fork-join" => Ok(Strategy::DivideConquer),
            "producer-consumer" | "futures" | "pipeline" => Ok(Strategy::ProducerConsumer),
            "shared-map" | "concurrent-map" => Ok(Strategy::SharedMap),
            "data-parallel" | "parallel-streams" => Ok(Strategy::DataParallel),
            _ => Err(ParseStrategyError(raw.to_string())),
        }
    }
}

/// Unknown strategy name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseStrategyError(pub String);

impl fmt::Display for ParseStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown strategy `{}` (expected one of: sequential, divide-conquer, producer-consumer, shared-map, data-parallel)",
            self.0
        )
    }
}

impl Error for ParseStrategyError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(sentence: &str, tokens: usize, index: usize) -> Occurrence<'_> {
        Occurrence {
            sentence,
            tokens,
            index,
        }
    }

    #[test]
    fn context_policy_prefers_shortest_informative() {
        let mut record = WordRecord::new("word", &occ("ten", 10, 0));
        record.observe(&occ("three", 3, 1));
        assert_eq!(record.context(), "ten");
        record.observe(&occ("five", 5, 2));
        assert_eq!(record.context(), "five");
        assert_eq!(record.context_tokens(), 5);
        assert_eq!(record.count(), 3);
    }

    #[test]
    fn informative_context_replaces_short_first_context() {
        let mut record = WordRecord::new("word", &occ("two", 2, 4));
        assert!(record.offer_context("seven", 7));
        assert!(!record.offer_context("nine", 9));
        assert_eq!(record.context(), "seven");
    }

    #[test]
    fn equal_length_keeps_current_context() {
        let mut record = WordRecord::new("word", &occ("first", 6, 0));
        assert!(!record.offer_context("second", 6));
        assert_eq!(record.context(), "first");
    }

    #[test]
    fn absorb_sums_counts_and_keeps_receiver_on_tie() {
        let mut left = WordRecord::from_parts("word", 3, "left side", 5, 7);
        let right = WordRecord::from_parts("word", 2, "right side", 5, 2);
        left.absorb(right);
        assert_eq!(left.count(), 5);
        assert_eq!(left.context(), "left side");
        assert_eq!(left.first_seen(), 2);

        let shorter = WordRecord::from_parts("word", 1, "short one", 4, 9);
        left.absorb(shorter);
        assert_eq!(left.count(), 6);
        assert_eq!(left.context(), "short one");
    }

    #[test]
    fn absorb_keeps_receiver_annotations() {
        let mut left = WordRecord::from_parts("word", 1, "a", 4, 0);
        left.set_translation("palabra");
        let mut right = WordRecord::from_parts("word", 1, "b", 4, 1);
        right.set_translation("mot").set_known(true);
        left.absorb(right);
        assert_eq!(left.translation(), "palabra");
        assert!(left.is_known());
    }

    #[test]
    fn parses_strategy_names_and_aliases() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!("Fork_Join".parse::<Strategy>(), Ok(Strategy::DivideConquer));
        assert_eq!("futures".parse::<Strategy>(), Ok(Strategy::ProducerConsumer));
        assert!("bogus".parse::<Strategy>().is_err());
    }

    #[test]
    fn serializes_record_fields() {
        let record = WordRecord::from_parts("fast", 2, "ran very fast today", 4, 1);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["word"], "fast");
        assert_eq!(json["count"], 2);
        assert_eq!(json["known"], false);
        assert_eq!(
            serde_json::to_value(Strategy::ProducerConsumer).unwrap(),
            "producer-consumer"
        );
    }
}
