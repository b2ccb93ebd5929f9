//! Word frequency engine.
//!
//! Splits a document into sentences and sentences into words, counts every
//! word longer than a minimum length and keeps one representative sentence
//! per word. Counting can run under five [`Strategy`] variants that share the
//! tokenizer, partitioner and merge, and all of them produce equivalent
//! [`FrequencyTable`]s.
//!
//! ```rust
//! use wordfreq_engine::{Analyzer, AnalyzerConfig, Strategy};
//!
//! let text = "The river runs. The river bends near the old mill. Rivers flow.";
//! for strategy in Strategy::ALL {
//!     let analysis = Analyzer::new(AnalyzerConfig::default().with_strategy(strategy))
//!         .analyze(text)
//!         .unwrap();
//!     let top = analysis.table().ranked();
//!     assert_eq!(top[0].word(), "river");
//!     assert_eq!(top[0].count(), 2);
//! }
//! ```

mod analyzer;
mod cancel;
mod error;
mod job;
mod merge;
mod normalizer;
mod partition;
mod readability;
mod store;
mod strategy;
mod table;
mod tokenizer;

pub use analyzer::{Analyzer, AnalyzerConfig, default_worker_count};
pub use cancel::CancelToken;
pub use error::EngineError;
pub use merge::{merge, merge_outcomes};
pub use normalizer::{FnNormalizer, Identity, NormalizeError, Normalizer};
pub use partition::{chunk_size, partition};
pub use readability::{DocumentStats, count_syllables};
pub use store::{AtomicWordRecord, SharedWordStore, Tally, WordStore};
pub use table::{Analysis, Coverage, FrequencyTable};
pub use tokenizer::{Sentences, Tokenizer, Words, context_tokens, sentences_of};
pub use wordfreq_trie::TernaryTrie;
pub use wordfreq_types::{
    DEFAULT_MIN_WORD_LEN, MIN_CONTEXT_TOKENS, Occurrence, ParseStrategyError, Strategy,
    WordRecord, context_replaces,
};
