use serde::Serialize;

use crate::tokenizer::{Tokenizer, sentences_of};

/// Sentence, word and syllable totals of a document. Every letter run counts
/// as a word here, whatever its length.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DocumentStats {
    pub sentences: u64,
    pub words: u64,
    pub syllables: u64,
}

impl DocumentStats {
    pub fn of(text: &str) -> Self {
        let tokenizer = Tokenizer::new(0);
        let mut stats = DocumentStats::default();
        for sentence in sentences_of(text) {
            stats.sentences += 1;
            for word in tokenizer.words_of(sentence) {
                stats.words += 1;
                stats.syllables += u64::from(count_syllables(&word));
            }
        }
        stats
    }

    /// Flesch reading-ease score; `None` for a document without words.
    pub fn flesch_score(&self) -> Option<f64> {
        if self.sentences == 0 || self.words == 0 {
            return None;
        }
        let words_per_sentence = self.words as f64 / self.sentences as f64;
        let syllables_per_word = self.syllables as f64 / self.words as f64;
        Some(206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word)
    }
}

/// Heuristic syllable count: vowel groups, with a silent final `e` that
/// still guarantees one syllable.
pub fn count_syllables(word: &str) -> u32 {
    let letters: Vec<char> = word.chars().map(|c| c.to_ascii_lowercase()).collect();
    let Some(&first) = letters.first() else {
        return 0;
    };
    let mut count = u32::from(is_vowel(first));
    let last = letters.len() - 1;
    for i in 1..letters.len() {
        let (prev, cur) = (letters[i - 1], letters[i]);
        if i == last && cur == 'e' {
            if !is_vowel(prev) && count == 0 {
                count = 1;
            }
        } else if !is_vowel(prev) && is_vowel(cur) {
            count += 1;
        }
    }
    count
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("syllable"), 2);
        assert_eq!(count_syllables("apple"), 1);
        assert_eq!(count_syllables("Ocean"), 2);
        assert_eq!(count_syllables(""), 0);
    }

    #[test]
    fn totals_every_letter_run() {
        let stats = DocumentStats::of("The cat sat. The cat ran fast.");
        assert_eq!(
            stats,
            DocumentStats {
                sentences: 2,
                words: 7,
                syllables: 7,
            }
        );
        let score = stats.flesch_score().unwrap();
        let expected = 206.835 - 1.015 * 3.5 - 84.6;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn serializes_totals() {
        let stats = DocumentStats::of("One more time.");
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["sentences"], 1);
        assert_eq!(json["words"], 3);
    }

    #[test]
    fn empty_document_has_no_score() {
        assert_eq!(DocumentStats::of("").flesch_score(), None);
        assert_eq!(DocumentStats::of("...").sentences, 0);
    }
}
