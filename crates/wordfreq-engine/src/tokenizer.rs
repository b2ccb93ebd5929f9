use std::borrow::Cow;

use wordfreq_types::DEFAULT_MIN_WORD_LEN;

/// Splits documents into sentences and sentences into lowercase words.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tokenizer {
    min_word_len: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WORD_LEN)
    }
}

impl Tokenizer {
    /// Words are kept when their length is strictly greater than `min_word_len`.
    pub fn new(min_word_len: usize) -> Self {
        Self { min_word_len }
    }

    pub fn min_word_len(&self) -> usize {
        self.min_word_len
    }

    pub fn sentences_of<'a>(&self, text: &'a str) -> Sentences<'a> {
        sentences_of(text)
    }

    pub fn words_of<'a>(&self, sentence: &'a str) -> Words<'a> {
        Words {
            sentence,
            pos: 0,
            min_len: self.min_word_len,
        }
    }
}

/// Sentences of `text`, split on `.`, `!` and `?`.
pub fn sentences_of(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

/// Number of letter runs in a sentence, regardless of their length.
pub fn context_tokens(sentence: &str) -> usize {
    Tokenizer::new(0).words_of(sentence).count()
}

/// Iterator over trimmed, non-empty sentences. A clone is an independent
/// cursor at the same position; calling [`sentences_of`] again starts over.
#[derive(Clone, Debug)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let end = self
                .rest
                .find(|c| matches!(c, '.' | '!' | '?'))
                .unwrap_or(self.rest.len());
            let fragment = &self.rest[..end];
            // Terminators are single-byte.
            self.rest = self.rest.get(end + 1..).unwrap_or("");
            let sentence = fragment.trim();
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
        None
    }
}

/// Iterator over maximal runs of ASCII letters, lower-cased, longer than the
/// tokenizer's minimum.
#[derive(Clone, Debug)]
pub struct Words<'a> {
    sentence: &'a str,
    pos: usize,
    min_len: usize,
}

impl<'a> Iterator for Words<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.sentence.as_bytes();
        loop {
            while self.pos < bytes.len() && !bytes[self.pos].is_ascii_alphabetic() {
                self.pos += 1;
            }
            if self.pos >= bytes.len() {
                return None;
            }
            let start = self.pos;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_alphabetic() {
                self.pos += 1;
            }
            // ASCII boundaries are always char boundaries.
            let run = &self.sentence[start..self.pos];
            if run.len() > self.min_len {
                return Some(lowercase(run));
            }
        }
    }
}

fn lowercase(run: &str) -> Cow<'_, str> {
    if run.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(run.to_ascii_lowercase())
    } else {
        Cow::Borrowed(run)
    }
}
