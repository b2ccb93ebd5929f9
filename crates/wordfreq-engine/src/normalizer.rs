use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Failure reported by a [`Normalizer`] for a single token.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct NormalizeError {
    message: String,
}

impl NormalizeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Maps a surface token to the form that gets counted (e.g. its lemma).
///
/// Called once per qualifying token, from many worker threads at once. The
/// engine assumes the mapping is deterministic for a given input; an empty
/// result drops the token.
pub trait Normalizer: Send + Sync {
    fn normalize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizeError>;
}

/// Counts tokens exactly as the tokenizer produced them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Normalizer for Identity {
    fn normalize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizeError> {
        Ok(Cow::Borrowed(word))
    }
}

/// Adapts a closure into a [`Normalizer`].
#[derive(Clone, Copy, Debug)]
pub struct FnNormalizer<F>(pub F);

impl<F> Normalizer for FnNormalizer<F>
where
    F: Fn(&str) -> Result<String, NormalizeError> + Send + Sync,
{
    fn normalize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizeError> {
        (self.0)(word).map(Cow::Owned)
    }
}

/// Lookup table from surface form to replacement; unknown words pass through.
impl Normalizer for HashMap<String, String> {
    fn normalize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizeError> {
        Ok(match self.get(word) {
            Some(replacement) => Cow::Owned(replacement.clone()),
            None => Cow::Borrowed(word),
        })
    }
}

impl<N: Normalizer + ?Sized> Normalizer for Arc<N> {
    fn normalize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizeError> {
        (**self).normalize(word)
    }
}
