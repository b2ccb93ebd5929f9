use tracing::trace;

use crate::store::WordStore;

/// Combine two partial stores key by key.
///
/// Counts of colliding words are summed, the earliest sighting is kept and
/// the preferred context wins. On a context tie `left` wins regardless of
/// which map ends up as the receiver. Both inputs are consumed.
pub fn merge(left: WordStore, right: WordStore) -> WordStore {
    trace!(left = left.len(), right = right.len(), "merging partial stores");
    if left.len() >= right.len() {
        let mut receiver = left;
        receiver.absorb(right, false);
        receiver
    } else {
        let mut receiver = right;
        receiver.absorb(left, true);
        receiver
    }
}

/// Fold partition results; `None` marks a partition that never ran.
pub fn merge_outcomes<I>(partials: I) -> WordStore
where
    I: IntoIterator<Item = Option<WordStore>>,
{
    partials
        .into_iter()
        .flatten()
        .reduce(merge)
        .unwrap_or_default()
}
