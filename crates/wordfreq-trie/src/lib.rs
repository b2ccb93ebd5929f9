//! Ternary search trie over [`WordRecord`]s with path-compressed leaves.
//!
//! Every node carries a pivot byte, three children (`lo`, `eq`, `hi`) and at
//! most one resident record. A record is stored as high up as its path allows:
//! when a word reaches a node that does not exist yet, it is parked there
//! whole (a *compressed* leaf) instead of spelling out the rest of its bytes.
//! Once another word needs to continue through that node, or terminates on
//! it, the compressed record is relocated one level down first.
//!
//! Lookups come in two flavours. [`TernaryTrie::get_exact`] only returns the
//! record for the queried word. [`TernaryTrie::get`] falls back to the
//! resident on the longest common path whose word ends with the query's
//! remaining suffix, which folds near-duplicates onto one record.
//!
//! The trie is single-writer: insertion takes `&mut self` and nothing inside
//! is synchronized. Build it from a fully merged result, not from concurrent
//! workers.
//!
//! ```rust
//! use wordfreq_trie::TernaryTrie;
//! use wordfreq_types::WordRecord;
//!
//! let mut trie = TernaryTrie::new();
//! trie.insert(WordRecord::from_parts("taste", 1, "", 0, 0));
//! trie.insert(WordRecord::from_parts("task", 1, "", 0, 1));
//! assert_eq!(trie.get_exact("task").unwrap().count(), 1);
//! assert_eq!(trie.get_exact("taste").unwrap().count(), 1);
//! assert_eq!(trie.len(), 2);
//! ```

use std::cmp::Ordering;

use tracing::trace;
use wordfreq_types::WordRecord;

/// Path-compressed ternary search trie keyed by word bytes.
#[derive(Debug, Default)]
pub struct TernaryTrie {
    root: Option<Box<Node>>,
    len: usize,
}

#[derive(Debug)]
struct Node {
    pivot: u8,
    record: Option<WordRecord>,
    lo: Option<Box<Node>>,
    eq: Option<Box<Node>>,
    hi: Option<Box<Node>>,
}

impl Node {
    fn leaf(pivot: u8, record: WordRecord) -> Box<Self> {
        Box::new(Self {
            pivot,
            record: Some(record),
            lo: None,
            eq: None,
            hi: None,
        })
    }
}

impl TernaryTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct words stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated nodes; compressed leaves keep this well below the
    /// total number of bytes inserted.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.lo.as_deref());
            stack.extend(node.eq.as_deref());
            stack.extend(node.hi.as_deref());
        }
        count
    }

    /// Insert a record, absorbing it into an existing record for the same
    /// word. Inserting a fresh record (count 1) twice yields count 2.
    ///
    /// Records with an empty word are ignored.
    pub fn insert(&mut self, record: WordRecord) {
        if record.word().is_empty() {
            return;
        }
        if place(&mut self.root, record, 0) {
            self.len += 1;
        }
    }

    /// Record whose word equals `word`.
    pub fn get_exact(&self, word: &str) -> Option<&WordRecord> {
        let key = word.as_bytes();
        if key.is_empty() {
            return None;
        }
        let mut node = self.root.as_deref();
        let mut depth = 0;
        while let Some(n) = node {
            match key[depth].cmp(&n.pivot) {
                Ordering::Less => node = n.lo.as_deref(),
                Ordering::Greater => node = n.hi.as_deref(),
                Ordering::Equal => {
                    if let Some(record) = &n.record
                        && record.word() == word
                    {
                        return Some(record);
                    }
                    depth += 1;
                    if depth == key.len() {
                        return None;
                    }
                    node = n.eq.as_deref();
                }
            }
        }
        None
    }

    /// Mutable access to the record for `word`, e.g. to attach a translation.
    pub fn get_exact_mut(&mut self, word: &str) -> Option<&mut WordRecord> {
        let key = word.as_bytes();
        if key.is_empty() {
            return None;
        }
        let mut node = self.root.as_deref_mut()?;
        let mut depth = 0;
        loop {
            match key[depth].cmp(&node.pivot) {
                Ordering::Less => node = node.lo.as_deref_mut()?,
                Ordering::Greater => node = node.hi.as_deref_mut()?,
                Ordering::Equal => {
                    if node.record.as_ref().is_some_and(|r| r.word() == word) {
                        return node.record.as_mut();
                    }
                    depth += 1;
                    if depth == key.len() {
                        return None;
                    }
                    node = node.eq.as_deref_mut()?;
                }
            }
        }
    }

    /// Exact record for `word`, or else the deepest resident along the
    /// query's path whose word ends with the part of the query not yet
    /// consumed at that node.
    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        let key = word.as_bytes();
        if key.is_empty() {
            return None;
        }
        let mut candidate = None;
        let mut node = self.root.as_deref();
        let mut depth = 0;
        while let Some(n) = node {
            match key[depth].cmp(&n.pivot) {
                Ordering::Less => node = n.lo.as_deref(),
                Ordering::Greater => node = n.hi.as_deref(),
                Ordering::Equal => {
                    if let Some(record) = &n.record {
                        if record.word() == word {
                            return Some(record);
                        }
                        if record.word().as_bytes().ends_with(&key[depth..]) {
                            candidate = Some(record);
                        }
                    }
                    depth += 1;
                    if depth == key.len() {
                        break;
                    }
                    node = n.eq.as_deref();
                }
            }
        }
        candidate
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get_exact(word).is_some()
    }

    /// Borrowing iterator over all records: lo subtree, the node's own
    /// record, eq subtree, hi subtree. Callers should not rely on the order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.root.as_deref().map(Visit::Node).into_iter().collect(),
        }
    }

    /// Collect references to every stored record.
    pub fn records(&self) -> Vec<&WordRecord> {
        self.iter().collect()
    }

    /// Consume the trie and hand back its records.
    pub fn into_records(self) -> Vec<WordRecord> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<Box<Node>> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            let Node {
                record, lo, eq, hi, ..
            } = *node;
            out.extend(record);
            stack.extend(lo);
            stack.extend(eq);
            stack.extend(hi);
        }
        out
    }
}

/// Returns true when `record` introduced a new word.
fn place(slot: &mut Option<Box<Node>>, record: WordRecord, depth: usize) -> bool {
    let byte = record.word().as_bytes()[depth];
    let Some(node) = slot.as_mut() else {
        *slot = Some(Node::leaf(byte, record));
        return true;
    };

    match byte.cmp(&node.pivot) {
        Ordering::Less => place(&mut node.lo, record, depth),
        Ordering::Greater => place(&mut node.hi, record, depth),
        Ordering::Equal => {
            if let Some(resident) = node.record.as_mut()
                && resident.word() == record.word()
            {
                resident.absorb(record);
                return false;
            }

            let next = depth + 1;
            if next == record.word().len() {
                // The word ends here; any other resident is compressed and
                // has to move below before the slot is taken.
                if let Some(displaced) = node.record.take() {
                    relocate(node, displaced, next);
                }
                node.record = Some(record);
                return true;
            }

            if node
                .record
                .as_ref()
                .is_some_and(|resident| resident.word().len() > next)
                && let Some(displaced) = node.record.take()
            {
                relocate(node, displaced, next);
            }
            place(&mut node.eq, record, next)
        }
    }
}

fn relocate(node: &mut Node, displaced: WordRecord, depth: usize) {
    trace!(
        word = displaced.word(),
        pivot = %char::from(node.pivot),
        depth,
        "relocating compressed record"
    );
    place(&mut node.eq, displaced, depth);
}

enum Visit<'a> {
    Node(&'a Node),
    Record(&'a WordRecord),
}

/// Iterator returned by [`TernaryTrie::iter`].
pub struct Iter<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a WordRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(visit) = self.stack.pop() {
            match visit {
                Visit::Record(record) => return Some(record),
                Visit::Node(node) => {
                    self.stack.extend(node.hi.as_deref().map(Visit::Node));
                    self.stack.extend(node.eq.as_deref().map(Visit::Node));
                    self.stack.extend(node.record.as_ref().map(Visit::Record));
                    self.stack.extend(node.lo.as_deref().map(Visit::Node));
                }
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a TernaryTrie {
    type Item = &'a WordRecord;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<WordRecord> for TernaryTrie {
    fn extend<I: IntoIterator<Item = WordRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<WordRecord> for TernaryTrie {
    fn from_iter<I: IntoIterator<Item = WordRecord>>(iter: I) -> Self {
        let mut trie = TernaryTrie::new();
        trie.extend(iter);
        trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(word: &str) -> WordRecord {
        WordRecord::from_parts(word, 1, format!("{word} in a sentence"), 4, 0)
    }

    fn build(words: &[&str]) -> TernaryTrie {
        words.iter().map(|w| record(w)).collect()
    }

    #[test]
    fn distinct_words_round_trip() {
        let words = [
            "taste", "task", "tasks", "tasted", "tast", "unity", "unit", "apple", "ample", "xabab",
            "xab", "a", "zebra", "tassel",
        ];
        let trie = build(&words);
        assert_eq!(trie.len(), words.len());
        for word in words {
            let found = trie.get_exact(word).expect("word present");
            assert_eq!(found.word(), word);
            assert_eq!(trie.get(word).map(WordRecord::word), Some(word));
        }
    }

    #[test]
    fn duplicate_insert_increments_count() {
        let mut trie = build(&["word"]);
        trie.insert(record("word"));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get_exact("word").unwrap().count(), 2);
    }

    #[test]
    fn shared_prefix_splits_compressed_leaf() {
        let trie = build(&["taste", "task"]);
        let taste = trie.get_exact("taste").unwrap();
        let task = trie.get_exact("task").unwrap();
        assert_eq!(taste.count(), 1);
        assert_eq!(task.count(), 1);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn shorter_word_displaces_compressed_resident() {
        let mut trie = build(&["tasted", "taste"]);
        trie.insert(record("tasted"));
        assert_eq!(trie.get_exact("taste").unwrap().count(), 1);
        assert_eq!(trie.get_exact("tasted").unwrap().count(), 2);
    }

    #[test]
    fn absorbs_counts_of_merged_records() {
        let mut trie = TernaryTrie::new();
        trie.insert(WordRecord::from_parts("river", 5, "the river runs deep", 4, 3));
        trie.insert(WordRecord::from_parts("river", 2, "a river", 2, 1));
        let river = trie.get_exact("river").unwrap();
        assert_eq!(river.count(), 7);
        assert_eq!(river.first_seen(), 1);
        assert_eq!(river.context(), "the river runs deep");
    }

    #[test]
    fn approximate_lookup_folds_onto_compressed_suffix() {
        let trie = build(&["sunset"]);
        assert!(trie.get_exact("set").is_none());
        assert_eq!(trie.get("set").map(WordRecord::word), Some("sunset"));
        assert!(trie.get("moon").is_none());
    }

    #[test]
    fn exact_lookup_misses_unknown_words() {
        let trie = build(&["taste", "task"]);
        assert!(trie.get_exact("tas").is_none());
        assert!(trie.get_exact("tasks").is_none());
        assert!(trie.get_exact("").is_none());
        assert!(!trie.contains("unity"));
    }

    #[test]
    fn empty_word_is_ignored() {
        let mut trie = TernaryTrie::new();
        trie.insert(WordRecord::from_parts("", 1, "", 0, 0));
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 0);
    }

    #[test]
    fn traversal_visits_every_record_once() {
        let words = ["cat", "cart", "care", "dog", "do", "ant", "bee"];
        let trie = build(&words);
        let mut seen: Vec<&str> = trie.iter().map(WordRecord::word).collect();
        seen.sort_unstable();
        let mut expected = words.to_vec();
        expected.sort_unstable();
        assert_eq!(seen, expected);
        assert_eq!(trie.records().len(), words.len());

        let mut owned: Vec<String> = trie
            .into_records()
            .into_iter()
            .map(|r| r.word().to_string())
            .collect();
        owned.sort_unstable();
        assert_eq!(owned, expected);
    }

    #[test]
    fn compressed_leaves_save_nodes() {
        let trie = build(&["extraordinary"]);
        assert_eq!(trie.node_count(), 1);
        let trie = build(&["extraordinary", "extra"]);
        assert!(trie.node_count() <= "extra".len() + 1);
    }

    #[test]
    fn annotations_can_be_attached_in_place() {
        let mut trie = build(&["house", "horse"]);
        trie.get_exact_mut("horse")
            .unwrap()
            .set_translation("cheval")
            .set_known(true);
        let horse = trie.get_exact("horse").unwrap();
        assert_eq!(horse.translation(), "cheval");
        assert!(horse.is_known());
        assert!(trie.get_exact_mut("hose").is_none());
    }
}
