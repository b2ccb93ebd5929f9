use std::env;

use wordfreq_trie::TernaryTrie;
use wordfreq_types::{Occurrence, WordRecord};

fn main() {
    let words: Vec<String> = env::args().skip(1).collect();
    let words = if words.is_empty() {
        ["sunset", "sunrise", "task", "taste", "taste", "tassel"]
            .map(String::from)
            .to_vec()
    } else {
        words
    };

    let mut trie = TernaryTrie::new();
    for (index, word) in words.iter().enumerate() {
        let occurrence = Occurrence {
            sentence: word,
            tokens: 1,
            index,
        };
        trie.insert(WordRecord::new(word.to_ascii_lowercase(), &occurrence));
    }
    println!("{} words in {} nodes", trie.len(), trie.node_count());

    for record in &trie {
        println!("  {record}");
    }
    for query in ["taste", "set", "rise", "tas"] {
        match (trie.get_exact(query), trie.get(query)) {
            (Some(exact), _) => println!("{query:>6}: exact {exact}"),
            (None, Some(near)) => println!("{query:>6}: nearest {near}"),
            (None, None) => println!("{query:>6}: no match"),
        }
    }
}
