use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Load a `surface lemma` table, one pair per line, whitespace separated.
///
/// A missing file is an empty table. Lines without a lemma are skipped, extra
/// columns are ignored and both sides are lower-cased.
pub fn load_lemmas(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file = File::open(path).with_context(|| format!("open lemma file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut parts = line.split_whitespace();
        let (Some(surface), Some(lemma)) = (parts.next(), parts.next()) else {
            continue;
        };
        map.insert(surface.to_lowercase(), lemma.to_lowercase());
    }
    Ok(map)
}
