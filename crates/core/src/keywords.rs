use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

pub const MAX_KEYWORDS: usize = 5;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Za-z]{4,}\b").unwrap());

/// Pull up to [`MAX_KEYWORDS`] distinct search terms out of a script.
///
/// Tokens are purely alphabetic, at least four letters long, and kept in the
/// order they first appear. No ranking or stop-word filtering is applied.
pub fn extract_keywords(script: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    WORD.find_iter(script)
        .map(|m| m.as_str())
        .filter(|word| seen.insert(*word))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}
