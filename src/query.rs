//! Query analysis: turns a free-text question into search terms.
//!
//! A question such as "What is the difference between mitosis and meiosis?"
//! becomes the keywords `["mitosis", "meiosis"]` plus the bigram phrase
//! `"mitosis meiosis"`. There is no stemming or synonym expansion; terms are
//! matched literally by the retrieval engine.

use std::collections::HashSet;

use crate::text::normalize;

/// Maximum number of single-word keywords kept per query.
pub const MAX_KEYWORDS: usize = 12;
/// Maximum number of two-word phrases kept per query.
pub const MAX_PHRASES: usize = 6;
/// Tokens shorter than this (in bytes, after stripping to `[a-z0-9]`) are dropped.
const MIN_TOKEN_LEN: usize = 3;

/// Interrogative and filler words that carry no topic signal.
const STOPWORDS: &[&str] = &[
    "what", "is", "are", "was", "were", "the", "a", "an", "of", "to", "and", "or", "for", "in",
    "on", "with", "from", "about", "explain", "define", "difference", "between", "how", "do",
    "does", "can", "you", "please", "give", "me", "show", "steps", "step", "calculate", "solve",
];

/// Search terms derived from one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms {
    pub keywords: Vec<String>,
    pub phrases: Vec<String>,
}

impl SearchTerms {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.phrases.is_empty()
    }

    /// Keywords followed by phrases, the order used for scoring and snippets.
    pub fn all_terms(&self) -> Vec<String> {
        self.keywords
            .iter()
            .chain(self.phrases.iter())
            .cloned()
            .collect()
    }
}

/// Splits a question into keywords and adjacent-word phrases.
pub fn analyze(query: &str) -> SearchTerms {
    let cleaned = normalize(query).to_lowercase();

    let words: Vec<String> = cleaned
        .split(' ')
        .map(|w| {
            w.chars()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                .collect::<String>()
        })
        .filter(|w| w.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(&w.as_str()))
        .collect();

    let keywords = dedupe_capped(words.iter().cloned(), MAX_KEYWORDS);

    let bigrams = words
        .windows(2)
        .filter(|pair| pair[0].len() >= MIN_TOKEN_LEN && pair[1].len() >= MIN_TOKEN_LEN)
        .map(|pair| format!("{} {}", pair[0], pair[1]));
    let phrases = dedupe_capped(bigrams, MAX_PHRASES);

    SearchTerms { keywords, phrases }
}

fn dedupe_capped(items: impl Iterator<Item = String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(item.clone()))
        .take(cap)
        .collect()
}
