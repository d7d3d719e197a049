//! Answer composition from retrieved snippets.
//!
//! Snippets from the top documents usually overlap (the same paragraph
//! reprinted across editions, or two terms landing in one passage). The
//! composer splits them into sentences, drops fragments, removes
//! near-duplicates by a prefix key and emits a short bulleted list.

use std::collections::HashSet;

use crate::text::normalize;

/// Maximum sentences in a composed answer.
pub const MAX_SENTENCES: usize = 7;
/// Sentences shorter than this (in characters) are treated as noise.
pub const MIN_SENTENCE_CHARS: usize = 40;
/// Length of the lowercased prefix used as the dedupe key.
const DEDUPE_KEY_CHARS: usize = 80;

/// Returned when there are no snippets at all.
pub const NO_SNIPPET_MESSAGE: &str = "I found something relevant, but couldn\u{2019}t extract a clear section. Try rephrasing your question.";

/// Limits for [`compose_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeParams {
    pub max_sentences: usize,
    pub min_sentence_chars: usize,
}

impl Default for ComposeParams {
    fn default() -> Self {
        Self {
            max_sentences: MAX_SENTENCES,
            min_sentence_chars: MIN_SENTENCE_CHARS,
        }
    }
}

/// Splits after `.`, `!` or `?` when followed by whitespace.
///
/// The punctuation stays with its sentence and the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let cleaned = normalize(text);
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = cleaned.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_boundary {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Builds a bulleted answer from snippets with the default limits.
pub fn compose(snippets: &[String]) -> String {
    compose_with(snippets, ComposeParams::default())
}

/// Builds a bulleted answer from snippets.
///
/// Falls back to the first snippet verbatim when no sentence survives
/// filtering, and to [`NO_SNIPPET_MESSAGE`] when there are no snippets.
pub fn compose_with(snippets: &[String], params: ComposeParams) -> String {
    let picked = pick_sentences(snippets, params);

    if picked.is_empty() {
        return snippets
            .first()
            .cloned()
            .unwrap_or_else(|| NO_SNIPPET_MESSAGE.to_string());
    }

    picked
        .iter()
        .map(|s| format!("\u{2022} {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

fn pick_sentences(snippets: &[String], params: ComposeParams) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut picked = Vec::new();

    for snippet in snippets {
        for sentence in split_sentences(snippet) {
            if picked.len() >= params.max_sentences {
                return picked;
            }
            if sentence.chars().count() < params.min_sentence_chars {
                continue;
            }
            let key: String = sentence
                .to_lowercase()
                .chars()
                .take(DEDUPE_KEY_CHARS)
                .collect();
            if seen.insert(key) {
                picked.push(sentence);
            }
        }
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTOSYNTHESIS: &str = "Photosynthesis is the process by which green plants convert light energy into chemical energy stored in glucose.";

    fn snippets(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let parts = split_sentences("One. Two! Three? Four");
        assert_eq!(parts, vec!["One.", "Two!", "Three?", "Four"]);
    }

    #[test]
    fn does_not_split_without_whitespace() {
        let parts = split_sentences("Value is 3.14 exactly. Next");
        assert_eq!(parts, vec!["Value is 3.14 exactly.", "Next"]);
    }

    #[test]
    fn composes_bulleted_sentences() {
        let text = format!("{} Plants also need water and carbon dioxide to do this.", PHOTOSYNTHESIS);
        let answer = compose(&snippets(&[&text]));
        let lines: Vec<&str> = answer.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("\u{2022} {}", PHOTOSYNTHESIS));
        assert!(lines[1].starts_with("\u{2022} Plants also need water"));
    }

    #[test]
    fn drops_short_fragments() {
        let text = format!("ure of the leaf. {}", PHOTOSYNTHESIS);
        let answer = compose(&snippets(&[&text]));
        assert_eq!(answer, format!("\u{2022} {}", PHOTOSYNTHESIS));
    }

    #[test]
    fn dedupes_sentences_across_snippets() {
        let answer = compose(&snippets(&[PHOTOSYNTHESIS, PHOTOSYNTHESIS]));
        assert_eq!(answer.matches(PHOTOSYNTHESIS).count(), 1);
    }

    #[test]
    fn dedupe_key_is_case_insensitive_prefix() {
        let a = format!("{} Extra words at the end.", "X".repeat(85));
        let b = format!("{} Different tail entirely here.", "x".repeat(85));
        let answer = compose(&snippets(&[&a, &b]));
        assert_eq!(answer.lines().count(), 1);
    }

    #[test]
    fn caps_at_seven_sentences() {
        let text = (0..12)
            .map(|i| format!("Sentence number {:02} explains one more idea about cells.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let answer = compose(&snippets(&[&text, PHOTOSYNTHESIS]));
        assert_eq!(answer.lines().count(), MAX_SENTENCES);
        assert!(!answer.contains("Photosynthesis"));
    }

    #[test]
    fn falls_back_to_first_snippet() {
        let answer = compose(&snippets(&["too short.", "also short."]));
        assert_eq!(answer, "too short.");
    }

    #[test]
    fn falls_back_to_message_without_snippets() {
        assert_eq!(compose(&[]), NO_SNIPPET_MESSAGE);
    }

    #[test]
    fn custom_limits() {
        let params = ComposeParams {
            max_sentences: 1,
            min_sentence_chars: 5,
        };
        let answer = compose_with(&snippets(&["Short one. Second sentence."]), params);
        assert_eq!(answer, "\u{2022} Short one.");
    }
}
