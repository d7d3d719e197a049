//! Term-frequency retrieval over indexed textbooks.
//!
//! Scoring is literal, case-insensitive substring counting: no word
//! boundaries, no stemming, no weighting. A term like `cell` therefore also
//! counts inside `cellular`, and overlapping terms (`cell`, `cell wall`) are
//! each counted on their own. Ranking is the raw sum.
//!
//! All positions are character offsets, so snippet windows never split a
//! multi-byte character and never reach outside the document.

use crate::models::{IndexedDocument, ScoredDocument, Snippet};
use crate::text::normalize;

/// Characters kept before the match start.
pub const SNIPPET_BEFORE: usize = 180;
/// Characters kept after the match start.
pub const SNIPPET_AFTER: usize = 420;
/// Documents returned per query.
pub const TOP_K: usize = 3;

/// Tunables for [`retrieve_with`]. Defaults are the fixed service values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalParams {
    pub top_k: usize,
    pub snippet_before: usize,
    pub snippet_after: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            snippet_before: SNIPPET_BEFORE,
            snippet_after: SNIPPET_AFTER,
        }
    }
}

/// Lowercases character-by-character, keeping the original character when
/// its lowercase form is not a single character. Character offsets in the
/// folded string are then valid offsets into the original.
fn fold(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) => l,
                _ => c,
            }
        })
        .collect()
}

/// Sum over terms of non-overlapping occurrences of each term in `text`.
///
/// Callers never pass an empty term list; empty terms are ignored.
pub fn score(text: &str, terms: &[String]) -> usize {
    let haystack = fold(text);
    terms
        .iter()
        .map(|term| fold(term))
        .filter(|term| !term.is_empty())
        .map(|term| haystack.matches(term.as_str()).count())
        .sum()
}

/// Snippet around the earliest first occurrence of any term.
pub fn best_snippet(text: &str, terms: &[String]) -> Option<Snippet> {
    best_snippet_with(text, terms, SNIPPET_BEFORE, SNIPPET_AFTER)
}

/// [`best_snippet`] with explicit window sizes.
///
/// Ties on position go to the earlier term in `terms`.
pub fn best_snippet_with(
    text: &str,
    terms: &[String],
    before: usize,
    after: usize,
) -> Option<Snippet> {
    let haystack = fold(text);

    let mut best: Option<(usize, &String)> = None;
    for term in terms {
        let needle = fold(term);
        if needle.is_empty() {
            continue;
        }
        if let Some(byte_pos) = haystack.find(needle.as_str()) {
            if best.map_or(true, |(pos, _)| byte_pos < pos) {
                best = Some((byte_pos, term));
            }
        }
    }

    let (byte_pos, term) = best?;
    let char_pos = haystack[..byte_pos].chars().count();
    let total = haystack.chars().count();

    let start = char_pos.saturating_sub(before);
    let end = (char_pos + after).min(total);
    let window: String = text.chars().skip(start).take(end - start).collect();

    Some(Snippet {
        term: term.clone(),
        snippet: normalize(&window),
    })
}

/// Scores every candidate and returns the top documents with snippets.
pub fn retrieve(candidates: &[&IndexedDocument], terms: &[String]) -> Vec<ScoredDocument> {
    retrieve_with(candidates, terms, RetrievalParams::default())
}

/// [`retrieve`] with explicit parameters.
///
/// Zero-score documents are dropped. The sort is stable, so equal scores
/// keep candidate order.
pub fn retrieve_with(
    candidates: &[&IndexedDocument],
    terms: &[String],
    params: RetrievalParams,
) -> Vec<ScoredDocument> {
    let mut scored: Vec<(&IndexedDocument, usize)> = candidates
        .iter()
        .map(|doc| (*doc, score(&doc.raw_text, terms)))
        .filter(|(_, s)| *s > 0)
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(params.top_k);

    scored
        .into_iter()
        .map(|(doc, s)| ScoredDocument {
            file_id: doc.file_id.clone(),
            score: s,
            snippet: best_snippet_with(
                &doc.raw_text,
                terms,
                params.snippet_before,
                params.snippet_after,
            )
            .map(|snip| snip.snippet),
        })
        .collect()
}
