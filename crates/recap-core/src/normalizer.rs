//! Deterministic cleanup of a run's raw caption fragments.
//!
//! Caption surfaces repaint the same cue many times while it stays on
//! screen, and consecutive cues often share their tail words with the next
//! cue's head. The normalizer collapses that redundancy with a word-level,
//! first-occurrence-wins policy: a word survives only the first time it is
//! seen across the whole run (exact, case-sensitive match).
//!
//! The policy is deliberately not phrase-aware. Legitimately repeated short
//! words are collapsed too ("very very tired" becomes "very tired"); that
//! limitation is documented and pinned by tests rather than silently fixed.

use std::collections::HashSet;

use crate::CaptionFragment;

/// Produces the normalized transcript for an ordered fragment sequence.
///
/// Non-empty fragment texts are concatenated in observation order (captions
/// are append-only as time advances, so no reordering happens), then passed
/// through [`dedupe_words`]. Empty input, or input whose fragments are all
/// empty, yields an empty string.
pub fn normalize_fragments(fragments: &[CaptionFragment]) -> String {
    let mut joined = String::new();
    for fragment in fragments {
        let text = fragment.text.trim();
        if text.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(text);
    }

    dedupe_words(&joined)
}

/// Tokenizes on whitespace, keeps each word only the first time it occurs,
/// and rejoins the survivors with single spaces.
///
/// Pure: identical input yields identical output. Whitespace runs collapse
/// and leading/trailing whitespace is trimmed as a side effect of the
/// tokenize/rejoin pass.
pub fn dedupe_words(raw: &str) -> String {
    let mut seen = HashSet::new();
    let mut survivors = Vec::new();
    for word in raw.split_whitespace() {
        if seen.insert(word) {
            survivors.push(word);
        }
    }

    survivors.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(at: f64, text: &str) -> CaptionFragment {
        CaptionFragment {
            observed_at_seconds: at,
            text: text.to_string(),
        }
    }

    #[test]
    fn drops_repeated_words_keeping_first_occurrence_order() {
        let fragments = [
            fragment(0.0, "hello world"),
            fragment(1.0, "world foo"),
            fragment(2.0, ""),
            fragment(3.0, "foo bar"),
        ];

        assert_eq!(normalize_fragments(&fragments), "hello world foo bar");
    }

    #[test]
    fn collapses_to_single_word() {
        let fragments = [fragment(0.0, "a a a"), fragment(1.0, "a")];
        assert_eq!(normalize_fragments(&fragments), "a");
    }

    #[test]
    fn empty_sequences_yield_empty_transcript() {
        assert_eq!(normalize_fragments(&[]), "");

        let all_blank = [fragment(0.0, ""), fragment(1.0, "   "), fragment(2.0, "")];
        assert_eq!(normalize_fragments(&all_blank), "");
    }

    #[test]
    fn deduplication_is_case_sensitive() {
        let fragments = [fragment(0.0, "Hello hello HELLO hello")];
        assert_eq!(normalize_fragments(&fragments), "Hello hello HELLO");
    }

    #[test]
    fn collapses_whitespace_runs_and_trims() {
        assert_eq!(dedupe_words("  spaced \t out\n words  "), "spaced out words");
    }

    #[test]
    fn idempotent_on_normalized_input() {
        let once = dedupe_words("tell me something new");
        assert_eq!(dedupe_words(&once), once);
    }

    #[test]
    fn repeated_short_words_collapse_by_policy() {
        // Known word-level limitation, kept intentionally.
        assert_eq!(dedupe_words("I am very very tired"), "I am very tired");
    }

    #[test]
    fn output_never_contains_duplicate_tokens() {
        let fragments = [
            fragment(0.0, "the quick brown fox the"),
            fragment(1.0, "quick brown fox jumps"),
            fragment(2.0, "fox jumps over the lazy dog"),
        ];
        let output = normalize_fragments(&fragments);

        let words: Vec<&str> = output.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        assert_eq!(words.len(), unique.len());
        assert_eq!(output, "the quick brown fox jumps over lazy dog");
    }
}
