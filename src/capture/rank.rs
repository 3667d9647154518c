//! Title ranking for the destination picker.
//!
//! Matching is plain substring containment on the lowercased title. Candidates
//! are ordered by where the match starts, then by title length, then by title.

use crate::models::Note;

/// Upper bound on returned candidates.
pub const MAX_CANDIDATES: usize = 10;

/// Queries shorter than this (in characters) produce no candidates.
pub const MIN_QUERY_LEN: usize = 2;

/// A note that matched a query, with the character offset of the match in its
/// lowercased title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMatch<'a> {
    pub note: &'a Note,
    pub match_index: usize,
}

/// Score every note whose title contains `query`, best first, without truncating.
pub fn ranked_matches<'a>(query: &str, notes: &'a [Note]) -> Vec<RankedMatch<'a>> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    let mut matches: Vec<RankedMatch<'a>> = notes
        .iter()
        .filter_map(|note| {
            let haystack = note.title.to_lowercase();
            haystack.find(&needle).map(|byte_idx| RankedMatch {
                note,
                match_index: haystack[..byte_idx].chars().count(),
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        a.match_index
            .cmp(&b.match_index)
            .then_with(|| {
                a.note
                    .title
                    .chars()
                    .count()
                    .cmp(&b.note.title.chars().count())
            })
            .then_with(|| a.note.title.cmp(&b.note.title))
    });
    matches
}

/// Rank `notes` against `query`, returning at most [`MAX_CANDIDATES`] notes.
pub fn rank(query: &str, notes: &[Note]) -> Vec<Note> {
    ranked_matches(query, notes)
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|m| m.note.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(titles: &[&str]) -> Vec<Note> {
        titles
            .iter()
            .map(|t| Note::new(*t, format!("{}.md", t)))
            .collect()
    }

    fn titles(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.title.as_str()).collect()
    }

    #[test]
    fn short_queries_return_nothing() {
        let all = notes(&["a", "ab", "Alpha"]);
        assert!(rank("", &all).is_empty());
        assert!(rank("a", &all).is_empty());
        assert!(rank("é", &all).is_empty());
    }

    #[test]
    fn excludes_titles_without_the_substring() {
        let all = notes(&["Reading List", "Groceries", "Meeting notes"]);
        assert_eq!(titles(&rank("ing", &all)), vec!["Reading List", "Meeting notes"]);
        assert!(rank("xyz", &all).is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let all = notes(&["PROJECT Plan"]);
        assert_eq!(titles(&rank("project", &all)), vec!["PROJECT Plan"]);
        assert_eq!(titles(&rank("PLAN", &all)), vec!["PROJECT Plan"]);
    }

    #[test]
    fn earlier_match_wins_over_shorter_title() {
        let all = notes(&["My rust", "Rust book collection"]);
        assert_eq!(titles(&rank("rust", &all)), vec!["Rust book collection", "My rust"]);
    }

    #[test]
    fn shorter_title_wins_on_equal_match_index() {
        let all = notes(&["Rust notes long", "Rust"]);
        assert_eq!(titles(&rank("ru", &all)), vec!["Rust", "Rust notes long"]);
    }

    #[test]
    fn lexicographic_tie_break() {
        let all = notes(&["Rust b", "Rust a", "Rust c"]);
        assert_eq!(titles(&rank("rust", &all)), vec!["Rust a", "Rust b", "Rust c"]);
    }

    #[test]
    fn truncates_to_max_candidates() {
        let many: Vec<Note> = (0..25)
            .map(|i| Note::new(format!("note {:02}", i), format!("note {:02}.md", i)))
            .collect();
        let ranked = rank("note", &many);
        assert_eq!(ranked.len(), MAX_CANDIDATES);
        assert_eq!(ranked[0].title, "note 00");
        assert_eq!(ranked[9].title, "note 09");
    }

    #[test]
    fn match_index_counts_characters() {
        let all = notes(&["Ünïcode rust"]);
        let matches = ranked_matches("rust", &all);
        assert_eq!(matches[0].match_index, 8);
    }

    #[test]
    fn empty_index_yields_empty_result() {
        assert!(rank("anything", &[]).is_empty());
    }
}
