use crate::core::record::{fold_case, BookmarkRecord};

const TITLE_PREFIX: u32 = 3;
const TITLE_CONTAINS: u32 = 2;
const URI_PREFIX: u32 = 2;
const URI_CONTAINS: u32 = 1;

/// Score a single term against a record's title and URI, case-insensitively
pub fn score_term(record: &BookmarkRecord, term: &str) -> u32 {
    points(record, &fold_case(term))
}

/// Score a term list with AND semantics.
///
/// Terms are applied left to right and their points add up; the first term
/// that scores 0 makes the whole record score 0. An empty list scores 0.
pub fn score_terms<S: AsRef<str>>(record: &BookmarkRecord, terms: &[S]) -> u32 {
    let folded: Vec<String> = terms.iter().map(|t| fold_case(t.as_ref())).collect();
    score_folded(record, &folded)
}

/// As [`score_terms`] with terms already case-folded
pub(crate) fn score_folded(record: &BookmarkRecord, folded_terms: &[String]) -> u32 {
    let mut total = 0;
    for term in folded_terms {
        match points(record, term) {
            0 => return 0,
            p => total += p,
        }
    }
    total
}

fn points(record: &BookmarkRecord, folded_term: &str) -> u32 {
    let mut points = 0;

    match record.title_folded().find(folded_term) {
        Some(0) => points += TITLE_PREFIX,
        Some(_) => points += TITLE_CONTAINS,
        None => {}
    }

    match record.uri_folded().find(folded_term) {
        Some(0) => points += URI_PREFIX,
        Some(_) => points += URI_CONTAINS,
        None => {}
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::registry::StaticApplication;

    fn record(title: &str, uri: &str) -> BookmarkRecord {
        BookmarkRecord::new(Some(title.into()), Some(uri.into()), StaticApplication::shared("t"))
            .unwrap()
    }

    #[test]
    fn test_title_prefix_and_contains() {
        let github = record("GitHub", "https://github.com");
        assert_eq!(score_term(&github, "git"), 3 + 1);
        assert_eq!(score_term(&github, "hub"), 2 + 1);
    }

    #[test]
    fn test_title_only_points() {
        let r = record("GitHub", "https://example.org");
        assert_eq!(score_term(&r, "git"), 3);
        assert_eq!(score_term(&r, "hub"), 2);
    }

    #[test]
    fn test_uri_only_points() {
        let page = record("My Page", "http://x.com/git");
        assert_eq!(score_term(&page, "git"), 1);
        assert_eq!(score_term(&page, "http"), 2);
    }

    #[test]
    fn test_case_insensitive_both_ways() {
        let r = record("ÉCOLE Rust", "https://Example.ORG");
        assert_eq!(score_term(&r, "école"), 3);
        assert_eq!(score_term(&r, "EXAMPLE"), 1);
    }

    #[test]
    fn test_no_match_is_zero() {
        assert_eq!(score_term(&record("GitHub", "https://github.com"), "gitlab"), 0);
    }

    #[test]
    fn test_multi_term_and_semantics() {
        let r = record("Rust Book", "https://doc.rust-lang.org/book");
        assert_eq!(score_terms(&r, &["rust", "book"]), (3 + 1) + (2 + 1));
        assert_eq!(score_terms(&r, &["rust", "python"]), 0);
        assert_eq!(score_terms(&r, &["python", "rust"]), 0);
        assert_eq!(score_terms::<&str>(&r, &[]), 0);
    }

    #[test]
    fn test_empty_title_only_matches_uri() {
        let r = BookmarkRecord::new(None, Some("https://a.example".into()), StaticApplication::shared("t"))
            .unwrap();
        assert_eq!(score_term(&r, "example"), 1);
    }
}
