use super::score::score_folded;
use crate::core::error::Result;
use crate::core::record::{fold_case, BookmarkRecord};
use crate::indexing::aggregator::Aggregator;
use std::cmp::Ordering;
use std::sync::Arc;

/// A matching record and its score for one query
#[derive(Debug, Clone)]
pub struct Hit {
    pub record: Arc<BookmarkRecord>,
    pub score: u32,
}

/// Ranked output of one query, together with the terms that produced it
#[derive(Debug, Clone, Default)]
pub struct SearchResultSet {
    terms: Vec<String>,
    hits: Vec<Hit>,
}

impl SearchResultSet {
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Hit> {
        self.hits.get(index)
    }

    pub fn records(&self) -> impl Iterator<Item = &Arc<BookmarkRecord>> {
        self.hits.iter().map(|hit| &hit.record)
    }
}

/// Score and rank every record the aggregator currently holds
pub fn full_query<S: AsRef<str>>(aggregator: &Aggregator, terms: &[S]) -> SearchResultSet {
    rank(aggregator.all_records(), terms)
}

/// Re-rank a previous result with extra terms.
///
/// Equivalent to a full query over the previous terms plus `new_terms`,
/// restricted to the records of `previous`.
pub fn narrow<S: AsRef<str>>(previous: &SearchResultSet, new_terms: &[S]) -> SearchResultSet {
    let mut terms = previous.terms.clone();
    terms.extend(new_terms.iter().map(|t| t.as_ref().to_string()));

    rank(previous.records().cloned(), &terms)
}

/// Score `records` against `terms`, keep positive scores, sort.
pub fn rank<I, S>(records: I, terms: &[S]) -> SearchResultSet
where
    I: IntoIterator<Item = Arc<BookmarkRecord>>,
    S: AsRef<str>,
{
    let terms: Vec<String> = terms.iter().map(|t| t.as_ref().to_string()).collect();
    let folded: Vec<String> = terms.iter().map(|t| fold_case(t)).collect();

    let mut hits: Vec<Hit> = records
        .into_iter()
        .filter_map(|record| {
            let score = score_folded(&record, &folded);
            (score > 0).then_some(Hit { record, score })
        })
        .collect();

    hits.sort_by(compare_hits);

    SearchResultSet { terms, hits }
}

/// Score descending, then raw title ascending. URI and owning application
/// settle the remaining ties so that order never depends on input order.
fn compare_hits(a: &Hit, b: &Hit) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.record.title().cmp(b.record.title()))
        .then_with(|| a.record.uri().cmp(b.record.uri()))
        .then_with(|| a.record.origin().id().cmp(b.record.origin().id()))
}

/// Ask the record's application to open it
pub fn activate(record: &BookmarkRecord) -> Result<()> {
    record.origin().open_uri(record.uri())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::registry::StaticApplication;

    fn record(title: &str, uri: &str) -> Arc<BookmarkRecord> {
        Arc::new(
            BookmarkRecord::new(Some(title.into()), Some(uri.into()), StaticApplication::shared("t"))
                .unwrap(),
        )
    }

    fn titles(result: &SearchResultSet) -> Vec<&str> {
        result.records().map(|r| r.title()).collect()
    }

    #[test]
    fn test_rank_filters_and_orders() {
        let records = vec![
            record("My Page", "http://x.com/git"),
            record("GitHub", "https://github.com"),
            record("Cooking", "https://food.example"),
        ];

        let result = rank(records, &["git"]);
        assert_eq!(titles(&result), vec!["GitHub", "My Page"]);
        assert_eq!(result.hits()[0].score, 4);
        assert_eq!(result.hits()[1].score, 1);
        assert_eq!(result.terms(), &["git".to_string()]);
    }

    #[test]
    fn test_ties_sorted_by_raw_title() {
        let records = vec![
            record("beta", "http://one/x"),
            record("Alpha", "http://two/x"),
            record("alpha", "http://three/x"),
        ];

        // Uppercase sorts before lowercase on the raw title
        let result = rank(records, &["x"]);
        assert_eq!(titles(&result), vec!["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn test_narrow_appends_terms() {
        let records = vec![
            record("Rust Book", "https://doc.rust-lang.org/book"),
            record("Rust Blog", "https://blog.rust-lang.org"),
            record("Book Club", "https://club.example"),
        ];

        let first = rank(records.clone(), &["rust"]);
        let narrowed = narrow(&first, &["book"]);
        let full = rank(records, &["rust", "book"]);

        assert_eq!(narrowed.terms(), full.terms());
        assert_eq!(titles(&narrowed), titles(&full));
        assert_eq!(titles(&narrowed), vec!["Rust Book"]);
        assert_eq!(narrowed.hits()[0].score, full.hits()[0].score);
    }

    #[test]
    fn test_empty_terms_match_nothing() {
        let result = rank(vec![record("A", "http://a")], &[] as &[&str]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_activate_opens_uri_with_origin() {
        let app = Arc::new(StaticApplication::new("firefox"));
        let bookmark =
            BookmarkRecord::new(Some("A".into()), Some("http://a".into()), app.clone()).unwrap();

        activate(&bookmark).unwrap();
        assert_eq!(app.opened(), vec!["http://a".to_string()]);
    }
}
