use searchbookmarks::apps::registry::{StaticApplication, StaticRegistry};
use searchbookmarks::search::query::SearchResultSet;
use searchbookmarks::{
    full_query, narrow, Aggregator, Capabilities, ChangeEvent, Config, Result, SearchSession,
    SourceKind, Subscription, WatchRole, WatchService,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Accepts every subscription and never reports anything on its own
struct QuietWatcher;

impl WatchService for QuietWatcher {
    fn watch(&self, path: &Path, _source: SourceKind, _role: WatchRole) -> Result<Subscription> {
        Ok(Subscription::new(path, Box::new(())))
    }
}

fn chromium_path(root: &Path, dir: &str) -> PathBuf {
    root.join("config").join(dir).join("Default").join("Bookmarks")
}

fn write_chromium(path: &Path, entries: &[(&str, &str)]) -> Result<()> {
    let children: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, url)| serde_json::json!({"type": "url", "name": name, "url": url}))
        .collect();
    let document = serde_json::json!({"roots": {"other": {"type": "folder", "children": children}}});

    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, document.to_string())?;
    Ok(())
}

fn start(root: &Path) -> Aggregator {
    let registry = StaticRegistry::new()
        .with(StaticApplication::shared("chromium"))
        .with(StaticApplication::shared("google-chrome"))
        .with(StaticApplication::shared("opera"));

    let mut aggregator = Aggregator::new(
        Config::with_roots(root.join("config"), root.join("home")),
        &Capabilities { sqlite: false },
        Box::new(registry),
        Box::new(QuietWatcher),
    );
    aggregator.init();
    aggregator
}

fn titles(result: &SearchResultSet) -> Vec<&str> {
    result.records().map(|r| r.title()).collect()
}

fn summary(result: &SearchResultSet) -> Vec<(String, String, String, u32)> {
    result
        .hits()
        .iter()
        .map(|hit| {
            (
                hit.record.title().to_string(),
                hit.record.uri().to_string(),
                hit.record.origin().id().to_string(),
                hit.score,
            )
        })
        .collect()
}

#[test]
fn test_prefix_outranks_substring() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_chromium(
        &chromium_path(temp_dir.path(), "chromium"),
        &[
            ("My Page", "http://x.com/git"),
            ("GitHub", "https://github.com"),
            ("Weather", "https://weather.example"),
        ],
    )?;
    let aggregator = start(temp_dir.path());

    let result = full_query(&aggregator, &["git"]);
    assert_eq!(titles(&result), vec!["GitHub", "My Page"]);
    assert_eq!(result.hits()[0].score, 4);
    assert_eq!(result.hits()[1].score, 1);

    // Case never matters
    assert_eq!(summary(&full_query(&aggregator, &["GIT"])), summary(&result));

    Ok(())
}

#[test]
fn test_every_term_must_match() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_chromium(
        &chromium_path(temp_dir.path(), "chromium"),
        &[
            ("Rust Book", "https://doc.rust-lang.org/book"),
            ("Rust Blog", "https://blog.rust-lang.org"),
            ("Book Club", "https://club.example"),
        ],
    )?;
    let aggregator = start(temp_dir.path());

    assert_eq!(titles(&full_query(&aggregator, &["rust", "book"])), vec!["Rust Book"]);
    assert_eq!(titles(&full_query(&aggregator, &["book", "club"])), vec!["Book Club"]);
    assert!(full_query(&aggregator, &["rust", "nothing"]).is_empty());
    assert!(full_query(&aggregator, &[] as &[&str]).is_empty());

    Ok(())
}

#[test]
fn test_same_bookmark_in_two_browsers_is_kept_twice() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let shared = [("Rust", "https://www.rust-lang.org")];
    write_chromium(&chromium_path(temp_dir.path(), "chromium"), &shared)?;
    write_chromium(&chromium_path(temp_dir.path(), "google-chrome"), &shared)?;
    let aggregator = start(temp_dir.path());

    let result = full_query(&aggregator, &["rust"]);
    assert_eq!(result.len(), 2);

    let origins: Vec<&str> = result.records().map(|r| r.origin().id()).collect();
    assert_eq!(origins, vec!["chromium", "google-chrome"]);

    Ok(())
}

#[test]
fn test_ties_break_on_raw_title() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_chromium(
        &chromium_path(temp_dir.path(), "chromium"),
        &[
            ("zeta", "https://a.example/docs"),
            ("Beta", "https://b.example/docs"),
            ("alpha", "https://c.example/docs"),
        ],
    )?;
    let aggregator = start(temp_dir.path());

    let result = full_query(&aggregator, &["docs"]);
    assert!(result.hits().iter().all(|hit| hit.score == 1));
    assert_eq!(titles(&result), vec!["Beta", "alpha", "zeta"]);

    Ok(())
}

#[test]
fn test_repeated_query_is_identical() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_chromium(
        &chromium_path(temp_dir.path(), "chromium"),
        &[("News", "https://news.example"), ("Newsletter", "https://mail.example/news")],
    )?;
    fs::create_dir_all(temp_dir.path().join("home/.opera"))?;
    fs::write(
        temp_dir.path().join("home/.opera/bookmarks.adr"),
        "#URL\n\tNAME=News\n\tURL=https://news.example\n\n",
    )?;
    let aggregator = start(temp_dir.path());

    let first = full_query(&aggregator, &["news"]);
    let second = full_query(&aggregator, &["news"]);
    assert_eq!(first.len(), 3);
    assert_eq!(summary(&first), summary(&second));

    Ok(())
}

#[test]
fn test_narrowing_matches_full_query() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_chromium(
        &chromium_path(temp_dir.path(), "chromium"),
        &[
            ("Rust Book", "https://doc.rust-lang.org/book"),
            ("Rust by Example", "https://doc.rust-lang.org/rust-by-example"),
            ("The Cargo Book", "https://doc.rust-lang.org/cargo"),
            ("Python", "https://python.org"),
        ],
    )?;
    write_chromium(
        &chromium_path(temp_dir.path(), "google-chrome"),
        &[("Rust Book", "https://doc.rust-lang.org/book")],
    )?;
    let aggregator = start(temp_dir.path());

    let first = full_query(&aggregator, &["doc"]);
    let narrowed = narrow(&first, &["book"]);
    let full = full_query(&aggregator, &["doc", "book"]);

    assert_eq!(narrowed.terms(), full.terms());
    assert_eq!(summary(&narrowed), summary(&full));
    assert_eq!(narrowed.len(), 3);

    Ok(())
}

#[test]
fn test_scores_do_not_leak_between_queries() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_chromium(
        &chromium_path(temp_dir.path(), "chromium"),
        &[("GitHub", "https://github.com")],
    )?;
    let aggregator = start(temp_dir.path());

    let git = full_query(&aggregator, &["git"]);
    let hub = full_query(&aggregator, &["hub"]);

    assert_eq!(git.hits()[0].score, 4);
    assert_eq!(hub.hits()[0].score, 3);
    assert_eq!(git.hits()[0].score, 4);

    Ok(())
}

#[test]
fn test_session_narrows_then_requeries_after_reload() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = chromium_path(temp_dir.path(), "chromium");
    write_chromium(
        &path,
        &[("Rust Book", "https://doc.rust-lang.org/book"), ("Rustacean", "https://rustacean.net")],
    )?;
    let mut aggregator = start(temp_dir.path());
    let mut session = SearchSession::new();

    assert_eq!(session.update(&aggregator, "rust").len(), 2);
    assert_eq!(titles(session.update(&aggregator, "rust book")), vec!["Rust Book"]);

    // A reload between keystrokes must not hide new records
    write_chromium(
        &path,
        &[
            ("Rust Book", "https://doc.rust-lang.org/book"),
            ("Rust Book Club", "https://club.example"),
        ],
    )?;
    assert!(aggregator.dispatch(&ChangeEvent {
        source: SourceKind::Chromium,
        role: WatchRole::Data,
        path: path.clone(),
    }));

    let result = session.update(&aggregator, "rust book club");
    assert_eq!(titles(result), vec!["Rust Book Club"]);
    assert_eq!(summary(result), summary(&full_query(&aggregator, &["rust", "book", "club"])));

    // Deleting terms falls back to a full query
    assert_eq!(session.update(&aggregator, "rust").len(), 2);
    assert!(session.update(&aggregator, "   ").is_empty());

    Ok(())
}

#[test]
fn test_activation_reaches_owning_application() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = chromium_path(temp_dir.path(), "chromium");
    write_chromium(&path, &[("Docs", "https://docs.rs")])?;

    let app = std::sync::Arc::new(StaticApplication::new("chromium"));
    let mut aggregator = Aggregator::new(
        Config::with_roots(temp_dir.path().join("config"), temp_dir.path().join("home")),
        &Capabilities { sqlite: false },
        Box::new(StaticRegistry::new().with(app.clone())),
        Box::new(QuietWatcher),
    );
    aggregator.init();

    let result = full_query(&aggregator, &["docs"]);
    searchbookmarks::activate(&result.hits()[0].record)?;
    assert_eq!(app.opened(), vec!["https://docs.rs".to_string()]);

    Ok(())
}

#[test]
fn test_blank_input_clears_session() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_chromium(
        &chromium_path(temp_dir.path(), "chromium"),
        &[("Rust", "https://www.rust-lang.org"), ("Not Found", "https://http.cat/404")],
    )?;
    let aggregator = start(temp_dir.path());
    let mut session = SearchSession::new();

    assert_eq!(session.update(&aggregator, "rust").len(), 1);
    assert!(session.results().is_some());

    assert!(session.update(&aggregator, " \t ").is_empty());
    assert!(session.results().is_none());

    // Digits are ordinary terms once the session is clear
    assert_eq!(titles(session.update(&aggregator, "404")), vec!["Not Found"]);

    Ok(())
}
