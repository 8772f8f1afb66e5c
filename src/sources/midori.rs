use super::{SourceKind, SourceReader, WatchPlan};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::record::ParsedBookmark;
use std::path::Path;

#[cfg(feature = "sqlite")]
const BOOKMARKS_QUERY: &str = "SELECT title, uri FROM bookmarks";

/// Reader for Midori's `bookmarks.db`
#[derive(Debug, Clone, Default)]
pub struct MidoriReader;

impl SourceReader for MidoriReader {
    fn kind(&self) -> SourceKind {
        SourceKind::Midori
    }

    fn watch_paths(&self, config: &Config) -> WatchPlan {
        WatchPlan::direct(config.config_dir.join("midori").join("bookmarks.db"))
    }

    #[cfg(feature = "sqlite")]
    fn parse(&self, path: &Path) -> Result<Vec<ParsedBookmark>> {
        super::sqlite::query_bookmarks(path, BOOKMARKS_QUERY)
    }

    #[cfg(not(feature = "sqlite"))]
    fn parse(&self, _path: &Path) -> Result<Vec<ParsedBookmark>> {
        Err(crate::core::error::Error::Database(
            "built without SQLite support".to_string(),
        ))
    }
}
