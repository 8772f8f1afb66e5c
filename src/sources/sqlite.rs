use crate::core::error::Result;
use crate::core::record::ParsedBookmark;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::warn;

/// Run a two-column `(title, uri)` query against a read-only database.
///
/// Rows that fail to decode are logged and skipped; the other rows still count.
pub fn query_bookmarks(path: &Path, sql: &str) -> Result<Vec<ParsedBookmark>> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(ParsedBookmark {
            title: row.get(0)?,
            uri: row.get(1)?,
        })
    })?;

    let mut bookmarks = Vec::new();
    for row in rows {
        match row {
            Ok(bookmark) => bookmarks.push(bookmark),
            Err(e) => warn!("Skipping unreadable row in {}: {}", path.display(), e),
        }
    }

    Ok(bookmarks)
}
