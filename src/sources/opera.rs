use super::{SourceKind, SourceReader, WatchPlan};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::record::ParsedBookmark;
use std::path::Path;

/// Reader for Opera's line-oriented `bookmarks.adr`
#[derive(Debug, Clone, Default)]
pub struct OperaReader;

impl SourceReader for OperaReader {
    fn kind(&self) -> SourceKind {
        SourceKind::Opera
    }

    fn watch_paths(&self, config: &Config) -> WatchPlan {
        WatchPlan::direct(config.home_dir.join(".opera").join("bookmarks.adr"))
    }

    fn parse(&self, path: &Path) -> Result<Vec<ParsedBookmark>> {
        let content = std::fs::read(path)?;
        Ok(parse_adr(&String::from_utf8_lossy(&content)))
    }
}

/// Parse `#URL` blocks.
///
/// A block starts at a `#URL` line and ends at the next blank line; `NAME=` and
/// `URL=` may come in any order. A block still open at end of input is dropped.
pub fn parse_adr(content: &str) -> Vec<ParsedBookmark> {
    let mut bookmarks = Vec::new();
    let mut block: Option<ParsedBookmark> = None;

    for raw in content.lines() {
        let line = raw.trim();

        if line == "#URL" {
            block = Some(ParsedBookmark {
                title: None,
                uri: None,
            });
            continue;
        }

        let Some(current) = block.as_mut() else {
            continue;
        };

        if line.is_empty() {
            if let Some(done) = block.take() {
                bookmarks.push(done);
            }
        } else if let Some(name) = line.strip_prefix("NAME=") {
            current.title = Some(name.to_string());
        } else if let Some(url) = line.strip_prefix("URL=") {
            current.uri = Some(url.to_string());
        }
    }

    bookmarks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_and_ignored_lines() {
        let content = "Opera Hotlist version 2.0\nOptions: encoding = utf8, version=3\n\n\
#FOLDER\n\tID=1\n\tNAME=Trash\n\n\
#URL\n\tID=2\n\tURL=http://www.opera.com/\n\tNAME=Opera\n\tCREATED=1\n\n\
#URL\n  NAME=Docs  \n  URL=https://docs.rs  \n\n";

        let bookmarks = parse_adr(content);
        assert_eq!(
            bookmarks,
            vec![
                ParsedBookmark::new("Opera", "http://www.opera.com/"),
                ParsedBookmark::new("Docs", "https://docs.rs"),
            ]
        );
    }

    #[test]
    fn test_block_without_url_is_emitted_without_uri() {
        let bookmarks = parse_adr("#URL\nNAME=Nowhere\n\n");
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].uri, None);
    }

    #[test]
    fn test_restarted_block_discards_partial() {
        let bookmarks = parse_adr("#URL\nNAME=Half\n#URL\nNAME=Whole\nURL=http://w\n\n");
        assert_eq!(bookmarks, vec![ParsedBookmark::new("Whole", "http://w")]);
    }

    #[test]
    fn test_windows_line_endings() {
        let bookmarks = parse_adr("#URL\r\nNAME=A\r\nURL=http://a\r\n\r\n");
        assert_eq!(bookmarks, vec![ParsedBookmark::new("A", "http://a")]);
    }
}
