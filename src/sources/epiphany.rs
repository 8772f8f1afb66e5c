use super::{SourceKind, SourceReader, WatchPlan};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::record::ParsedBookmark;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Reader for Epiphany's RSS 1.0 / RDF `bookmarks.rdf`
#[derive(Debug, Clone, Default)]
pub struct EpiphanyReader;

impl SourceReader for EpiphanyReader {
    fn kind(&self) -> SourceKind {
        SourceKind::Epiphany
    }

    fn watch_paths(&self, config: &Config) -> WatchPlan {
        WatchPlan::direct(config.config_dir.join("epiphany").join("bookmarks.rdf"))
    }

    fn parse(&self, path: &Path) -> Result<Vec<ParsedBookmark>> {
        let content = std::fs::read_to_string(path)?;
        parse_rdf(&content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

#[derive(Debug, Default)]
struct PendingItem {
    depth: usize,
    title: Option<String>,
    link: Option<String>,
}

/// Collect `title`/`link` pairs from the unprefixed `item` elements.
///
/// Only direct children of an item count; the channel's own title and link
/// are not bookmarks.
pub fn parse_rdf(content: &str) -> Result<Vec<ParsedBookmark>> {
    let mut reader = Reader::from_str(content);

    let mut bookmarks = Vec::new();
    let mut depth = 0usize;
    let mut item: Option<PendingItem> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(Error::Parsing(format!(
                    "Invalid RDF at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        };

        match event {
            Event::Start(start) => {
                depth += 1;
                let name = start.name();
                let child_of_item = item.as_ref().map(|open| depth == open.depth + 1);
                match (name.as_ref(), child_of_item) {
                    (b"item", None) => {
                        item = Some(PendingItem {
                            depth,
                            ..PendingItem::default()
                        })
                    }
                    (b"title", Some(true)) => {
                        field = Some(Field::Title);
                        text.clear();
                    }
                    (b"link", Some(true)) => {
                        field = Some(Field::Link);
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Text(chunk) if field.is_some() => {
                let unescaped = chunk
                    .unescape()
                    .map_err(|e| Error::Parsing(format!("Invalid RDF text: {}", e)))?;
                text.push_str(&unescaped);
            }
            Event::CData(chunk) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&chunk));
            }
            Event::End(_) => {
                let item_depth = item.as_ref().map(|open| open.depth);
                if item_depth.map(|d| depth == d + 1).unwrap_or(false) {
                    if let Some(open) = item.as_mut() {
                        match field.take() {
                            Some(Field::Title) => open.title = Some(text.trim().to_string()),
                            Some(Field::Link) => open.link = Some(text.trim().to_string()),
                            None => {}
                        }
                    }
                } else if item_depth == Some(depth) {
                    if let Some(done) = item.take() {
                        bookmarks.push(ParsedBookmark {
                            title: done.title,
                            uri: done.link,
                        });
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(bookmarks)
}
