use super::{SourceKind, SourceReader, WatchPlan};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::record::ParsedBookmark;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Reader for the JSON `Bookmarks` file of Chromium-family browsers
#[derive(Debug, Clone)]
pub struct ChromiumReader {
    kind: SourceKind,
    dir_name: &'static str,
}

impl ChromiumReader {
    pub fn chromium() -> Self {
        Self {
            kind: SourceKind::Chromium,
            dir_name: "chromium",
        }
    }

    pub fn google_chrome() -> Self {
        Self {
            kind: SourceKind::GoogleChrome,
            dir_name: "google-chrome",
        }
    }
}

impl SourceReader for ChromiumReader {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn watch_paths(&self, config: &Config) -> WatchPlan {
        WatchPlan::direct(
            config
                .config_dir
                .join(self.dir_name)
                .join("Default")
                .join("Bookmarks"),
        )
    }

    fn parse(&self, path: &Path) -> Result<Vec<ParsedBookmark>> {
        let content = std::fs::read(path)?;
        parse_bookmarks_json(&content)
    }
}

#[derive(Debug, Deserialize)]
struct BookmarksFile {
    #[serde(default)]
    roots: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    children: Vec<Node>,
}

/// Collect every `url` node under every root, folder order then child order.
///
/// Roots that are not bookmark folders (`sync_transaction_version`, ...) are skipped.
pub fn parse_bookmarks_json(content: &[u8]) -> Result<Vec<ParsedBookmark>> {
    let file: BookmarksFile = serde_json::from_slice(content)
        .map_err(|e| Error::Parsing(format!("Invalid bookmarks JSON: {}", e)))?;

    let mut bookmarks = Vec::new();
    let Some(roots) = file.roots else {
        return Ok(bookmarks);
    };

    for (name, value) in roots {
        if !value.is_object() {
            continue;
        }
        match Node::deserialize(value) {
            Ok(root) => collect_urls(&root, &mut bookmarks),
            Err(e) => debug!("Skipping malformed bookmark root {}: {}", name, e),
        }
    }

    Ok(bookmarks)
}

fn collect_urls(root: &Node, out: &mut Vec<ParsedBookmark>) {
    let mut stack = vec![root.children.iter()];

    while let Some(children) = stack.last_mut() {
        match children.next() {
            Some(node) => match node.kind.as_str() {
                "url" => out.push(ParsedBookmark {
                    title: node.name.clone(),
                    uri: node.url.clone(),
                }),
                "folder" => stack.push(node.children.iter()),
                _ => {}
            },
            None => {
                stack.pop();
            }
        }
    }
}
