use crate::apps::registry::AppRef;
use std::fmt;

/// A bookmark as it comes out of a reader, before it is bound to an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBookmark {
    pub title: Option<String>,
    pub uri: Option<String>,
}

impl ParsedBookmark {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            uri: Some(uri.into()),
        }
    }
}

/// A single normalized bookmark, the unit of search.
///
/// Records are immutable once built. A re-parse produces new records; it never
/// edits old ones. The lowercased forms used for matching are computed once here.
#[derive(Clone)]
pub struct BookmarkRecord {
    title: String,
    uri: String,
    origin: AppRef,
    title_folded: String,
    uri_folded: String,
}

impl BookmarkRecord {
    /// Build a record, or `None` when the URI is missing or blank.
    /// A missing title becomes the empty string.
    pub fn new(title: Option<String>, uri: Option<String>, origin: AppRef) -> Option<Self> {
        let uri = uri.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
        let title = title.unwrap_or_default();

        Some(Self {
            title_folded: fold_case(&title),
            uri_folded: fold_case(&uri),
            title,
            uri,
            origin,
        })
    }

    pub fn from_parsed(parsed: ParsedBookmark, origin: AppRef) -> Option<Self> {
        Self::new(parsed.title, parsed.uri, origin)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The application that owns this bookmark
    pub fn origin(&self) -> &AppRef {
        &self.origin
    }

    /// Icon name of the owning application
    pub fn icon(&self) -> Option<&str> {
        self.origin.icon()
    }

    pub(crate) fn title_folded(&self) -> &str {
        &self.title_folded
    }

    pub(crate) fn uri_folded(&self) -> &str {
        &self.uri_folded
    }
}

impl fmt::Debug for BookmarkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkRecord")
            .field("title", &self.title)
            .field("uri", &self.uri)
            .field("origin", &self.origin.id())
            .finish()
    }
}

/// Case folding used on both sides of every comparison
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
