//! Per-browser bookmark readers.
//!
//! Every reader turns one on-disk format into [`ParsedBookmark`]s. Readers are
//! pure with respect to file content and report failures as errors; turning a
//! failure into an empty, still-watched source is the job of
//! [`SourceState`](crate::indexing::state::SourceState).

pub mod chromium;
pub mod epiphany;
pub mod midori;
pub mod mozilla;
pub mod opera;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::record::ParsedBookmark;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use chromium::ChromiumReader;
pub use epiphany::EpiphanyReader;
pub use midori::MidoriReader;
pub use mozilla::MozillaReader;
pub use opera::OperaReader;

/// Every browser the index knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "chromium")]
    Chromium,
    #[serde(rename = "google-chrome")]
    GoogleChrome,
    #[serde(rename = "epiphany")]
    Epiphany,
    #[serde(rename = "firefox")]
    Firefox,
    #[serde(rename = "seamonkey")]
    SeaMonkey,
    #[serde(rename = "midori")]
    Midori,
    #[serde(rename = "opera")]
    Opera,
}

impl SourceKind {
    /// Fixed aggregation order
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Chromium,
        SourceKind::GoogleChrome,
        SourceKind::Epiphany,
        SourceKind::Firefox,
        SourceKind::SeaMonkey,
        SourceKind::Midori,
        SourceKind::Opera,
    ];

    /// Key used to look the browser up in the application registry
    pub fn app_key(self) -> &'static str {
        match self {
            SourceKind::Chromium => "chromium",
            SourceKind::GoogleChrome => "google-chrome",
            SourceKind::Epiphany => "epiphany",
            SourceKind::Firefox => "firefox",
            SourceKind::SeaMonkey => "seamonkey",
            SourceKind::Midori => "midori",
            SourceKind::Opera => "opera",
        }
    }

    pub fn family(self) -> SourceFamily {
        match self {
            SourceKind::Chromium | SourceKind::GoogleChrome => SourceFamily::ChromiumJson,
            SourceKind::Epiphany => SourceFamily::RdfXml,
            SourceKind::Firefox | SourceKind::SeaMonkey => SourceFamily::MozillaSqlite,
            SourceKind::Midori => SourceFamily::MidoriSqlite,
            SourceKind::Opera => SourceFamily::IniFlatfile,
        }
    }

    /// The reader for this kind
    pub fn reader(self) -> Box<dyn SourceReader> {
        match self {
            SourceKind::Chromium => Box::new(ChromiumReader::chromium()),
            SourceKind::GoogleChrome => Box::new(ChromiumReader::google_chrome()),
            SourceKind::Epiphany => Box::new(EpiphanyReader),
            SourceKind::Firefox => Box::new(MozillaReader::firefox()),
            SourceKind::SeaMonkey => Box::new(MozillaReader::seamonkey()),
            SourceKind::Midori => Box::new(MidoriReader),
            SourceKind::Opera => Box::new(OperaReader),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.app_key())
    }
}

/// On-disk format families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFamily {
    ChromiumJson,
    MozillaSqlite,
    MidoriSqlite,
    RdfXml,
    IniFlatfile,
}

impl SourceFamily {
    /// Optional capability the family cannot work without
    pub fn requires(self) -> Option<Capability> {
        match self {
            SourceFamily::MozillaSqlite | SourceFamily::MidoriSqlite => Some(Capability::Sqlite),
            _ => None,
        }
    }
}

/// Files a source reads.
///
/// `data` is the bookmarks file itself. `indirection` is a selector file
/// (Mozilla's `profiles.ini`) that decides where `data` lives; when present,
/// `data` is only `Some` if the selector currently resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchPlan {
    pub data: Option<PathBuf>,
    pub indirection: Option<PathBuf>,
}

impl WatchPlan {
    pub fn direct(data: PathBuf) -> Self {
        Self {
            data: Some(data),
            indirection: None,
        }
    }
}

/// A bookmark store format bound to a browser's location
pub trait SourceReader {
    fn kind(&self) -> SourceKind;

    /// Resolve the files to read and watch. Re-evaluated whenever the
    /// indirection file changes.
    fn watch_paths(&self, config: &Config) -> WatchPlan;

    /// Parse the bookmarks file at `path`
    fn parse(&self, path: &Path) -> Result<Vec<ParsedBookmark>>;
}

/// Optional platform capabilities some families depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Sqlite,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Sqlite => f.write_str("SQLite database access"),
        }
    }
}

/// What this build and platform can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub sqlite: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            sqlite: cfg!(feature = "sqlite"),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Sqlite => self.sqlite,
        }
    }
}

/// A missing capability and the sources it takes out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityNotice {
    pub capability: Capability,
    pub sources: Vec<SourceKind>,
}

impl fmt::Display for CapabilityNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|k| k.app_key()).collect();
        write!(
            f,
            "{} is not available; bookmarks from {} are disabled",
            self.capability,
            names.join(", ")
        )
    }
}

/// Readers that can run here, in aggregation order
pub struct Availability {
    pub readers: Vec<Box<dyn SourceReader>>,
    pub notices: Vec<CapabilityNotice>,
}

/// Select the readers to start: enabled in `config` and supported by `capabilities`.
pub fn available_readers(capabilities: &Capabilities, config: &Config) -> Availability {
    let mut readers = Vec::new();
    let mut notices: Vec<CapabilityNotice> = Vec::new();

    for kind in SourceKind::ALL {
        if !config.is_enabled(kind) {
            debug!("Source {} disabled by configuration", kind);
            continue;
        }

        if let Some(capability) = kind.family().requires() {
            if !capabilities.has(capability) {
                match notices.iter_mut().find(|n| n.capability == capability) {
                    Some(notice) => notice.sources.push(kind),
                    None => notices.push(CapabilityNotice {
                        capability,
                        sources: vec![kind],
                    }),
                }
                continue;
            }
        }

        readers.push(kind.reader());
    }

    Availability { readers, notices }
}
