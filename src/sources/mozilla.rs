use super::{SourceKind, SourceReader, WatchPlan};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::record::ParsedBookmark;
use crate::util::keyfile::KeyFile;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bookmarks are URL rows (type 1) with both a title and a place
#[cfg(feature = "sqlite")]
const PLACES_QUERY: &str = "SELECT moz_bookmarks.title, moz_places.url FROM moz_bookmarks \
     INNER JOIN moz_places ON (moz_bookmarks.fk = moz_places.id) \
     WHERE moz_bookmarks.fk NOT NULL AND moz_bookmarks.title NOT NULL \
     AND moz_bookmarks.type = 1";

/// Reader for Mozilla-family browsers: `profiles.ini` selects a profile whose
/// `places.sqlite` holds the bookmarks
#[derive(Debug, Clone)]
pub struct MozillaReader {
    kind: SourceKind,
    app_dir: &'static str,
}

impl MozillaReader {
    pub fn firefox() -> Self {
        Self {
            kind: SourceKind::Firefox,
            app_dir: "firefox",
        }
    }

    pub fn seamonkey() -> Self {
        Self {
            kind: SourceKind::SeaMonkey,
            app_dir: "seamonkey",
        }
    }

    fn base_dir(&self, config: &Config) -> PathBuf {
        config.home_dir.join(".mozilla").join(self.app_dir)
    }
}

impl SourceReader for MozillaReader {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn watch_paths(&self, config: &Config) -> WatchPlan {
        let base = self.base_dir(config);
        let descriptor = base.join("profiles.ini");

        let data = if descriptor.exists() {
            match KeyFile::load(&descriptor) {
                Ok(file) => select_default_profile(&file, &base).map(|p| p.join("places.sqlite")),
                Err(e) => {
                    debug!("Cannot read {}: {}", descriptor.display(), e);
                    None
                }
            }
        } else {
            None
        };

        WatchPlan {
            data,
            indirection: Some(descriptor),
        }
    }

    #[cfg(feature = "sqlite")]
    fn parse(&self, path: &Path) -> Result<Vec<ParsedBookmark>> {
        super::sqlite::query_bookmarks(path, PLACES_QUERY)
    }

    #[cfg(not(feature = "sqlite"))]
    fn parse(&self, _path: &Path) -> Result<Vec<ParsedBookmark>> {
        Err(crate::core::error::Error::Database(
            "built without SQLite support".to_string(),
        ))
    }
}

/// Directory of the first profile named `default`.
///
/// A profile group needs `Name`, `Path` and a valid `IsRelative`; groups missing
/// any of them are skipped. Relative paths are joined onto `base`.
pub fn select_default_profile(file: &KeyFile, base: &Path) -> Option<PathBuf> {
    file.groups().find_map(|group| {
        let name = group.get("Name")?;
        let path = group.get("Path")?;
        let relative = group.get_bool("IsRelative")?;

        if name != "default" {
            return None;
        }

        Some(if relative {
            base.join(path)
        } else {
            PathBuf::from(path)
        })
    })
}
