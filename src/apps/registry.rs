use super::launch::spawn_exec;
use crate::core::error::{Error, Result};
use crate::util::keyfile::KeyFile;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// An installed application that can open bookmark URIs
pub trait Application: Send + Sync {
    /// Stable identifier (desktop file stem)
    fn id(&self) -> &str;
    /// Human readable name
    fn name(&self) -> &str;
    /// Icon name, if the application declares one
    fn icon(&self) -> Option<&str>;
    /// Ask the application to open `uri`
    fn open_uri(&self, uri: &str) -> Result<()>;
}

/// Shared handle to an application; every record of a source carries one
pub type AppRef = Arc<dyn Application>;

/// Lookup of installed applications by vendor key (`firefox`, `google-chrome`, ...)
pub trait ApplicationRegistry {
    fn lookup(&self, key: &str) -> Option<AppRef>;
}

/// An application described by a freedesktop `.desktop` entry
#[derive(Debug, Clone)]
pub struct DesktopApplication {
    pub id: String,
    pub name: String,
    pub exec: String,
    pub icon: Option<String>,
}

impl DesktopApplication {
    /// Read a desktop entry; `None` for hidden entries or entries without `Exec`
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let file = KeyFile::load(path)?;
        let entry = file
            .group("Desktop Entry")
            .ok_or_else(|| Error::Parsing(format!("{}: no [Desktop Entry]", path.display())))?;

        if entry.get_bool("Hidden") == Some(true) {
            return Ok(None);
        }
        let Some(exec) = entry.get("Exec").filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };

        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Some(Self {
            name: entry.get("Name").unwrap_or(id.as_str()).to_string(),
            exec: exec.to_string(),
            icon: entry.get("Icon").map(str::to_string),
            id,
        }))
    }

    /// Basename of the program the `Exec` line starts
    fn program(&self) -> Option<&str> {
        let first = self.exec.split_whitespace().next()?;
        Path::new(first.trim_matches('"'))
            .file_name()
            .and_then(|n| n.to_str())
    }
}

impl Application for DesktopApplication {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    fn open_uri(&self, uri: &str) -> Result<()> {
        spawn_exec(&self.exec, uri)
    }
}

/// Registry backed by the desktop entries of the XDG data directories
#[derive(Debug, Default)]
pub struct DesktopRegistry {
    entries: Vec<Arc<DesktopApplication>>,
}

impl DesktopRegistry {
    /// Scan `<dir>/applications` for each data dir. Earlier dirs shadow later
    /// ones for entries with the same id.
    pub fn load(data_dirs: &[PathBuf]) -> Self {
        let mut entries: Vec<Arc<DesktopApplication>> = Vec::new();

        for dir in data_dirs {
            let apps_dir = dir.join("applications");
            if !apps_dir.is_dir() {
                continue;
            }

            let walker = WalkBuilder::new(&apps_dir)
                .max_depth(Some(1))
                .hidden(false)
                .ignore(false)
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .parents(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for result in walker {
                let entry = match result {
                    Ok(entry) => entry,
                    Err(err) => {
                        debug!("Skipping unreadable application entry: {}", err);
                        continue;
                    }
                };
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                    continue;
                }

                match DesktopApplication::from_file(path) {
                    Ok(Some(app)) => {
                        if !entries.iter().any(|known| known.id == app.id) {
                            entries.push(Arc::new(app));
                        }
                    }
                    Ok(None) => {}
                    Err(err) => debug!("Ignoring desktop entry {}: {}", path.display(), err),
                }
            }
        }

        debug!("Loaded {} desktop entries", entries.len());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ApplicationRegistry for DesktopRegistry {
    /// Exact id first, then last dotted id component (`org.gnome.Epiphany`),
    /// then program basename. Failing those, an id or program that extends
    /// `key` with `-`, `_` or `.` (`firefox-esr`, `chromium-browser`).
    fn lookup(&self, key: &str) -> Option<AppRef> {
        let key_lower = key.to_lowercase();

        let by_id = || self.entries.iter().find(|app| app.id == key);
        let by_component = || {
            self.entries.iter().find(|app| {
                app.id
                    .rsplit('.')
                    .next()
                    .map(|last| last.to_lowercase() == key_lower)
                    .unwrap_or(false)
            })
        };
        let by_program = || self.entries.iter().find(|app| app.program() == Some(key));
        let by_variant = || {
            self.entries.iter().find(|app| {
                is_variant_of(&app.id, key)
                    || app.id.rsplit('.').next().map_or(false, |last| is_variant_of(last, key))
                    || app.program().map_or(false, |program| is_variant_of(program, key))
            })
        };

        by_id()
            .or_else(by_component)
            .or_else(by_program)
            .or_else(by_variant)
            .map(|app| Arc::clone(app) as AppRef)
    }
}

/// `name` is `key` followed by a separator and a suffix
fn is_variant_of(name: &str, key: &str) -> bool {
    name.strip_prefix(key)
        .and_then(|rest| rest.chars().next())
        .map_or(false, |sep| matches!(sep, '-' | '_' | '.'))
}

/// In-memory application that records the URIs it was asked to open
#[derive(Debug, Default)]
pub struct StaticApplication {
    id: String,
    icon: Option<String>,
    opened: Mutex<Vec<String>>,
}

impl StaticApplication {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            icon: Some(id.clone()),
            id,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(id: impl Into<String>) -> AppRef {
        Arc::new(Self::new(id))
    }

    /// URIs passed to `open_uri`, oldest first
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl Application for StaticApplication {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    fn open_uri(&self, uri: &str) -> Result<()> {
        self.opened
            .lock()
            .map_err(|_| Error::Launch(format!("{}: state poisoned", self.id)))?
            .push(uri.to_string());
        Ok(())
    }
}

/// Registry over a fixed set of applications, keyed by id
#[derive(Default)]
pub struct StaticRegistry {
    apps: Vec<AppRef>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, app: AppRef) -> Self {
        self.apps.push(app);
        self
    }
}

impl ApplicationRegistry for StaticRegistry {
    fn lookup(&self, key: &str) -> Option<AppRef> {
        self.apps.iter().find(|app| app.id() == key).cloned()
    }
}
