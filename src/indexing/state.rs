use super::watch::{ChangeEvent, Subscription, WatchRole, WatchService};
use crate::apps::registry::{AppRef, ApplicationRegistry};
use crate::core::config::Config;
use crate::core::record::BookmarkRecord;
use crate::sources::{SourceKind, SourceReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runtime state of one source: its current records and its watches.
///
/// A source is *active* once its browser is installed and its bookmarks file
/// resolved. Everything else leaves it empty and watch-less, which is not an
/// error.
pub struct SourceState {
    reader: Box<dyn SourceReader>,
    app: Option<AppRef>,
    records: Vec<Arc<BookmarkRecord>>,
    data_path: Option<PathBuf>,
    data_watch: Option<Subscription>,
    indirection_watch: Option<Subscription>,
    generation: u64,
}

impl SourceState {
    pub fn new(reader: Box<dyn SourceReader>) -> Self {
        Self {
            reader,
            app: None,
            records: Vec::new(),
            data_path: None,
            data_watch: None,
            indirection_watch: None,
            generation: 0,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.reader.kind()
    }

    pub fn is_active(&self) -> bool {
        self.app.is_some() && self.data_path.is_some()
    }

    /// Current snapshot, replaced wholesale on every re-parse
    pub fn records(&self) -> &[Arc<BookmarkRecord>] {
        &self.records
    }

    pub fn application(&self) -> Option<&AppRef> {
        self.app.as_ref()
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    /// Paths with a live subscription
    pub fn watched_paths(&self) -> Vec<&Path> {
        [&self.indirection_watch, &self.data_watch]
            .into_iter()
            .flatten()
            .filter(|s| s.is_active())
            .map(|s| s.path())
            .collect()
    }

    /// Bumped whenever `records` is replaced or cleared
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolve the application, locate the files, watch them and parse once.
    pub fn init(&mut self, config: &Config, registry: &dyn ApplicationRegistry, watcher: &dyn WatchService) {
        self.deinit();
        let kind = self.kind();

        let Some(app) = registry.lookup(kind.app_key()) else {
            debug!("{} is not installed", kind);
            return;
        };

        let plan = self.reader.watch_paths(config);

        if let Some(selector) = plan.indirection {
            if !selector.exists() {
                debug!("{}: no profile descriptor at {}", kind, selector.display());
                return;
            }
            self.app = Some(app);
            self.indirection_watch = subscribe(watcher, &selector, kind, WatchRole::Indirection);
        } else {
            self.app = Some(app);
        }

        if !self.attach_data(plan.data, watcher) {
            debug!("{}: no bookmarks file, source stays inactive", kind);
            self.deinit();
        }
    }

    /// Cancel every watch and drop the records
    pub fn deinit(&mut self) {
        if let Some(mut watch) = self.data_watch.take() {
            watch.cancel();
        }
        if let Some(mut watch) = self.indirection_watch.take() {
            watch.cancel();
        }
        if self.app.take().is_some() || !self.records.is_empty() {
            self.generation += 1;
        }
        self.records = Vec::new();
        self.data_path = None;
    }

    /// React to a change notification addressed to this source.
    ///
    /// Returns `true` when the records were rebuilt or cleared.
    pub fn handle_change(&mut self, event: &ChangeEvent, config: &Config, watcher: &dyn WatchService) -> bool {
        if self.app.is_none() {
            return false;
        }

        match event.role {
            WatchRole::Data => {
                if self.data_path.as_deref() != Some(event.path.as_path()) {
                    debug!("{}: ignoring stale change on {}", self.kind(), event.path.display());
                    return false;
                }
                self.reload();
                true
            }
            WatchRole::Indirection => {
                let plan = self.reader.watch_paths(config);
                if !self.attach_data(plan.data, watcher) {
                    debug!("{}: profile no longer resolves, deactivating", self.kind());
                    self.deinit();
                }
                true
            }
        }
    }

    /// Re-parse the bookmarks file and swap in the new records.
    ///
    /// Any failure leaves the source empty but keeps its watches, so a later
    /// fix to the file is picked up.
    pub fn reload(&mut self) {
        let (Some(path), Some(app)) = (self.data_path.as_ref(), self.app.as_ref()) else {
            return;
        };

        let records: Vec<Arc<BookmarkRecord>> = match self.reader.parse(path) {
            Ok(parsed) => parsed
                .into_iter()
                .filter_map(|bookmark| BookmarkRecord::from_parsed(bookmark, Arc::clone(app)))
                .map(Arc::new)
                .collect(),
            Err(e) => {
                warn!("Failed to read {} bookmarks from {}: {}", self.reader.kind(), path.display(), e);
                Vec::new()
            }
        };

        debug!("{}: {} bookmarks", self.reader.kind(), records.len());
        self.records = records;
        self.generation += 1;
    }

    /// Point the data watch at `data` (re-subscribing if it moved) and parse.
    /// Returns `false` when there is no bookmarks file to attach to.
    fn attach_data(&mut self, data: Option<PathBuf>, watcher: &dyn WatchService) -> bool {
        let Some(path) = data.filter(|p| p.exists()) else {
            return false;
        };

        if self.data_path.as_deref() != Some(path.as_path()) {
            if let Some(mut old) = self.data_watch.take() {
                old.cancel();
            }
            self.data_watch = subscribe(watcher, &path, self.kind(), WatchRole::Data);
            self.data_path = Some(path);
        }

        self.reload();
        true
    }
}

/// A failed subscription degrades to a static, parse-once source
fn subscribe(watcher: &dyn WatchService, path: &Path, kind: SourceKind, role: WatchRole) -> Option<Subscription> {
    match watcher.watch(path, kind, role) {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            debug!("{}: no live updates for {}: {}", kind, path.display(), e);
            None
        }
    }
}
