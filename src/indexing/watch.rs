use crate::core::error::{Error, Result};
use crate::sources::SourceKind;
use notify_debouncer_full::{
    new_debouncer,
    notify::{RecursiveMode, Watcher},
    DebounceEventResult,
};
use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;
use tracing::{debug, warn};

/// Which of a source's files changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchRole {
    /// The bookmarks file itself
    Data,
    /// A selector file deciding where the bookmarks file lives
    Indirection,
}

/// A change notification, delivered through the dispatch loop's channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub source: SourceKind,
    pub role: WatchRole,
    pub path: PathBuf,
}

/// An active file watch. Dropping or cancelling it stops delivery.
pub struct Subscription {
    path: PathBuf,
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    /// Wrap whatever keeps the watch alive
    pub fn new(path: impl Into<PathBuf>, guard: Box<dyn Any>) -> Self {
        Self {
            path: path.into(),
            guard: Some(guard),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    /// Stop the watch. Cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        if self.guard.take().is_some() {
            debug!("Cancelled watch on {}", self.path.display());
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Establishes change subscriptions on single files
pub trait WatchService {
    fn watch(&self, path: &Path, source: SourceKind, role: WatchRole) -> Result<Subscription>;
}

/// File watcher backed by notify-debouncer-full.
///
/// The parent directory is watched so that editors and browsers that replace
/// the file by rename are still seen. Each debounced batch touching the file
/// yields one [`ChangeEvent`].
pub struct NotifyWatchService {
    sender: Sender<ChangeEvent>,
    debounce: Duration,
}

impl NotifyWatchService {
    pub fn new(sender: Sender<ChangeEvent>, debounce: Duration) -> Self {
        Self { sender, debounce }
    }
}

impl WatchService for NotifyWatchService {
    fn watch(&self, path: &Path, source: SourceKind, role: WatchRole) -> Result<Subscription> {
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::Watch(format!("Not a file path: {}", path.display())))?
            .to_os_string();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::Watch(format!("No parent directory: {}", path.display())))?;

        let tx = self.sender.clone();
        let target = path.to_path_buf();

        let mut debouncer = new_debouncer(
            self.debounce,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let touched = events.iter().any(|event| {
                        !event.kind.is_access()
                            && event
                                .paths
                                .iter()
                                .any(|p| p.file_name() == Some(file_name.as_os_str()))
                    });
                    if touched {
                        let _ = tx.send(ChangeEvent {
                            source,
                            role,
                            path: target.clone(),
                        });
                    }
                }
                Err(errors) => {
                    for e in errors {
                        warn!("Watch error on {}: {}", target.display(), e);
                    }
                }
            },
        )
        .map_err(|e| Error::Watch(format!("Failed to create file watcher: {}", e)))?;

        debouncer
            .watcher()
            .watch(parent, RecursiveMode::NonRecursive)
            .map_err(|e| Error::Watch(format!("Failed to watch {}: {}", parent.display(), e)))?;

        debug!("Watching {} for {} ({:?})", path.display(), source, role);
        Ok(Subscription::new(path, Box::new(debouncer)))
    }
}
