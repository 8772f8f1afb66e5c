use super::state::SourceState;
use super::watch::{ChangeEvent, WatchService};
use crate::apps::registry::ApplicationRegistry;
use crate::core::config::Config;
use crate::core::record::BookmarkRecord;
use crate::sources::{available_readers, Capabilities, CapabilityNotice, SourceKind};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::debug;

/// Owns every source and merges their records into one view.
///
/// Constructed once at startup and torn down with [`Aggregator::deinit`].
/// Change events are handled one at a time, each to completion, on the thread
/// that owns the aggregator.
pub struct Aggregator {
    config: Config,
    registry: Box<dyn ApplicationRegistry>,
    watcher: Box<dyn WatchService>,
    sources: Vec<SourceState>,
    notices: Vec<CapabilityNotice>,
}

impl Aggregator {
    pub fn new(
        config: Config,
        capabilities: &Capabilities,
        registry: Box<dyn ApplicationRegistry>,
        watcher: Box<dyn WatchService>,
    ) -> Self {
        let availability = available_readers(capabilities, &config);

        Self {
            sources: availability.readers.into_iter().map(SourceState::new).collect(),
            notices: availability.notices,
            config,
            registry,
            watcher,
        }
    }

    /// Start every source
    pub fn init(&mut self) {
        for source in &mut self.sources {
            source.init(&self.config, self.registry.as_ref(), self.watcher.as_ref());
        }
        debug!(
            "Initialised {} sources, {} active",
            self.sources.len(),
            self.sources.iter().filter(|s| s.is_active()).count()
        );
    }

    /// Stop every source, cancelling all watches
    pub fn deinit(&mut self) {
        for source in &mut self.sources {
            source.deinit();
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sources that can run here, in aggregation order
    pub fn sources(&self) -> &[SourceState] {
        &self.sources
    }

    pub fn source(&self, kind: SourceKind) -> Option<&SourceState> {
        self.sources.iter().find(|s| s.kind() == kind)
    }

    /// Missing capabilities found at construction
    pub fn notices(&self) -> &[CapabilityNotice] {
        &self.notices
    }

    /// Every current record, source by source. Built fresh on each call.
    pub fn all_records(&self) -> Vec<Arc<BookmarkRecord>> {
        self.sources
            .iter()
            .flat_map(|source| source.records().iter().cloned())
            .collect()
    }

    /// Sum of source generations; changes whenever any record list is replaced
    pub fn generation(&self) -> u64 {
        self.sources.iter().map(|s| s.generation()).sum()
    }

    /// Route one change event to its source. Returns `true` if records changed.
    pub fn dispatch(&mut self, event: &ChangeEvent) -> bool {
        let Some(source) = self.sources.iter_mut().find(|s| s.kind() == event.source) else {
            debug!("Dropping change event for unknown source {}", event.source);
            return false;
        };
        source.handle_change(event, &self.config, self.watcher.as_ref())
    }

    /// Handle every event already queued, without blocking
    pub fn drain(&mut self, events: &Receiver<ChangeEvent>) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            if self.dispatch(&event) {
                handled += 1;
            }
        }
        handled
    }

    /// Block on the event channel until it closes, calling `on_change` after
    /// each event that changed a source
    pub fn run<F>(&mut self, events: &Receiver<ChangeEvent>, mut on_change: F)
    where
        F: FnMut(&Aggregator, SourceKind),
    {
        while let Ok(event) = events.recv() {
            if self.dispatch(&event) {
                on_change(self, event.source);
            }
        }
    }
}
