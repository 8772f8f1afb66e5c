// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
    pub mod record;
}

// Installed applications
pub mod apps {
    pub mod launch;
    pub mod registry;
}

// Shared format helpers
pub mod util {
    pub mod keyfile;
}

// Per-browser readers
pub mod sources;

// Live index: watches, per-source state, aggregation
pub mod indexing {
    pub mod aggregator;
    pub mod state;
    pub mod watch;
}

// Scoring & ranking
pub mod search {
    pub mod query;
    pub mod score;
    pub mod session;
}

// User interfaces
pub mod ui {
    pub mod cli;
}

// Re-export commonly used types
pub use apps::registry::{AppRef, Application, ApplicationRegistry, DesktopRegistry};
pub use core::config::Config;
pub use core::error::{Error, Result};
pub use core::record::{BookmarkRecord, ParsedBookmark};
pub use indexing::aggregator::Aggregator;
pub use indexing::state::SourceState;
pub use indexing::watch::{ChangeEvent, NotifyWatchService, Subscription, WatchRole, WatchService};
pub use search::query::{activate, full_query, narrow, Hit, SearchResultSet};
pub use search::score::{score_term, score_terms};
pub use search::session::SearchSession;
pub use sources::{Capabilities, SourceKind, SourceReader};
pub use ui::cli::Cli;
