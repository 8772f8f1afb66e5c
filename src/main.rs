use anyhow::{bail, Context};
use clap::Parser;
use searchbookmarks::indexing::watch::ChangeEvent;
use searchbookmarks::search::query::{activate, full_query, SearchResultSet};
use searchbookmarks::search::session::SearchSession;
use searchbookmarks::ui::cli::{Cli, Commands};
use searchbookmarks::{Aggregator, Capabilities, Config, DesktopRegistry, NotifyWatchService, SourceKind};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::new(cli.config.clone()).context("Failed to load configuration")?;
    let (tx, rx) = mpsc::channel();

    let registry = DesktopRegistry::load(&config.data_dirs);
    let watcher = NotifyWatchService::new(tx, config.debounce);
    let mut aggregator = Aggregator::new(
        config,
        &Capabilities::detect(),
        Box::new(registry),
        Box::new(watcher),
    );

    for notice in aggregator.notices() {
        warn!("{}", notice);
    }

    aggregator.init();

    let result = match cli.command {
        Commands::Search { terms, limit, open } => handle_search(&aggregator, &terms, limit, open),
        Commands::Sources => handle_sources(&aggregator),
        Commands::Watch => handle_watch(&mut aggregator, &rx),
        Commands::Interactive { limit } => handle_interactive(&mut aggregator, &rx, limit),
    };

    aggregator.deinit();
    result
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SEARCHBOOKMARKS_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn handle_search(
    aggregator: &Aggregator,
    terms: &[String],
    limit: usize,
    open: Option<usize>,
) -> anyhow::Result<()> {
    let results = full_query(aggregator, terms);
    print_results(&results, limit);

    if let Some(position) = open {
        open_result(&results, position)?;
    }

    Ok(())
}

fn handle_sources(aggregator: &Aggregator) -> anyhow::Result<()> {
    for kind in SourceKind::ALL {
        let Some(source) = aggregator.source(kind) else {
            let unavailable = aggregator
                .notices()
                .iter()
                .find(|notice| notice.sources.contains(&kind));
            match unavailable {
                Some(notice) => println!("{:<14} unavailable ({})", kind, notice.capability),
                None => println!("{:<14} disabled", kind),
            }
            continue;
        };

        if !source.is_active() {
            println!("{:<14} inactive", kind);
            continue;
        }

        let app = source.application().map(|a| a.name()).unwrap_or_default();
        println!(
            "{:<14} active, {} bookmarks via {}",
            kind,
            source.records().len(),
            app
        );
        for path in source.watched_paths() {
            println!("{:<14}   watching {}", "", path.display());
        }
    }

    Ok(())
}

fn handle_watch(aggregator: &mut Aggregator, events: &Receiver<ChangeEvent>) -> anyhow::Result<()> {
    let active = aggregator.sources().iter().filter(|s| s.is_active()).count();
    println!("Watching {} active sources ({} bookmarks)", active, aggregator.all_records().len());
    println!("Press Ctrl+C to stop watching...\n");

    aggregator.run(events, |aggregator, kind| {
        let count = aggregator
            .source(kind)
            .map(|source| source.records().len())
            .unwrap_or(0);
        println!("  ↻ {}: {} bookmarks", kind, count);
    });

    Ok(())
}

fn handle_interactive(
    aggregator: &mut Aggregator,
    events: &Receiver<ChangeEvent>,
    limit: usize,
) -> anyhow::Result<()> {
    println!("Type search terms; a result number opens it; an empty line clears.");
    let mut session = SearchSession::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        aggregator.drain(events);

        if let (Ok(position), Some(results)) = (line.trim().parse::<usize>(), session.results()) {
            if let Err(e) = open_result(results, position) {
                println!("  {}", e);
            }
            continue;
        }

        let results = session.update(aggregator, &line);
        if results.terms().is_empty() {
            continue;
        }
        print_results(results, limit);
    }

    Ok(())
}

fn print_results(results: &SearchResultSet, limit: usize) {
    if results.is_empty() {
        println!("No bookmarks found.");
        return;
    }

    println!("Found {} bookmarks:", results.len());
    for (i, hit) in results.hits().iter().take(limit).enumerate() {
        let record = &hit.record;
        let title = if record.title().is_empty() {
            record.uri()
        } else {
            record.title()
        };
        println!("{:>3}. {} (score: {})", i + 1, title, hit.score);
        match record.icon() {
            Some(icon) => println!("     {}  [{}, icon {}]", record.uri(), record.origin().name(), icon),
            None => println!("     {}  [{}]", record.uri(), record.origin().name()),
        }
    }
    if results.len() > limit {
        println!("     ... {} more", results.len() - limit);
    }
}

fn open_result(results: &SearchResultSet, position: usize) -> anyhow::Result<()> {
    if position == 0 {
        bail!("Result numbers start at 1");
    }
    let hit = results
        .get(position - 1)
        .with_context(|| format!("No result number {}", position))?;

    activate(&hit.record).with_context(|| format!("Failed to open {}", hit.record.uri()))?;
    println!("  ✓ Opened {} in {}", hit.record.uri(), hit.record.origin().name());
    Ok(())
}
