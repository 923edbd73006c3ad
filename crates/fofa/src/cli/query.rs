//! One-off search and history listing.

use super::client_from_config;
use chrono::Utc;
use fofa::{BotConfig, CommandDispatcher, FofaResult, HistoryHandle, HistoryManager, SearchOutcome};
use tracing::{info, instrument, warn};

/// Run `query` through the cache-then-remote flow and print where the rows are.
#[instrument(skip(config))]
pub async fn run_search(config: BotConfig, query: &str) -> FofaResult<()> {
    let manager = HistoryManager::new(config.cache().clone())?;
    manager.init()?;
    let (history, task) = HistoryHandle::spawn(manager);

    let client = client_from_config(&config)?;
    let dispatcher = CommandDispatcher::new(history.clone(), client, config);
    let outcome = dispatcher.search(query).await;

    history.shutdown().await;
    if let Err(e) = task.await {
        warn!(error = %e, "History actor did not stop cleanly");
    }

    match outcome? {
        SearchOutcome::Cached(record) => {
            info!("Answered from cache");
            println!(
                "{} ({} records, cached at {})",
                record.file_path().display(),
                record.count(),
                record.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        SearchOutcome::Fetched {
            path,
            total,
            downloaded,
        } => {
            println!(
                "{} ({} records in total, {} downloaded)",
                path.display(),
                total,
                downloaded
            );
        }
        SearchOutcome::Empty => println!("No results found."),
    }
    Ok(())
}

/// Print up to `limit` history records, most recent first.
pub fn show_history(config: &BotConfig, limit: usize) -> FofaResult<()> {
    let manager = HistoryManager::new(config.cache().clone())?;
    let history = manager.load_history()?;

    if history.is_empty() {
        println!("Query history is empty.");
        return Ok(());
    }

    let now = Utc::now();
    for (i, record) in history.recent(limit).iter().enumerate() {
        let marker = if manager.is_fresh(record, now) { "" } else { " [expired]" };
        println!(
            "{:>3}. {}\n     {}  {} records  {}{}",
            i + 1,
            record.query_text(),
            record.timestamp().format("%Y-%m-%d %H:%M"),
            record.count(),
            record.file_path().display(),
            marker
        );
    }
    Ok(())
}
