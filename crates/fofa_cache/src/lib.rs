//! File-backed query cache and bounded history.
//!
//! This crate is the single authority on "have we already answered this
//! query recently, and where is the answer". It persists a bounded,
//! most-recent-first list of [`QueryRecord`]s, each pointing at a result file
//! in the cache directory.
//!
//! # Features
//!
//! - **Deduplication**: re-adding a query replaces its previous record
//! - **Bounded history**: the oldest records are evicted past `max_history_size`
//! - **Self-healing lookup**: records whose result file vanished are cache misses
//! - **Atomic writes**: history and result files use temp file + rename
//! - **Single writer**: [`HistoryHandle`] funnels every mutation through one actor
//!
//! # Example
//!
//! ```rust
//! use fofa_cache::{CacheConfig, HistoryManager};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = std::env::temp_dir().join("fofa-doc-example");
//! let config = CacheConfig::default()
//!     .with_cache_dir(dir.join("fofa_cache"))
//!     .with_history_file(dir.join("history.json"));
//! let manager = HistoryManager::new(config)?;
//! manager.init()?;
//!
//! let path = manager.resolve_cache_path("a.txt");
//! std::fs::write(&path, "1.1.1.1:80\n")?;
//! manager.add_query("domain=\"example.com\"", &path, 1)?;
//!
//! let hit = manager.find_cache("domain=\"example.com\"")?;
//! assert!(hit.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod actor;
mod config;
mod manager;
mod record;
mod results;

pub use actor::{HistoryActor, HistoryHandle, HistoryMessage};
pub use config::{
    CacheConfig, CacheConfigBuilder, DEFAULT_CACHE_DIR, DEFAULT_EXPIRATION_SECS,
    DEFAULT_HISTORY_FILE, DEFAULT_MAX_HISTORY_SIZE, EvictionPolicy,
};
pub use fofa_error::{CacheError, CacheErrorKind};
pub use manager::{AddOutcome, HistoryManager};
pub use record::{History, QueryRecord};
pub use results::ResultFileStore;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
