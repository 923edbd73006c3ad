//! FOFA search bot.
//!
//! Telegram bot front-end for the FOFA asset search API with a file-backed
//! query cache. Each search writes its rows to a result file and records the
//! query in a bounded history, so repeated queries within the freshness
//! window are answered from disk.
//!
//! # Crates
//!
//! - [`fofa_error`]: error kinds with location tracking
//! - [`fofa_cache`]: history manager, result files, single-writer actor
//! - [`fofa_client`]: HTTP client for the FOFA API
//! - [`fofa_bot`]: command parsing, permission gate, dispatcher, Telegram
//!
//! # Cargo Features
//!
//! - `telegram` (default): Telegram long-polling front-end
//!
//! # Example
//!
//! ```rust,no_run
//! use fofa::{BotConfig, CommandDispatcher, FofaClient, HistoryHandle, HistoryManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BotConfig::load()?;
//! let manager = HistoryManager::new(config.cache().clone())?;
//! manager.init()?;
//! let (history, _task) = HistoryHandle::spawn(manager);
//!
//! let client = FofaClient::new("your-api-key")?;
//! let dispatcher = CommandDispatcher::new(history, Some(client), config);
//! let outcome = dispatcher.search("domain=\"example.com\"").await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use fofa_bot::{
    AdminList, BotConfig, CONFIG_FILE_NAME, Caller, Command, CommandDispatcher, CommandGate,
    Preset, Reply, SearchOutcome,
};
pub use fofa_cache::{
    AddOutcome, CacheConfig, EvictionPolicy, History, HistoryHandle, HistoryManager, QueryRecord,
    ResultFileStore,
};
pub use fofa_client::{
    AccountInfo, ClientOptions, FofaClient, SearchBackend, SearchRequest, SearchResult,
};
pub use fofa_error::{
    BotError, BotErrorKind, CacheError, CacheErrorKind, ConfigError, ConfigErrorKind, FofaApiError,
    FofaApiErrorKind, FofaError, FofaErrorKind, FofaResult, NotImplementedError,
};

#[cfg(feature = "telegram")]
pub use fofa_bot::telegram;
