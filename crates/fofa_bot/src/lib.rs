//! Command dispatcher and Telegram front-end for the FOFA bot.
//!
//! The crate is split so the command flow can be exercised without a chat
//! platform:
//!
//! - [`Command`] parses `/name[@bot] args` messages
//! - [`CommandGate`] applies the admin allow-list ([`AdminList`])
//! - [`CommandDispatcher`] runs cache-then-remote searches and builds [`Reply`]s
//! - `telegram` (feature `telegram`) connects the dispatcher to Telegram
//!
//! # Example
//!
//! ```rust,no_run
//! use fofa_bot::{BotConfig, Caller, CommandDispatcher};
//! use fofa_cache::{HistoryHandle, HistoryManager};
//! use fofa_client::FofaClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BotConfig::load()?;
//! let manager = HistoryManager::new(config.cache().clone())?;
//! manager.init()?;
//! let (history, _task) = HistoryHandle::spawn(manager);
//!
//! let client = FofaClient::new("your-api-key")?;
//! let dispatcher = CommandDispatcher::new(history, Some(client), config);
//!
//! let caller = Caller::new(42, "alice");
//! if let Some(reply) = dispatcher.handle_text(&caller, "/history").await {
//!     println!("{}", reply.text());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod config;
mod dispatcher;
mod permission;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use command::Command;
pub use config::{BotConfig, CONFIG_FILE_NAME, DEFAULT_CONFIG, Preset};
pub use dispatcher::{
    Caller, CommandDispatcher, DISPLAY_LIMIT, HOST_FIELDS, HOST_SIZE, Reply, SEARCH_FIELDS,
    SEARCH_SIZE, SearchOutcome, error_reply,
};
pub use permission::{AdminList, CommandGate};
