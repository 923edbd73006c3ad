//! Error types for the FOFA bot workspace.
//!
//! Every crate in the workspace reports failures through the types defined here.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use fofa_error::{CacheError, CacheErrorKind, FofaResult};
//!
//! fn load() -> FofaResult<String> {
//!     Err(CacheError::new(CacheErrorKind::DataCorruption(
//!         "history.json: expected value at line 1 column 1".to_string(),
//!     )))?
//! }
//!
//! match load() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod bot;
mod cache;
mod config;
mod error;
mod not_implemented;

pub use api::{FofaApiError, FofaApiErrorKind};
pub use bot::{BotError, BotErrorKind};
pub use cache::{CacheError, CacheErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{FofaError, FofaErrorKind, FofaResult};
pub use not_implemented::NotImplementedError;
