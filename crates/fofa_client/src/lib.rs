//! Client for the FOFA asset search API.
//!
//! The bot only calls the remote service on a cache miss. This crate wraps
//! the two endpoints it needs:
//!
//! - `GET /api/v1/search/all` for searches ([`FofaClient::search`])
//! - `GET /api/v1/info/my` for account details ([`FofaClient::account_info`])
//!
//! Result rows come back either as plain strings (one field requested) or as
//! arrays (several fields). Both are normalised to one comma-joined string
//! per row in [`SearchResult`].
//!
//! # Example
//!
//! ```rust,no_run
//! use fofa_client::{FofaClient, SearchRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FofaClient::new("your-api-key")?;
//! let request = SearchRequest::builder()
//!     .query("app=\"nginx\"")
//!     .size(100usize)
//!     .build()?;
//!
//! let result = client.search(&request).await?;
//! println!("{} of {} rows", result.rows().len(), result.total());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod client;
mod models;

pub use backend::SearchBackend;
pub use client::{ClientOptions, ClientOptionsBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, FofaClient};
pub use fofa_error::{FofaApiError, FofaApiErrorKind};
pub use models::{AccountInfo, SearchRequest, SearchRequestBuilder, SearchResult, normalize_row};

/// Result type for FOFA API calls.
pub type FofaApiResult<T> = std::result::Result<T, FofaApiError>;
