//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the fofa binary.

mod commands;
mod init;
mod query;
#[cfg(feature = "telegram")]
mod run;

pub use commands::{Cli, Commands};
pub use init::write_template;
pub use query::{run_search, show_history};
#[cfg(feature = "telegram")]
pub use run::run_bot;

use fofa::{
    BotConfig, CONFIG_FILE_NAME, ClientOptions, FofaApiError, FofaApiErrorKind, FofaClient,
    FofaResult,
};
use std::path::{Path, PathBuf};

/// Load configuration from `path`, or from the default layers when `None`.
pub fn load_config(path: Option<&Path>) -> FofaResult<BotConfig> {
    match path {
        Some(path) => BotConfig::from_file(path),
        None => BotConfig::load(),
    }
}

/// File that `init` writes and `/start` persists to.
pub fn config_target(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Build a FOFA client from the configured key and proxy, if a key is set.
pub fn client_from_config(config: &BotConfig) -> FofaResult<Option<FofaClient>> {
    let Some(key) = config.api_key() else {
        return Ok(None);
    };

    let options = ClientOptions::builder()
        .proxy(config.proxy_url().map(str::to_string))
        .build()
        .map_err(|e| FofaApiError::new(FofaApiErrorKind::ClientCreation(e.to_string())))?;

    Ok(Some(FofaClient::with_options(key, &options)?))
}
