//! Long-running Telegram bot.

use super::client_from_config;
use fofa::{BotConfig, CommandDispatcher, FofaResult, HistoryHandle, HistoryManager, telegram};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Validate the configuration and run the bot until Ctrl-C.
#[instrument(skip(config), fields(config_path = %config_path.display()))]
pub async fn run_bot(config: BotConfig, config_path: PathBuf) -> FofaResult<()> {
    config.validate()?;
    info!(
        admins = config.admins().len(),
        public_mode = config.public_mode(),
        full_mode = config.full_mode(),
        "Configuration loaded"
    );

    let manager = HistoryManager::new(config.cache().clone())?;
    manager.init()?;
    let (history, task) = HistoryHandle::spawn(manager);

    let bot = telegram::build_bot(config.bot_token(), config.proxy_url())?;
    let client = client_from_config(&config)?;
    let dispatcher = Arc::new(
        CommandDispatcher::new(history.clone(), client, config).with_config_path(config_path),
    );

    let result = telegram::run(bot, dispatcher).await;

    history.shutdown().await;
    if let Err(e) = task.await {
        warn!(error = %e, "History actor did not stop cleanly");
    }
    result
}
