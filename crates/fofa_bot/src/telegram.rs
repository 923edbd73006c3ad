//! Telegram front-end: long polling with teloxide.

use crate::{Caller, Command, CommandDispatcher, Reply};
use fofa_client::SearchBackend;
use fofa_error::{BotError, BotErrorKind, FofaResult};
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    prelude::*,
    types::{BotCommand, InputFile, ParseMode, Update},
};
use tracing::{debug, error, info, instrument, warn};

/// Build a teloxide bot, routed through `proxy` when one is set.
pub fn build_bot(token: &str, proxy: Option<&str>) -> FofaResult<Bot> {
    let mut builder = teloxide::net::default_reqwest_settings();
    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
            BotError::new(BotErrorKind::ConnectionFailed(format!(
                "invalid proxy {}: {}",
                proxy, e
            )))
        })?;
        builder = builder.proxy(proxy);
    }

    let client = builder
        .build()
        .map_err(|e| BotError::new(BotErrorKind::ConnectionFailed(e.to_string())))?;
    Ok(Bot::with_client(token, client))
}

/// Run the bot until Ctrl-C.
///
/// Verifies the token, registers the command menu, then polls for updates.
/// Each message is handled on its own task.
#[instrument(skip_all)]
pub async fn run<B>(bot: Bot, dispatcher: Arc<CommandDispatcher<B>>) -> FofaResult<()>
where
    B: SearchBackend + 'static,
{
    let me = bot.get_me().await.map_err(|e| {
        error!(error = %e, "Failed to authenticate bot");
        BotError::new(BotErrorKind::ConnectionFailed(e.to_string()))
    })?;
    info!(
        username = me.username.as_deref().unwrap_or("unknown"),
        "Bot authenticated"
    );

    let commands: Vec<BotCommand> = Command::menu()
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect();
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!(error = %e, "Failed to set command menu");
    }

    let handler = Update::filter_message().endpoint(message_handler::<B>);

    info!("Starting dispatcher with long polling");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .default_handler(|upd| async move {
            debug!(update = ?upd.id, "Unhandled update");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
    Ok(())
}

async fn message_handler<B>(
    bot: Bot,
    msg: Message,
    dispatcher: Arc<CommandDispatcher<B>>,
) -> ResponseResult<()>
where
    B: SearchBackend + 'static,
{
    let Some(command) = msg.text().and_then(Command::parse) else {
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let caller = Caller::new(user.id.0, user.first_name.clone());
    let chat_id = msg.chat.id;

    tokio::spawn(async move {
        handle_command(bot, chat_id, caller, command, dispatcher).await;
    });

    Ok(())
}

#[instrument(
    skip_all,
    fields(chat_id = chat_id.0, user_id = caller.user_id, command = command.name())
)]
async fn handle_command<B>(
    bot: Bot,
    chat_id: ChatId,
    caller: Caller,
    command: Command,
    dispatcher: Arc<CommandDispatcher<B>>,
) where
    B: SearchBackend + 'static,
{
    let notice = if command.is_slow() {
        match bot.send_message(chat_id, "⏳ Processing...").await {
            Ok(sent) => Some(sent.id),
            Err(e) => {
                warn!(error = %e, "Failed to send processing notice");
                None
            }
        }
    } else {
        None
    };

    let reply = dispatcher.dispatch(&caller, command).await;

    if let Err(e) = send_reply(&bot, chat_id, reply).await {
        error!(error = %e, "Failed to send reply");
    }

    if let Some(id) = notice {
        if let Err(e) = bot.delete_message(chat_id, id).await {
            debug!(error = %e, "Failed to delete processing notice");
        }
    }
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    match reply {
        Reply::Text(text) => {
            bot.send_message(chat_id, text).await?;
        }
        Reply::Markdown(text) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Reply::Document { path, caption } => {
            bot.send_document(chat_id, InputFile::file(path))
                .caption(caption)
                .await?;
        }
    }
    Ok(())
}
