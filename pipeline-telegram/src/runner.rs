//! Dispatcher runner: converts teloxide updates into incoming messages and button presses and
//! passes them to the [`HandlerChain`]. Updates of one chat are processed in order.

use crate::adapters::TelegramMessageWrapper;
use crate::media::download_media;
use anyhow::Result;
use handler_chain::HandlerChain;
use pipeline_core::{CallbackQuery as CoreCallbackQuery, MediaStore};
use teloxide::prelude::*;
use tracing::{debug, error, info, instrument, warn};

/// Runs the long-polling dispatcher until interrupted.
#[instrument(skip(bot, handler_chain, media))]
pub async fn run_dispatcher(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    media: MediaStore,
) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!(
            bot_id = me.user.id.0,
            username = ?me.user.username,
            "step: connected to Telegram"
        );
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_new_message))
        .branch(Update::filter_channel_post().endpoint(on_new_message))
        .branch(Update::filter_edited_message().endpoint(on_edited_message))
        .branch(Update::filter_edited_channel_post().endpoint(on_edited_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_chain, media])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn on_new_message(
    bot: Bot,
    chain: HandlerChain,
    media: MediaStore,
    msg: Message,
) -> Result<()> {
    observe(&bot, &chain, &media, &msg, false).await;
    Ok(())
}

async fn on_edited_message(
    bot: Bot,
    chain: HandlerChain,
    media: MediaStore,
    msg: Message,
) -> Result<()> {
    observe(&bot, &chain, &media, &msg, true).await;
    Ok(())
}

/// Downloads any video, then runs the chain. Failures are logged; the dispatcher keeps going.
async fn observe(bot: &Bot, chain: &HandlerChain, media: &MediaStore, msg: &Message, edited: bool) {
    let wrapper = TelegramMessageWrapper(msg);
    let mut record = wrapper.to_core();

    match download_media(bot, msg, media).await {
        Ok(Some((path, mime))) => record = record.with_file(path, mime),
        Ok(None) => {}
        Err(e) => error!(
            error = %e,
            chat_id = record.chat_id,
            message_id = record.message_id,
            "Media download failed, storing message without file"
        ),
    }

    let incoming = wrapper.to_incoming(record, edited);
    if let Err(e) = chain.handle(&incoming).await {
        error!(
            error = %e,
            retryable = e.is_retryable(),
            chat_id = incoming.chat.chat_id,
            message_id = incoming.message.message_id,
            "Handler chain failed"
        );
    }
}

/// Presses the chain would drop are left unanswered, so they cause no Telegram call at all.
async fn on_callback(bot: Bot, chain: HandlerChain, q: CallbackQuery) -> Result<()> {
    let (Some(data), Some(message)) = (q.data.as_ref(), q.message.as_ref()) else {
        return Ok(());
    };
    let query = CoreCallbackQuery {
        chat_id: message.chat().id.0,
        message_id: message.id().0 as i64,
        sender_id: q.from.id.0 as i64,
        data: data.clone(),
    };

    info!(
        chat_id = query.chat_id,
        message_id = query.message_id,
        sender_id = query.sender_id,
        data = %query.data,
        "Received button press"
    );
    if !chain.accepts_callback(&query).await {
        debug!(chat_id = query.chat_id, message_id = query.message_id, "Ignoring button press");
        return Ok(());
    }
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(error = %e, "Failed to answer callback query");
    }

    if let Err(e) = chain.handle_callback(&query).await {
        error!(
            error = %e,
            retryable = e.is_retryable(),
            chat_id = query.chat_id,
            message_id = query.message_id,
            "Callback handling failed"
        );
    }
    Ok(())
}
