//! Component assembly: store, registries, helpers, handler chain and the Telegram dispatcher.

use crate::config::{PipelineConfig, Roster};
use anyhow::Result;
use handler_chain::HandlerChain;
use middleware::{GroupFilterMiddleware, LoggingMiddleware, PersistenceMiddleware};
use pipeline_core::{
    init_tracing, Bot, Channel, ChatRecord, ChatRegistry, Group, MediaStore, MenuRegistry,
    MessageCache, SharedRegistry, Store,
};
use pipeline_helpers::{DeleteHelper, PipelineContext, SendHelper};
use pipeline_telegram::{run_dispatcher, TelegramBotAdapter, TelegramConfig};
use std::sync::Arc;
use tracing::{info, instrument};

/// Chat record for a configured chat: the stored title when the chat was seen before, the
/// configured username taking precedence over the stored one.
async fn configured_chat(
    store: &Store,
    chat_id: i64,
    username: Option<&str>,
) -> Result<ChatRecord> {
    let stored = store.chats.get_chat(chat_id).await?;
    let username = username
        .map(|u| u.trim_start_matches('@').to_string())
        .or_else(|| stored.as_ref().and_then(|c| c.username.clone()));
    let title = stored
        .map(|c| c.title)
        .filter(|t| !t.is_empty())
        .or_else(|| username.clone())
        .unwrap_or_else(|| chat_id.to_string());
    Ok(ChatRecord::new(chat_id, username, title))
}

/// Posted messages already stored for the chat.
async fn preload_cache(store: &Store, chat_id: i64) -> Result<MessageCache> {
    let mut cache = MessageCache::default();
    for message in store.messages.list_messages_for_chat(chat_id).await? {
        if !message.is_scheduled {
            cache.add(message);
        }
    }
    Ok(cache)
}

/// Builds the chat registry from the roster, preloading each chat's cache from the store.
#[instrument(skip(roster, store))]
pub async fn build_registry(roster: &Roster, store: &Store) -> Result<ChatRegistry> {
    let mut groups = Vec::with_capacity(roster.groups.len());
    for entry in &roster.groups {
        let mut group = Group::new(configured_chat(store, entry.chat_id, entry.username.as_deref()).await?);
        group.messages = preload_cache(store, entry.chat_id).await?;
        groups.push(group);
    }

    let mut channels = Vec::with_capacity(roster.channels.len());
    for entry in &roster.channels {
        let chat = configured_chat(store, entry.chat_id, entry.username.as_deref()).await?;
        let mut channel = Channel::new(chat, entry.read_only);
        channel.messages = preload_cache(store, entry.chat_id).await?;
        channels.push(channel);
    }

    info!(
        groups = groups.len(),
        channels = channels.len(),
        "step: chat registry built"
    );
    Ok(ChatRegistry::new(groups, channels))
}

/// Middleware and helpers in dispatch order: logging, persistence, group filter, then the
/// send and delete helpers.
pub fn build_chain(ctx: PipelineContext) -> HandlerChain {
    HandlerChain::new(ctx.menus.clone())
        .add_middleware(Arc::new(LoggingMiddleware))
        .add_middleware(Arc::new(PersistenceMiddleware::new(
            ctx.store.clone(),
            ctx.registry.clone(),
        )))
        .add_middleware(Arc::new(GroupFilterMiddleware::new(ctx.registry.clone())))
        .add_handler(Arc::new(SendHelper::new(ctx.clone())))
        .add_handler(Arc::new(DeleteHelper::new(ctx)))
}

/// Initializes tracing, assembles all components and runs the dispatcher until interrupted.
pub async fn run(config: PipelineConfig, telegram: TelegramConfig) -> Result<()> {
    init_tracing(&config.log_file)?;
    info!(
        database_url = %config.database_url,
        roster = %config.roster_path,
        media_dir = %config.media_dir,
        "step: starting gif pipeline"
    );

    let roster = Roster::load(&config.roster_path)?;
    let store = Store::open(&config.database_url).await?;
    let registry: SharedRegistry = build_registry(&roster, &store).await?.into_shared();

    let bot = telegram.build_bot()?;
    let transport: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(bot.clone()));
    let menus = Arc::new(MenuRegistry::new());
    let media = MediaStore::new(&config.media_dir);
    let ctx = PipelineContext::new(transport, store, registry, menus, media.clone());

    let chain = build_chain(ctx);
    info!("step: handler chain ready, starting dispatcher");
    run_dispatcher(bot, chain, media).await
}
