//! Everything the helpers share: the transport, the store, the chat and menu registries, and
//! the local media area. Every message this system creates goes through [`PipelineContext::record`]
//! so the store and the chat caches stay in step with the platform.

use pipeline_core::{
    Bot, ButtonRows, HandlerError, HandlerResponse, MediaStore, MenuRegistry, MessageKey,
    MessageRecord, PipelineError, Result, SharedRegistry,
};
use std::collections::HashSet;
use std::sync::Arc;
use storage::Store;
use tracing::{debug, error, instrument};

#[derive(Clone)]
pub struct PipelineContext {
    pub bot: Arc<dyn Bot>,
    pub store: Store,
    pub registry: SharedRegistry,
    pub menus: Arc<MenuRegistry>,
    pub media: MediaStore,
}

impl PipelineContext {
    pub fn new(
        bot: Arc<dyn Bot>,
        store: Store,
        registry: SharedRegistry,
        menus: Arc<MenuRegistry>,
        media: MediaStore,
    ) -> Self {
        Self {
            bot,
            store,
            registry,
            menus,
            media,
        }
    }

    /// Persists and caches a message that already exists on the platform. A store failure here
    /// cannot be undone on the platform side, so it is logged for reconciliation and returned
    /// as a retryable error.
    pub async fn record(&self, message: &MessageRecord) -> Result<()> {
        if let Err(e) = self.store.messages.save_message(message).await {
            error!(
                error = %e,
                chat_id = message.chat_id,
                message_id = message.message_id,
                "Message exists on the platform but was not stored, manual reconciliation required"
            );
            return Err(PipelineError::persistence("save sent message", e));
        }
        self.registry.write().await.add_message(message.clone());
        Ok(())
    }

    /// Drops the stored record and the cached copy of a message.
    pub async fn forget(&self, key: MessageKey) -> Result<()> {
        if let Err(e) = self.store.messages.remove_message(key).await {
            error!(
                error = %e,
                chat_id = key.chat_id,
                message_id = key.message_id,
                "Message is gone from the platform but still stored, manual reconciliation required"
            );
            return Err(PipelineError::persistence("remove deleted message", e));
        }
        self.registry.write().await.remove_message(key);
        Ok(())
    }

    /// Sends a text reply and records it.
    #[instrument(skip(self, text, buttons))]
    pub async fn reply(
        &self,
        chat_id: i64,
        reply_to: i64,
        text: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<MessageRecord> {
        let message = self
            .bot
            .send_text(chat_id, text, Some(reply_to), buttons)
            .await?;
        self.record(&message).await?;
        debug!(
            chat_id = chat_id,
            message_id = message.message_id,
            "Sent reply"
        );
        Ok(message)
    }

    /// Turns a transport or store failure of a command into a text reply to the operator and
    /// ends the command. Other errors are passed on unchanged.
    pub async fn report_failure(
        &self,
        chat_id: i64,
        reply_to: Option<i64>,
        action: &str,
        err: PipelineError,
    ) -> Result<HandlerResponse> {
        if !matches!(
            err,
            PipelineError::Transport(_) | PipelineError::Persistence { .. }
        ) {
            return Err(err);
        }
        error!(error = %err, chat_id, action, "Command failed, reporting to operator");
        let text = format!("Failed to {}: {}", action, err);
        let message = self.bot.send_text(chat_id, &text, reply_to, None).await?;
        self.record(&message).await?;
        Ok(HandlerResponse::Reply(vec![message]))
    }

    /// Deletes a message on the platform, then its record and cache entry.
    pub async fn delete(&self, message: &MessageRecord) -> Result<()> {
        self.bot
            .delete_message(message.chat_id, message.message_id)
            .await?;
        self.forget(message.key()).await
    }

    /// A message of the chat, from the cache or else from the store.
    pub async fn lookup(&self, chat_id: i64, message_id: i64) -> Result<MessageRecord> {
        if let Some(message) = self.registry.read().await.message(chat_id, message_id) {
            return Ok(message);
        }
        let key = MessageKey {
            chat_id,
            message_id,
            is_scheduled: false,
        };
        self.store
            .messages
            .get_message(key)
            .await
            .map_err(|e| PipelineError::persistence("load message", e))?
            .ok_or_else(|| HandlerError::UnknownMessage(message_id).into())
    }

    pub async fn posters(&self, chat_id: i64) -> Result<HashSet<i64>> {
        self.bot.list_authorized_posters(chat_id).await
    }

    pub async fn deleters(&self, chat_id: i64) -> Result<HashSet<i64>> {
        self.bot.list_authorized_deleters(chat_id).await
    }

    /// Copies the media of `source` into the local area of `target` and returns `target`
    /// pointing at the copy. When the copy fails the record keeps referencing the source file.
    pub async fn attach_media(
        &self,
        source: &MessageRecord,
        mut target: MessageRecord,
    ) -> MessageRecord {
        let Some(path) = source.file_path.as_deref() else {
            return target;
        };
        let copied = match self
            .media
            .copy_into(path, target.chat_id, target.message_id)
            .await
        {
            Ok(copied) => copied,
            Err(e) => {
                error!(
                    error = %e,
                    source = %path,
                    chat_id = target.chat_id,
                    message_id = target.message_id,
                    "Failed to copy media, keeping source path"
                );
                path.to_string()
            }
        };
        target.file_path = Some(copied);
        target.file_mime_type = source.file_mime_type.clone();
        target
    }
}
