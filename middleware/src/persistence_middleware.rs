use async_trait::async_trait;
use pipeline_core::{
    HandlerResponse, IncomingMessage, Middleware, PipelineError, Result, SharedRegistry,
};
use storage::Store;
use tracing::{debug, error, info, instrument};

/// Upserts the chat and the message of every observation (edits included), then caches the
/// message in its chat's registry entry.
#[derive(Clone)]
pub struct PersistenceMiddleware {
    store: Store,
    registry: SharedRegistry,
}

impl PersistenceMiddleware {
    pub fn new(store: Store, registry: SharedRegistry) -> Self {
        Self { store, registry }
    }
}

#[async_trait]
impl Middleware for PersistenceMiddleware {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &IncomingMessage) -> Result<bool> {
        info!(
            chat_id = message.chat.chat_id,
            message_id = message.message.message_id,
            edited = message.edited,
            "step: PersistenceMiddleware before, saving message"
        );

        self.store.chats.save_chat(&message.chat).await.map_err(|e| {
            error!(error = %e, chat_id = message.chat.chat_id, "Failed to save chat");
            PipelineError::persistence("save chat", e)
        })?;
        self.store
            .messages
            .save_message(&message.message)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    chat_id = message.chat.chat_id,
                    message_id = message.message.message_id,
                    "Failed to save message"
                );
                PipelineError::persistence("save message", e)
            })?;

        let mut registry = self.registry.write().await;
        registry.update_chat(&message.chat);
        if !registry.add_message(message.message.clone()) {
            debug!(
                chat_id = message.chat.chat_id,
                "Chat is not in the roster, message not cached"
            );
        }

        info!(
            chat_id = message.chat.chat_id,
            message_id = message.message.message_id,
            "step: PersistenceMiddleware before done, message saved"
        );
        Ok(true)
    }

    #[instrument(skip(self, _message, response))]
    async fn after(&self, _message: &IncomingMessage, response: &HandlerResponse) -> Result<()> {
        debug!(
            replies = response.messages().len(),
            "step: PersistenceMiddleware after"
        );
        Ok(())
    }
}
