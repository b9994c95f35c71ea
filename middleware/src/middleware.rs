use async_trait::async_trait;
use pipeline_core::{HandlerResponse, IncomingMessage, Middleware, Result, SharedRegistry};
use tracing::{debug, info, instrument};

pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &IncomingMessage) -> Result<bool> {
        info!(
            sender_id = message.sender_id(),
            chat_id = message.chat.chat_id,
            chat_title = %message.chat.title,
            message_id = message.message.message_id,
            has_video = message.message.has_video(),
            edited = message.edited,
            text = %message.message.text.as_deref().unwrap_or(""),
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &IncomingMessage, response: &HandlerResponse) -> Result<()> {
        debug!(
            message_id = message.message.message_id,
            response = ?response,
            "Processed message"
        );
        Ok(())
    }
}

/// Lets only messages from configured groups through to the helpers. Messages elsewhere are
/// still observed by the middleware placed before this one.
pub struct GroupFilterMiddleware {
    registry: SharedRegistry,
}

impl GroupFilterMiddleware {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Middleware for GroupFilterMiddleware {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &IncomingMessage) -> Result<bool> {
        let chat_id = message.chat.chat_id;
        if self.registry.read().await.is_group(chat_id) {
            Ok(true)
        } else {
            debug!(chat_id = chat_id, "Not a command group, skipping helpers");
            Ok(false)
        }
    }
}
