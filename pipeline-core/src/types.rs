//! Core event types, handler response, and the Handler / Middleware traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storage::{ChatRecord, MessageRecord};

/// A message observed in a chat, already converted from the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat: ChatRecord,
    pub message: MessageRecord,
    /// True when this is a new version of an already observed message.
    pub edited: bool,
}

impl IncomingMessage {
    pub fn new(chat: ChatRecord, message: MessageRecord) -> Self {
        Self {
            chat,
            message,
            edited: false,
        }
    }

    pub fn sender_id(&self) -> i64 {
        self.message.sender_id
    }
}

/// A button press on a menu message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub chat_id: i64,
    /// The message carrying the pressed button.
    pub message_id: i64,
    pub sender_id: i64,
    pub data: String,
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResponse {
    /// Not for this handler; try the next one.
    Continue,
    /// Handled, nothing new was posted.
    Stop,
    /// Handled; the messages this handler created, in order.
    Reply(Vec<MessageRecord>),
}

impl HandlerResponse {
    pub fn is_handled(&self) -> bool {
        !matches!(self, HandlerResponse::Continue)
    }

    pub fn messages(&self) -> &[MessageRecord] {
        match self {
            HandlerResponse::Reply(messages) => messages,
            _ => &[],
        }
    }
}

/// One command helper. The chain offers each message to handlers in registration order and
/// stops at the first response other than `Continue`.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, _message: &IncomingMessage) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }

    /// Called with callbacks that already passed menu authorization.
    async fn handle_callback(
        &self,
        _query: &CallbackQuery,
    ) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
}

/// Runs around handlers: `before` in order (false stops the chain), `after` in reverse.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn before(&self, _message: &IncomingMessage) -> crate::error::Result<bool> {
        Ok(true)
    }

    async fn after(
        &self,
        _message: &IncomingMessage,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
