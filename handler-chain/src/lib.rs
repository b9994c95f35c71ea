//! # Handler chain
//!
//! Runs middleware (before/after) and the registered helpers for each observed message. The
//! first helper returning something other than `Continue` ends dispatch; `after` callbacks run
//! in reverse order. Button callbacks go through the menu authorization gate first and are then
//! offered to the helpers in the same order.

use pipeline_core::{
    CallbackQuery, Handler, HandlerResponse, IncomingMessage, MenuRegistry, Middleware, Result,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct HandlerChain {
    middleware: Vec<Arc<dyn Middleware>>,
    handlers: Vec<Arc<dyn Handler>>,
    menus: Arc<MenuRegistry>,
}

impl HandlerChain {
    /// Creates an empty chain gated by the given menu registry.
    pub fn new(menus: Arc<MenuRegistry>) -> Self {
        Self {
            middleware: Vec::new(),
            handlers: Vec::new(),
            menus,
        }
    }

    /// Appends a middleware (runs before handlers, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a handler (offered messages in registration order).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Runs middleware before, then handlers (skipped for edits); then middleware after in
    /// reverse. Returns the first handled response, or Continue.
    #[instrument(skip(self, message))]
    pub async fn handle(&self, message: &IncomingMessage) -> Result<HandlerResponse> {
        let mut final_response = HandlerResponse::Continue;

        info!(
            sender_id = message.sender_id(),
            chat_id = message.chat.chat_id,
            message_id = message.message.message_id,
            edited = message.edited,
            "step: handler_chain started"
        );

        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            if !mw.before(message).await? {
                info!(
                    middleware = %mw_name,
                    "step: middleware before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
            debug!(middleware = %mw_name, "step: middleware before done");
        }

        if !message.edited {
            for handler in &self.handlers {
                let response = handler.handle(message).await?;
                debug!(
                    handler = handler.name(),
                    response = ?response,
                    "Handler processed"
                );
                if response.is_handled() {
                    info!(
                        handler = handler.name(),
                        replies = response.messages().len(),
                        "step: handler chain stopped by handler"
                    );
                    final_response = response;
                    break;
                }
            }
        }

        for mw in self.middleware.iter().rev() {
            mw.after(message, &final_response).await?;
        }

        info!(
            chat_id = message.chat.chat_id,
            message_id = message.message.message_id,
            "step: handler_chain finished"
        );

        Ok(final_response)
    }

    /// True when the press is on an active menu and comes from that menu's operator.
    pub async fn accepts_callback(&self, query: &CallbackQuery) -> bool {
        self.menus
            .is_authorized(query.chat_id, query.message_id, query.sender_id)
            .await
    }

    /// Dispatches a button press. Presses on messages that are not active menus, or by anyone
    /// but the menu's operator, are dropped without touching any state.
    #[instrument(skip(self, query), fields(chat_id = query.chat_id, message_id = query.message_id))]
    pub async fn handle_callback(&self, query: &CallbackQuery) -> Result<HandlerResponse> {
        if !self.accepts_callback(query).await {
            debug!(sender_id = query.sender_id, "Ignoring callback from non-owner");
            return Ok(HandlerResponse::Stop);
        }

        for handler in &self.handlers {
            let response = handler.handle_callback(query).await?;
            if response.is_handled() {
                info!(
                    handler = handler.name(),
                    data = %query.data,
                    "step: callback handled"
                );
                return Ok(response);
            }
        }

        debug!(data = %query.data, "Callback not handled by any handler");
        Ok(HandlerResponse::Continue)
    }
}
