//! `send` command: `send`, `send <dest>`, `send A->B`, `send A<-B`, `send A<->B`, plus the
//! button callbacks of the menus it raises.

use crate::callback::CallbackAction;
use crate::context::PipelineContext;
use crate::destination::parse_send_command;
use crate::forward::Forwarder;
use crate::menus::MenuFlow;
use crate::video::{find_video_for_message, was_giffed};
use async_trait::async_trait;
use pipeline_core::{
    CallbackQuery, Handler, HandlerResponse, IncomingMessage, MenuKind, Result,
};
use tracing::{debug, info, instrument};

const MSG_NO_VIDEO: &str = "I'm not sure which gif you want to send.";

#[derive(Clone)]
pub struct SendHelper {
    ctx: PipelineContext,
    menus: MenuFlow,
    forwarder: Forwarder,
}

impl SendHelper {
    pub fn new(ctx: PipelineContext) -> Self {
        let menus = MenuFlow::new(ctx.clone());
        let forwarder = Forwarder::new(ctx.clone(), menus.clone());
        Self {
            ctx,
            menus,
            forwarder,
        }
    }

    async fn confirm_send(
        &self,
        query: &CallbackQuery,
        video_id: i64,
        destination: &str,
    ) -> Result<HandlerResponse> {
        let video = self.ctx.lookup(query.chat_id, video_id).await?;
        let channel = self
            .ctx
            .registry
            .read()
            .await
            .find_destination(destination)
            .map(|c| c.chat.clone());
        let message = match channel {
            Some(channel) => {
                self.menus
                    .confirmation_menu(&video, channel.chat_id, &channel.title, query.sender_id)
                    .await?
            }
            None => {
                let text = format!("Unrecognised destination: {}", destination);
                self.ctx
                    .reply(query.chat_id, video.message_id, &text, None)
                    .await?
            }
        };
        Ok(HandlerResponse::Reply(vec![message]))
    }

    /// The `send` command once recognised. Errors end the command without further calls.
    async fn send_command(
        &self,
        message: &IncomingMessage,
        destination: &str,
    ) -> Result<HandlerResponse> {
        let command = &message.message;
        let sender_id = message.sender_id();
        info!(
            chat_id = command.chat_id,
            message_id = command.message_id,
            sender_id,
            destination = %destination,
            "Send command"
        );

        let video = find_video_for_message(&*self.ctx.registry.read().await, command);
        let Some(video) = video else {
            let reply = self
                .ctx
                .reply(command.chat_id, command.message_id, MSG_NO_VIDEO, None)
                .await?;
            return Ok(HandlerResponse::Reply(vec![reply]));
        };

        let replies = if was_giffed(&self.ctx.store, &video).await? {
            self.forwarder
                .handle_destination(command, &video, destination, sender_id)
                .await?
        } else {
            vec![
                self.menus
                    .not_giffed_warning(command, &video, destination, sender_id)
                    .await?,
            ]
        };
        Ok(HandlerResponse::Reply(replies))
    }

    async fn run_callback(
        &self,
        query: &CallbackQuery,
        action: CallbackAction,
    ) -> Result<HandlerResponse> {
        let chat_id = query.chat_id;
        match action {
            CallbackAction::ClearDestMenu => {
                self.menus.clear_destination_menus(chat_id).await?;
                Ok(HandlerResponse::Stop)
            }
            CallbackAction::ClearDeleteMenu => {
                self.menus.teardown(chat_id, MenuKind::Delete).await?;
                Ok(HandlerResponse::Stop)
            }
            CallbackAction::ConfirmSend {
                video_id,
                destination,
            } => self.confirm_send(query, video_id, &destination).await,
            CallbackAction::Send {
                video_id,
                destination,
            } => {
                let video = self.ctx.lookup(chat_id, video_id).await?;
                let replies = self
                    .forwarder
                    .send_video(&video, &destination, query.sender_id)
                    .await?;
                Ok(HandlerResponse::Reply(replies))
            }
            CallbackAction::ResumeSend {
                video_id,
                command_id,
                destination,
            } => {
                let video = self.ctx.lookup(chat_id, video_id).await?;
                let command = self.ctx.lookup(chat_id, command_id).await?;
                self.menus.teardown(chat_id, MenuKind::NotGiffed).await?;
                let replies = self
                    .forwarder
                    .handle_destination(&command, &video, &destination, query.sender_id)
                    .await?;
                Ok(HandlerResponse::Reply(replies))
            }
            CallbackAction::Delete { .. } => Ok(HandlerResponse::Continue),
        }
    }
}

#[async_trait]
impl Handler for SendHelper {
    fn name(&self) -> &'static str {
        "send"
    }

    #[instrument(skip(self, message))]
    async fn handle(&self, message: &IncomingMessage) -> Result<HandlerResponse> {
        let Some(destination) = message.message.text.as_deref().and_then(parse_send_command)
        else {
            return Ok(HandlerResponse::Continue);
        };
        let command = &message.message;
        match self.send_command(message, &destination).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.ctx
                    .report_failure(command.chat_id, Some(command.message_id), "send", e)
                    .await
            }
        }
    }

    #[instrument(skip(self, query), fields(data = %query.data))]
    async fn handle_callback(&self, query: &CallbackQuery) -> Result<HandlerResponse> {
        let action = match CallbackAction::parse(&query.data) {
            Ok(action) => action,
            Err(e) => {
                debug!(error = %e, "Not a send callback");
                return Ok(HandlerResponse::Continue);
            }
        };
        let reply_to = match &action {
            CallbackAction::ConfirmSend { video_id, .. }
            | CallbackAction::Send { video_id, .. }
            | CallbackAction::ResumeSend { video_id, .. } => *video_id,
            _ => query.message_id,
        };
        match self.run_callback(query, action).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.ctx
                    .report_failure(query.chat_id, Some(reply_to), "send", e)
                    .await
            }
        }
    }
}
