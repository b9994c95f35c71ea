//! `delete` command and the `delete:<messageId>` button: removes a video's whole message
//! family from the chat, the store and the local media area.

use crate::callback::CallbackAction;
use crate::context::PipelineContext;
use async_trait::async_trait;
use pipeline_core::{
    CallbackQuery, Handler, HandlerResponse, IncomingMessage, MessageRecord, PipelineError,
    Result,
};
use tracing::{info, instrument};

const MSG_NO_VIDEO: &str = "I'm not sure which gif you want to delete.";
const MSG_NO_PERMISSION: &str = "You do not have permission to delete messages in this chat.";

#[derive(Clone)]
pub struct DeleteHelper {
    ctx: PipelineContext,
}

impl DeleteHelper {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// The video the command carries or replies to.
    async fn target(&self, command: &MessageRecord) -> Result<Option<MessageRecord>> {
        if command.has_video() {
            return Ok(Some(command.clone()));
        }
        let Some(reply_to) = command.reply_to else {
            return Ok(None);
        };
        let target = self.ctx.lookup(command.chat_id, reply_to).await?;
        Ok(target.has_video().then_some(target))
    }

    /// Deletes every message of the family on the platform, drops their records and their
    /// local media. Menus shown by those messages are dropped first.
    #[instrument(skip(self, anchor), fields(chat_id = anchor.chat_id, message_id = anchor.message_id))]
    pub async fn delete_family(&self, anchor: &MessageRecord) -> Result<usize> {
        let family = self
            .ctx
            .store
            .messages
            .get_message_family(anchor)
            .await
            .map_err(|e| PipelineError::persistence("load message family", e))?;
        let ids: Vec<i64> = family.iter().map(|m| m.message_id).collect();
        self.ctx.menus.forget_messages(anchor.chat_id, &ids).await;

        for member in &family {
            self.ctx.delete(member).await?;
            if let Some(path) = member.file_path.as_deref() {
                self.ctx.media.remove(path).await;
            }
        }
        info!(deleted = family.len(), "Message family deleted");
        Ok(family.len())
    }

    /// The `delete` command once recognised.
    async fn delete_command(&self, message: &IncomingMessage) -> Result<HandlerResponse> {
        let command = &message.message;
        let Some(target) = self.target(command).await? else {
            let reply = self
                .ctx
                .reply(command.chat_id, command.message_id, MSG_NO_VIDEO, None)
                .await?;
            return Ok(HandlerResponse::Reply(vec![reply]));
        };
        if !self
            .ctx
            .deleters(command.chat_id)
            .await?
            .contains(&message.sender_id())
        {
            let reply = self
                .ctx
                .reply(command.chat_id, command.message_id, MSG_NO_PERMISSION, None)
                .await?;
            return Ok(HandlerResponse::Reply(vec![reply]));
        }
        self.delete_family(&target).await?;
        Ok(HandlerResponse::Stop)
    }
}

#[async_trait]
impl Handler for DeleteHelper {
    fn name(&self) -> &'static str {
        "delete"
    }

    /// Failures are reported without a reply target: the command may itself belong to the
    /// family being removed.
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &IncomingMessage) -> Result<HandlerResponse> {
        if message.message.clean_text() != "delete" {
            return Ok(HandlerResponse::Continue);
        }
        match self.delete_command(message).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.ctx
                    .report_failure(message.chat.chat_id, None, "delete", e)
                    .await
            }
        }
    }

    #[instrument(skip(self, query), fields(data = %query.data))]
    async fn handle_callback(&self, query: &CallbackQuery) -> Result<HandlerResponse> {
        let Ok(CallbackAction::Delete { message_id }) = CallbackAction::parse(&query.data) else {
            return Ok(HandlerResponse::Continue);
        };
        let anchor = self.ctx.lookup(query.chat_id, message_id).await?;
        match self.delete_family(&anchor).await {
            Ok(_) => Ok(HandlerResponse::Stop),
            Err(e) => self.ctx.report_failure(query.chat_id, None, "delete", e).await,
        }
    }
}
