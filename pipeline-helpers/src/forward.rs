//! Sending a video onward: directly to one channel, through an intermediate channel
//! (one-way forward), or both ways between two channels.
//!
//! A one-way forward is three independent steps: post into the source channel, forward that
//! post to the target, delete the intermediate post. A failure in the second step leaves the
//! intermediate post in place; a failure in the third is only logged.

use crate::context::PipelineContext;
use crate::destination::DestinationPlan;
use crate::menus::MenuFlow;
use pipeline_core::{ChatRecord, HandlerError, MessageRecord, Result};
use tracing::{error, info, instrument, warn};

pub const NO_PERMISSION_TEXT: &str = "You do not have permission to post in that channel.";
pub const NOT_ADMIN_OF_BOTH_TEXT: &str =
    "You need to be an admin of both channels to send a forwarded video.";

#[derive(Clone)]
pub struct Forwarder {
    ctx: PipelineContext,
    menus: MenuFlow,
}

impl Forwarder {
    pub fn new(ctx: PipelineContext, menus: MenuFlow) -> Self {
        Self { ctx, menus }
    }

    async fn find_destination(&self, identifier: &str) -> Option<ChatRecord> {
        self.ctx
            .registry
            .read()
            .await
            .find_destination(identifier)
            .map(|c| c.chat.clone())
    }

    /// Runs the plan parsed from `destination` for the video. Replies go to `command`.
    #[instrument(skip(self, command, video))]
    pub async fn handle_destination(
        &self,
        command: &MessageRecord,
        video: &MessageRecord,
        destination: &str,
        sender_id: i64,
    ) -> Result<Vec<MessageRecord>> {
        match DestinationPlan::parse(destination) {
            DestinationPlan::Menu => Ok(vec![
                self.menus.destination_menu(command, video, sender_id).await?,
            ]),
            DestinationPlan::Direct(target) => self.send_video(video, &target, sender_id).await,
            DestinationPlan::Forward { from, to } => {
                self.send_forward(command, video, &from, &to, sender_id)
                    .await
            }
            DestinationPlan::TwoWay { first, second } => {
                self.send_two_way_forward(command, video, &first, &second, sender_id)
                    .await
            }
        }
    }

    /// Posts the video into one channel.
    #[instrument(skip(self, video))]
    pub async fn send_video(
        &self,
        video: &MessageRecord,
        destination_id: &str,
        sender_id: i64,
    ) -> Result<Vec<MessageRecord>> {
        let chat_id = video.chat_id;
        let Some(destination) = self.find_destination(destination_id).await else {
            let text = format!("Unrecognised destination: {}", destination_id);
            return Ok(vec![self.ctx.reply(chat_id, video.message_id, &text, None).await?]);
        };
        if !self
            .ctx
            .posters(destination.chat_id)
            .await?
            .contains(&sender_id)
        {
            return Ok(vec![
                self.ctx
                    .reply(chat_id, video.message_id, NO_PERMISSION_TEXT, None)
                    .await?,
            ]);
        }

        let sent = self.post_video(video, destination.chat_id).await?;
        info!(
            video_id = video.message_id,
            destination = destination.chat_id,
            message_id = sent.message_id,
            "Video sent"
        );

        let confirm_text = format!("This gif has been sent to {}.", destination.title);
        self.finish(video, sent, &confirm_text, sender_id).await
    }

    /// Posts the video into `from`, forwards that post into `to`, then removes the post from
    /// `from`. The sender must be allowed to post in both.
    #[instrument(skip(self, command, video))]
    pub async fn send_forward(
        &self,
        command: &MessageRecord,
        video: &MessageRecord,
        from: &str,
        to: &str,
        sender_id: i64,
    ) -> Result<Vec<MessageRecord>> {
        let chat_id = command.chat_id;
        let Some(chat_from) = self.find_destination(from).await else {
            let text = format!("Unrecognised destination from: {}", from);
            return Ok(vec![self.ctx.reply(chat_id, command.message_id, &text, None).await?]);
        };
        let Some(chat_to) = self.find_destination(to).await else {
            let text = format!("Unrecognised destination to: {}", to);
            return Ok(vec![self.ctx.reply(chat_id, command.message_id, &text, None).await?]);
        };

        let (from_posters, to_posters) = futures::try_join!(
            self.ctx.posters(chat_from.chat_id),
            self.ctx.posters(chat_to.chat_id)
        )?;
        if !from_posters.contains(&sender_id) || !to_posters.contains(&sender_id) {
            return Ok(vec![
                self.ctx
                    .reply(chat_id, command.message_id, NOT_ADMIN_OF_BOTH_TEXT, None)
                    .await?,
            ]);
        }

        let intermediate = self.post_video(video, chat_from.chat_id).await?;

        let forwarded = self
            .ctx
            .bot
            .forward_message(chat_from.chat_id, intermediate.message_id, chat_to.chat_id)
            .await
            .inspect_err(|e| {
                error!(
                    error = %e,
                    from = chat_from.chat_id,
                    intermediate_id = intermediate.message_id,
                    "Forward failed, intermediate post left in source channel"
                );
            })?;
        let forwarded = self.ctx.attach_media(&intermediate, forwarded).await;
        self.ctx.record(&forwarded).await?;

        self.cleanup_intermediate(&intermediate, &[video, &forwarded])
            .await;
        info!(
            video_id = video.message_id,
            from = chat_from.chat_id,
            to = chat_to.chat_id,
            message_id = forwarded.message_id,
            "Video forwarded"
        );

        let confirm_text = format!(
            "This gif has been sent to {} via {}",
            chat_to.title, chat_from.title
        );
        self.finish(video, forwarded, &confirm_text, sender_id).await
    }

    /// `first -> second`, then `second -> first`. A failing leg is reported and does not stop
    /// the other one.
    #[instrument(skip(self, command, video))]
    pub async fn send_two_way_forward(
        &self,
        command: &MessageRecord,
        video: &MessageRecord,
        first: &str,
        second: &str,
        sender_id: i64,
    ) -> Result<Vec<MessageRecord>> {
        let mut messages = Vec::new();
        for (from, to) in [(first, second), (second, first)] {
            match self.send_forward(command, video, from, to, sender_id).await {
                Ok(sent) => messages.extend(sent),
                Err(e) => {
                    warn!(error = %e, from = %from, to = %to, "Forward leg failed");
                    let text = format!("Failed to send via {} to {}: {}", from, to, e);
                    messages.push(
                        self.ctx
                            .reply(command.chat_id, command.message_id, &text, None)
                            .await?,
                    );
                }
            }
        }
        Ok(messages)
    }

    /// Uploads the video's file into `chat_id` and records the new post with its own copy.
    async fn post_video(&self, video: &MessageRecord, chat_id: i64) -> Result<MessageRecord> {
        let path = video
            .file_path
            .as_deref()
            .ok_or(HandlerError::MissingMedia(video.message_id))?;
        let sent = self.ctx.bot.send_video(chat_id, path, None, None).await?;
        let sent = self.ctx.attach_media(video, sent).await;
        self.ctx.record(&sent).await?;
        Ok(sent)
    }

    /// Deletes the intermediate post and its media file unless one of `keep` still uses that file.
    async fn cleanup_intermediate(&self, intermediate: &MessageRecord, keep: &[&MessageRecord]) {
        if let Err(e) = self.ctx.delete(intermediate).await {
            warn!(
                error = %e,
                chat_id = intermediate.chat_id,
                message_id = intermediate.message_id,
                "Failed to clean up intermediate post"
            );
            return;
        }
        let Some(path) = intermediate.file_path.as_deref() else {
            return;
        };
        if keep.iter().all(|m| m.file_path.as_deref() != Some(path)) {
            self.ctx.media.remove(path).await;
        }
    }

    /// Offers the delete menu, then clears the picker menus of the chat.
    async fn finish(
        &self,
        video: &MessageRecord,
        sent: MessageRecord,
        confirm_text: &str,
        sender_id: i64,
    ) -> Result<Vec<MessageRecord>> {
        let confirm = self
            .menus
            .after_send_delete_menu(video, confirm_text, sender_id)
            .await?;
        self.menus.clear_destination_menus(video.chat_id).await?;
        let mut messages = vec![sent];
        messages.extend(confirm);
        Ok(messages)
    }
}
