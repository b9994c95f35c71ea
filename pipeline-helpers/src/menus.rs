//! Menu lifecycle: at most one active menu per chat and kind. Raising a menu tears the previous
//! one of its slot down first. The channel picker and the not-giffed warning share a flow, so
//! raising either clears both.

use crate::callback::CallbackAction;
use crate::context::PipelineContext;
use futures::future::join_all;
use pipeline_core::{ActiveMenu, Button, ButtonRows, MenuKind, MessageRecord, Result};
use tracing::{info, instrument, warn};

pub const NOT_GIFFED_TEXT: &str =
    "It looks like this video has not been giffed. Are you sure you want to send it?";
pub const PICK_CHANNEL_TEXT: &str = "Which channel should this video be sent to?";
pub const NO_CHANNELS_TEXT: &str = "You do not have permission to send to any available channels.";
const DELETE_QUESTION: &str = "\nWould you like to delete the message family?";

#[derive(Clone)]
pub struct MenuFlow {
    ctx: PipelineContext,
}

impl MenuFlow {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// Takes the menu out of its slot and removes it from the chat. Picker and warning menus
    /// are deleted; delete menus are edited down to their terminal text.
    #[instrument(skip(self))]
    pub async fn teardown(&self, chat_id: i64, kind: MenuKind) -> Result<()> {
        let Some(menu) = self.ctx.menus.take(chat_id, kind).await else {
            return Ok(());
        };
        self.dismiss(menu).await
    }

    async fn dismiss(&self, menu: ActiveMenu) -> Result<()> {
        let chat_id = menu.chat_id();
        let message_id = menu.message.message_id;
        match (menu.kind, menu.terminal_text) {
            (MenuKind::Delete, Some(text)) => {
                match self.ctx.bot.edit_message(chat_id, message_id, &text, None).await {
                    Ok(mut edited) => {
                        edited.reply_to = edited.reply_to.or(menu.message.reply_to);
                        self.ctx.record(&edited).await?
                    }
                    Err(e) => warn!(error = %e, chat_id, message_id, "Failed to close menu"),
                }
            }
            _ => match self.ctx.bot.delete_message(chat_id, message_id).await {
                Ok(()) => self.ctx.forget(menu.message.key()).await?,
                Err(e) => warn!(error = %e, chat_id, message_id, "Failed to delete menu"),
            },
        }
        info!(chat_id, message_id, kind = ?menu.kind, "Menu torn down");
        Ok(())
    }

    /// Clears the picker and the not-giffed warning of the chat.
    pub async fn clear_destination_menus(&self, chat_id: i64) -> Result<()> {
        self.teardown(chat_id, MenuKind::Destination).await?;
        self.teardown(chat_id, MenuKind::NotGiffed).await
    }

    async fn raise(&self, menu: ActiveMenu) -> Result<()> {
        if let Some(previous) = self.ctx.menus.register(menu).await {
            self.dismiss(previous).await?;
        }
        Ok(())
    }

    /// Asks whether an un-giffed video should really be sent. Confirming resumes the same
    /// destination text.
    #[instrument(skip(self, command, video))]
    pub async fn not_giffed_warning(
        &self,
        command: &MessageRecord,
        video: &MessageRecord,
        destination: &str,
        sender_id: i64,
    ) -> Result<MessageRecord> {
        let chat_id = command.chat_id;
        self.clear_destination_menus(chat_id).await?;
        let resume = CallbackAction::ResumeSend {
            video_id: video.message_id,
            command_id: command.message_id,
            destination: destination.to_string(),
        };
        let buttons: ButtonRows = vec![
            vec![Button::new("Yes, I am sure", resume.to_string())],
            vec![Button::new(
                "No thanks!",
                CallbackAction::ClearDestMenu.to_string(),
            )],
        ];
        let message = self
            .ctx
            .reply(chat_id, command.message_id, NOT_GIFFED_TEXT, Some(&buttons))
            .await?;
        self.raise(ActiveMenu {
            kind: MenuKind::NotGiffed,
            message: message.clone(),
            owner_id: sender_id,
            video_id: video.message_id,
            terminal_text: None,
        })
        .await?;
        Ok(message)
    }

    /// Lists every writable channel the sender may post in. Poster sets are fetched
    /// concurrently and the buttons keep declaration order.
    #[instrument(skip(self, command, video))]
    pub async fn destination_menu(
        &self,
        command: &MessageRecord,
        video: &MessageRecord,
        sender_id: i64,
    ) -> Result<MessageRecord> {
        let chat_id = command.chat_id;
        self.clear_destination_menus(chat_id).await?;

        let channels: Vec<_> = self
            .ctx
            .registry
            .read()
            .await
            .writable_channels()
            .map(|c| c.chat.clone())
            .collect();
        let posters = join_all(channels.iter().map(|c| self.ctx.posters(c.chat_id))).await;

        let mut buttons: ButtonRows = Vec::new();
        for (channel, posters) in channels.iter().zip(posters) {
            if posters?.contains(&sender_id) {
                let confirm = CallbackAction::ConfirmSend {
                    video_id: video.message_id,
                    destination: channel.chat_id.to_string(),
                };
                buttons.push(vec![Button::new(channel.title.clone(), confirm.to_string())]);
            }
        }

        if buttons.is_empty() {
            return self
                .ctx
                .reply(chat_id, command.message_id, NO_CHANNELS_TEXT, None)
                .await;
        }

        let message = self
            .ctx
            .reply(chat_id, video.message_id, PICK_CHANNEL_TEXT, Some(&buttons))
            .await?;
        self.raise(ActiveMenu {
            kind: MenuKind::Destination,
            message: message.clone(),
            owner_id: sender_id,
            video_id: video.message_id,
            terminal_text: None,
        })
        .await?;
        Ok(message)
    }

    /// Turns the picker into a yes/no confirmation for one channel. Without an active picker
    /// the confirmation is posted as a reply to the video.
    #[instrument(skip(self, video))]
    pub async fn confirmation_menu(
        &self,
        video: &MessageRecord,
        destination_id: i64,
        destination_title: &str,
        sender_id: i64,
    ) -> Result<MessageRecord> {
        let chat_id = video.chat_id;
        let text = format!(
            "Are you sure you want to send this video to {}?",
            destination_title
        );
        let send = CallbackAction::Send {
            video_id: video.message_id,
            destination: destination_id.to_string(),
        };
        let buttons: ButtonRows = vec![
            vec![Button::new("I am sure", send.to_string())],
            vec![Button::new("No thanks", CallbackAction::ClearDestMenu.to_string())],
        ];

        let message = match self.ctx.menus.get(chat_id, MenuKind::Destination).await {
            Some(menu) => {
                let mut edited = self
                    .ctx
                    .bot
                    .edit_message(chat_id, menu.message.message_id, &text, Some(&buttons))
                    .await?;
                edited.reply_to = edited.reply_to.or(menu.message.reply_to);
                self.ctx.record(&edited).await?;
                edited
            }
            None => {
                self.ctx
                    .reply(chat_id, video.message_id, &text, Some(&buttons))
                    .await?
            }
        };
        self.ctx
            .menus
            .register(ActiveMenu {
                kind: MenuKind::Destination,
                message: message.clone(),
                owner_id: sender_id,
                video_id: video.message_id,
                terminal_text: None,
            })
            .await;
        Ok(message)
    }

    /// Offers to delete the video's family after a send, when the sender may delete in the
    /// chat. Returns the menu message, or None when no menu was offered.
    #[instrument(skip(self, video, text))]
    pub async fn after_send_delete_menu(
        &self,
        video: &MessageRecord,
        text: &str,
        sender_id: i64,
    ) -> Result<Option<MessageRecord>> {
        let chat_id = video.chat_id;
        if !self.ctx.deleters(chat_id).await?.contains(&sender_id) {
            return Ok(None);
        }
        let buttons: ButtonRows = vec![
            vec![Button::new(
                "Yes please",
                CallbackAction::Delete {
                    message_id: video.message_id,
                }
                .to_string(),
            )],
            vec![Button::new(
                "No thanks",
                CallbackAction::ClearDeleteMenu.to_string(),
            )],
        ];
        let full_text = format!("{}{}", text, DELETE_QUESTION);
        let message = self
            .ctx
            .reply(chat_id, video.message_id, &full_text, Some(&buttons))
            .await?;
        self.raise(ActiveMenu {
            kind: MenuKind::Delete,
            message: message.clone(),
            owner_id: sender_id,
            video_id: video.message_id,
            terminal_text: Some(text.to_string()),
        })
        .await?;
        Ok(Some(message))
    }
}
