//! Wraps teloxide::Bot and implements [`pipeline_core::Bot`]. Production code talks to Telegram
//! through this adapter; tests substitute a recording Bot impl.

use crate::adapters::TelegramMessageWrapper;
use async_trait::async_trait;
use pipeline_core::{Bot as CoreBot, ButtonRows, MessageRecord, PipelineError, Result};
use std::collections::HashSet;
use teloxide::{
    prelude::*,
    types::{
        ChatId, ChatMember, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId,
        ReplyParameters,
    },
    RequestError,
};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements the pipeline's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }

    async fn administrators(&self, chat_id: i64) -> Result<Vec<ChatMember>> {
        let admins = self
            .bot
            .get_chat_administrators(ChatId(chat_id))
            .await
            .map_err(transport)?;
        debug!(chat_id, count = admins.len(), "Fetched chat administrators");
        Ok(admins)
    }
}

fn transport(e: RequestError) -> PipelineError {
    PipelineError::Transport(e.to_string())
}

fn to_message_id(id: i64) -> MessageId {
    MessageId(id as i32)
}

pub(crate) fn keyboard(rows: &ButtonRows) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
            .collect::<Vec<_>>()
    }))
}

fn to_record(sent: &Message) -> MessageRecord {
    TelegramMessageWrapper(sent).to_core()
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        buttons: Option<&ButtonRows>,
    ) -> Result<MessageRecord> {
        let mut request = self.bot.send_message(ChatId(chat_id), text.to_string());
        if let Some(reply_to) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(to_message_id(reply_to)));
        }
        if let Some(buttons) = buttons {
            request = request.reply_markup(keyboard(buttons));
        }
        let sent = request.await.map_err(transport)?;
        Ok(to_record(&sent))
    }

    async fn send_video(
        &self,
        chat_id: i64,
        file_path: &str,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> Result<MessageRecord> {
        let mut request = self
            .bot
            .send_video(ChatId(chat_id), InputFile::file(file_path.to_string()));
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        if let Some(reply_to) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(to_message_id(reply_to)));
        }
        let sent = request.await.map_err(transport)?;
        Ok(to_record(&sent))
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<MessageRecord> {
        let mut request =
            self.bot
                .edit_message_text(ChatId(chat_id), to_message_id(message_id), text.to_string());
        if let Some(buttons) = buttons {
            request = request.reply_markup(keyboard(buttons));
        }
        let edited = request.await.map_err(transport)?;
        Ok(to_record(&edited))
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), to_message_id(message_id))
            .await
            .map_err(transport)?;
        Ok(())
    }

    async fn forward_message(
        &self,
        from_chat_id: i64,
        message_id: i64,
        to_chat_id: i64,
    ) -> Result<MessageRecord> {
        let forwarded = self
            .bot
            .forward_message(
                ChatId(to_chat_id),
                ChatId(from_chat_id),
                to_message_id(message_id),
            )
            .await
            .map_err(transport)?;
        Ok(to_record(&forwarded))
    }

    async fn list_authorized_posters(&self, chat_id: i64) -> Result<HashSet<i64>> {
        Ok(self
            .administrators(chat_id)
            .await?
            .iter()
            .filter(|m| m.kind.can_post_messages())
            .map(|m| m.user.id.0 as i64)
            .collect())
    }

    async fn list_authorized_deleters(&self, chat_id: i64) -> Result<HashSet<i64>> {
        Ok(self
            .administrators(chat_id)
            .await?
            .iter()
            .filter(|m| m.kind.can_delete_messages())
            .map(|m| m.user.id.0 as i64)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::Button;
    use teloxide::types::InlineKeyboardButtonKind;

    /// **Test: Button rows map to callback buttons row by row.**
    #[test]
    fn test_keyboard_keeps_rows_and_payloads() {
        let rows = vec![
            vec![Button::new("Deer gifs", "confirm_send:10:100")],
            vec![
                Button::new("Yes, I am sure", "send:10:100:11:deergifs"),
                Button::new("No thanks!", "clear_dest_menu"),
            ],
        ];

        let markup = keyboard(&rows);

        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 2);
        let first = &markup.inline_keyboard[0][0];
        assert_eq!(first.text, "Deer gifs");
        assert_eq!(
            first.kind,
            InlineKeyboardButtonKind::CallbackData("confirm_send:10:100".to_string())
        );
    }
}
