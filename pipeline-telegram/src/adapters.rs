//! Adapters from Telegram (teloxide) types to the stored record types.
//! Depends only on teloxide and the record definitions.

use pipeline_core::{ChatRecord, IncomingMessage, MessageRecord};
use teloxide::types::{Chat, Message};

/// Wraps a teloxide Chat for conversion to [`ChatRecord`].
pub struct TelegramChatWrapper<'a>(pub &'a Chat);

impl<'a> TelegramChatWrapper<'a> {
    /// Title falls back to the first name (private chats), then to the username.
    pub fn to_core(&self) -> ChatRecord {
        let chat = self.0;
        let username = chat.username().map(str::to_string);
        let title = chat
            .title()
            .or_else(|| chat.first_name())
            .or(chat.username())
            .unwrap_or_default()
            .to_string();
        ChatRecord::new(chat.id.0, username, title)
    }
}

/// Wraps a teloxide Message for conversion to [`MessageRecord`] and [`IncomingMessage`].
pub struct TelegramMessageWrapper<'a>(pub &'a Message);

impl<'a> TelegramMessageWrapper<'a> {
    /// Converts without media; the local file is attached after download.
    pub fn to_core(&self) -> MessageRecord {
        let msg = self.0;
        MessageRecord {
            chat_id: msg.chat.id.0,
            message_id: msg.id.0 as i64,
            datetime: msg.date,
            text: msg.text().or(msg.caption()).map(str::to_string),
            is_forward: msg.forward_origin().is_some(),
            file_path: None,
            file_mime_type: None,
            reply_to: msg.reply_to_message().map(|m| m.id.0 as i64),
            sender_id: self.sender_id(),
            is_scheduled: false,
        }
    }

    pub fn to_incoming(&self, record: MessageRecord, edited: bool) -> IncomingMessage {
        IncomingMessage {
            chat: TelegramChatWrapper(&self.0.chat).to_core(),
            message: record,
            edited,
        }
    }

    /// User id of the author; channel posts carry the posting chat instead.
    fn sender_id(&self) -> i64 {
        let msg = self.0;
        msg.from
            .as_ref()
            .map(|u| u.id.0 as i64)
            .or_else(|| msg.sender_chat.as_ref().map(|c| c.id.0))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(value: serde_json::Value) -> Message {
        serde_json::from_value(value).expect("valid Telegram message")
    }

    /// **Test: A group text reply keeps text, reply target and author.**
    #[test]
    fn test_group_reply_to_core() {
        let msg = message(serde_json::json!({
            "message_id": 11,
            "date": 1700000000,
            "chat": {"id": -1001, "type": "supergroup", "title": "Workshop"},
            "from": {"id": 7, "is_bot": false, "first_name": "Op"},
            "text": "send deergifs",
            "reply_to_message": {
                "message_id": 10,
                "date": 1699999990,
                "chat": {"id": -1001, "type": "supergroup", "title": "Workshop"},
                "from": {"id": 7, "is_bot": false, "first_name": "Op"},
                "text": "clip"
            }
        }));

        let record = TelegramMessageWrapper(&msg).to_core();

        assert_eq!(record.chat_id, -1001);
        assert_eq!(record.message_id, 11);
        assert_eq!(record.text.as_deref(), Some("send deergifs"));
        assert_eq!(record.reply_to, Some(10));
        assert_eq!(record.sender_id, 7);
        assert!(!record.is_forward);
        assert!(!record.has_video());
        assert_eq!(record.datetime.timestamp(), 1700000000);
    }

    /// **Test: A channel post without author is attributed to the posting chat.**
    #[test]
    fn test_channel_post_sender_is_chat() {
        let msg = message(serde_json::json!({
            "message_id": 5,
            "date": 1700000000,
            "chat": {"id": -1002, "type": "channel", "title": "Deer gifs", "username": "deergifs"},
            "sender_chat": {"id": -1002, "type": "channel", "title": "Deer gifs", "username": "deergifs"},
            "text": "hello"
        }));

        let wrapper = TelegramMessageWrapper(&msg);
        let incoming = wrapper.to_incoming(wrapper.to_core(), true);

        assert_eq!(incoming.message.sender_id, -1002);
        assert_eq!(incoming.chat.username.as_deref(), Some("deergifs"));
        assert_eq!(incoming.chat.title, "Deer gifs");
        assert!(incoming.edited);
    }
}
