//! Mock implementation of [`pipeline_core::Bot`] for integration tests.
//!
//! Records every call, hands out increasing message ids, answers permission queries from
//! per-chat sets and can be told to fail an operation, so tests can assert on exactly what
//! would have reached Telegram.

use async_trait::async_trait;
use pipeline_core::{Bot, ButtonRows, MessageRecord, PipelineError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Sender id of messages created by the bot.
pub const BOT_ID: i64 = 0;

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendText {
        chat_id: i64,
        text: String,
        reply_to: Option<i64>,
        buttons: Option<ButtonRows>,
    },
    SendVideo {
        chat_id: i64,
        file_path: String,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
        buttons: Option<ButtonRows>,
    },
    Delete {
        chat_id: i64,
        message_id: i64,
    },
    Forward {
        from_chat_id: i64,
        message_id: i64,
        to_chat_id: i64,
    },
    ListPosters {
        chat_id: i64,
    },
    ListDeleters {
        chat_id: i64,
    },
}

pub struct MockBot {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    posters: Mutex<HashMap<i64, HashSet<i64>>>,
    deleters: Mutex<HashMap<i64, HashSet<i64>>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MockBot {
    /// Created messages get ids from 1000 upwards.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1000),
            posters: Mutex::new(HashMap::new()),
            deleters: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn allow_post(&self, chat_id: i64, sender_id: i64) {
        self.posters
            .lock()
            .unwrap()
            .entry(chat_id)
            .or_default()
            .insert(sender_id);
    }

    pub fn allow_delete(&self, chat_id: i64, sender_id: i64) {
        self.deleters
            .lock()
            .unwrap()
            .entry(chat_id)
            .or_default()
            .insert(sender_id);
    }

    /// Makes every later call of `operation` (e.g. `"forward_message"`) fail with a transport
    /// error. The attempt is still recorded.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn forwards(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Forward { .. }))
            .collect()
    }

    pub fn videos_sent(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::SendVideo { .. }))
            .collect()
    }

    pub fn deleted(&self) -> Vec<(i64, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete {
                    chat_id,
                    message_id,
                } => Some((chat_id, message_id)),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Edit { .. }))
            .collect()
    }

    fn record(&self, call: Call, operation: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(operation) {
            return Err(PipelineError::Transport(format!("{} failed", operation)));
        }
        Ok(())
    }

    fn new_message(&self, chat_id: i64) -> MessageRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        MessageRecord::new(chat_id, id, BOT_ID)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        buttons: Option<&ButtonRows>,
    ) -> Result<MessageRecord> {
        self.record(
            Call::SendText {
                chat_id,
                text: text.to_string(),
                reply_to,
                buttons: buttons.cloned(),
            },
            "send_text",
        )?;
        let mut message = self.new_message(chat_id).with_text(text);
        message.reply_to = reply_to;
        Ok(message)
    }

    async fn send_video(
        &self,
        chat_id: i64,
        file_path: &str,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> Result<MessageRecord> {
        self.record(
            Call::SendVideo {
                chat_id,
                file_path: file_path.to_string(),
            },
            "send_video",
        )?;
        let mut message = self.new_message(chat_id);
        message.text = caption.map(str::to_string);
        message.reply_to = reply_to;
        Ok(message)
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<MessageRecord> {
        self.record(
            Call::Edit {
                chat_id,
                message_id,
                text: text.to_string(),
                buttons: buttons.cloned(),
            },
            "edit_message",
        )?;
        Ok(MessageRecord::new(chat_id, message_id, BOT_ID).with_text(text))
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.record(
            Call::Delete {
                chat_id,
                message_id,
            },
            "delete_message",
        )
    }

    async fn forward_message(
        &self,
        from_chat_id: i64,
        message_id: i64,
        to_chat_id: i64,
    ) -> Result<MessageRecord> {
        self.record(
            Call::Forward {
                from_chat_id,
                message_id,
                to_chat_id,
            },
            "forward_message",
        )?;
        let mut message = self.new_message(to_chat_id);
        message.is_forward = true;
        Ok(message)
    }

    async fn list_authorized_posters(&self, chat_id: i64) -> Result<HashSet<i64>> {
        self.record(Call::ListPosters { chat_id }, "list_authorized_posters")?;
        Ok(self
            .posters
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_authorized_deleters(&self, chat_id: i64) -> Result<HashSet<i64>> {
        self.record(Call::ListDeleters { chat_id }, "list_authorized_deleters")?;
        Ok(self
            .deleters
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }
}
