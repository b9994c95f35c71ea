//! Which video a command acts on, and whether that video was marked as giffed.

use pipeline_core::{ChatRegistry, MessageRecord, PipelineError, Result};
use storage::Store;

/// Resolves the video subject of `message`: the message itself when it carries media, else the
/// message it replies to when that one does, else the nearest earlier video in the chat.
pub fn find_video_for_message(
    registry: &ChatRegistry,
    message: &MessageRecord,
) -> Option<MessageRecord> {
    if message.has_video() {
        return Some(message.clone());
    }
    if let Some(reply_to) = message.reply_to {
        if let Some(target) = registry.message(message.chat_id, reply_to) {
            if target.has_video() {
                return Some(target);
            }
        }
    }
    registry.latest_video_before(message.chat_id, message.message_id)
}

/// A video counts as giffed when the entry right before it in its history says exactly `gif`.
pub async fn was_giffed(store: &Store, video: &MessageRecord) -> Result<bool> {
    let history = store
        .messages
        .get_message_history(video)
        .await
        .map_err(|e| PipelineError::persistence("load message history", e))?;
    Ok(history
        .get(1)
        .and_then(|entry| entry.text.as_deref())
        .is_some_and(|text| text.trim().eq_ignore_ascii_case("gif")))
}
