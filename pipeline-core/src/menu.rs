//! Menu registry: the active interactive menus, at most one per `(chat_id, kind)`, and the
//! operator allowed to press their buttons.

use std::collections::HashMap;
use storage::MessageRecord;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    /// Channel picker raised by a bare `send`.
    Destination,
    /// Warning that the video was not marked as giffed.
    NotGiffed,
    /// Offer to delete the message family after a send.
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveMenu {
    pub kind: MenuKind,
    /// The message displaying the menu.
    pub message: MessageRecord,
    pub owner_id: i64,
    /// Video the menu acts on.
    pub video_id: i64,
    /// Text the menu is edited to when torn down in place.
    pub terminal_text: Option<String>,
}

impl ActiveMenu {
    pub fn chat_id(&self) -> i64 {
        self.message.chat_id
    }
}

#[derive(Debug, Default)]
pub struct MenuRegistry {
    slots: RwLock<HashMap<(i64, MenuKind), ActiveMenu>>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the menu in its slot and returns whatever occupied the slot before.
    pub async fn register(&self, menu: ActiveMenu) -> Option<ActiveMenu> {
        self.slots
            .write()
            .await
            .insert((menu.chat_id(), menu.kind), menu)
    }

    pub async fn get(&self, chat_id: i64, kind: MenuKind) -> Option<ActiveMenu> {
        self.slots.read().await.get(&(chat_id, kind)).cloned()
    }

    /// Empties the slot, returning the menu it held.
    pub async fn take(&self, chat_id: i64, kind: MenuKind) -> Option<ActiveMenu> {
        self.slots.write().await.remove(&(chat_id, kind))
    }

    /// The menu displayed by the given message, if any.
    pub async fn find_by_message(&self, chat_id: i64, message_id: i64) -> Option<ActiveMenu> {
        self.slots
            .read()
            .await
            .values()
            .find(|m| m.chat_id() == chat_id && m.message.message_id == message_id)
            .cloned()
    }

    /// True only when the message displays an active menu owned by `sender_id`.
    pub async fn is_authorized(&self, chat_id: i64, message_id: i64, sender_id: i64) -> bool {
        self.find_by_message(chat_id, message_id)
            .await
            .is_some_and(|m| m.owner_id == sender_id)
    }

    /// Drops every slot whose menu message is one of `message_ids` in the chat.
    pub async fn forget_messages(&self, chat_id: i64, message_ids: &[i64]) -> Vec<ActiveMenu> {
        let mut slots = self.slots.write().await;
        let keys: Vec<(i64, MenuKind)> = slots
            .iter()
            .filter(|(_, m)| m.chat_id() == chat_id && message_ids.contains(&m.message.message_id))
            .map(|(k, _)| *k)
            .collect();
        keys.into_iter().filter_map(|k| slots.remove(&k)).collect()
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}
