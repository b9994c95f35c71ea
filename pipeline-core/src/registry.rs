//! Chat registry: the roster of configured groups (where operators issue commands) and
//! channels (where content is sent), each owning a cache of observed messages.

use std::collections::BTreeMap;
use std::sync::Arc;
use storage::{ChatRecord, MessageKey, MessageRecord};
use tokio::sync::RwLock;

/// Registry shared between the observer and the helpers.
pub type SharedRegistry = Arc<RwLock<ChatRegistry>>;

/// Locally cached messages of one chat, keyed like the store by message id and scheduled flag,
/// so a scheduled message never shadows the posted one with the same id. Entries are never
/// evicted.
#[derive(Debug, Clone, Default)]
pub struct MessageCache {
    messages: BTreeMap<(i64, bool), MessageRecord>,
}

impl MessageCache {
    pub fn add(&mut self, message: MessageRecord) {
        self.messages
            .insert((message.message_id, message.is_scheduled), message);
    }

    pub fn remove(&mut self, message_id: i64, is_scheduled: bool) -> Option<MessageRecord> {
        self.messages.remove(&(message_id, is_scheduled))
    }

    pub fn get(&self, message_id: i64, is_scheduled: bool) -> Option<&MessageRecord> {
        self.messages.get(&(message_id, is_scheduled))
    }

    /// Nearest posted message with an attachment whose id is below `message_id`.
    pub fn latest_video_before(&self, message_id: i64) -> Option<&MessageRecord> {
        self.messages
            .range(..(message_id, false))
            .rev()
            .map(|(_, m)| m)
            .find(|m| !m.is_scheduled && m.has_video())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> {
        self.messages.values()
    }
}

/// A chat used as a forward destination. Only non-read-only channels are eligible.
#[derive(Debug, Clone)]
pub struct Channel {
    pub chat: ChatRecord,
    pub read_only: bool,
    pub messages: MessageCache,
}

impl Channel {
    pub fn new(chat: ChatRecord, read_only: bool) -> Self {
        Self {
            chat,
            read_only,
            messages: MessageCache::default(),
        }
    }

    fn has_username(&self, identifier: &str) -> bool {
        self.chat.username.as_deref().is_some_and(|username| {
            username.eq_ignore_ascii_case(identifier.trim_start_matches('@'))
        })
    }
}

/// A chat where operators issue commands.
#[derive(Debug, Clone)]
pub struct Group {
    pub chat: ChatRecord,
    pub messages: MessageCache,
}

impl Group {
    pub fn new(chat: ChatRecord) -> Self {
        Self {
            chat,
            messages: MessageCache::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatRegistry {
    groups: Vec<Group>,
    channels: Vec<Channel>,
}

impl ChatRegistry {
    pub fn new(groups: Vec<Group>, channels: Vec<Channel>) -> Self {
        Self { groups, channels }
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channels that accept content, in declaration order.
    pub fn writable_channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter().filter(|c| !c.read_only)
    }

    /// Resolves a username (with or without `@`, case-insensitive) or a numeric chat id to a
    /// writable channel. Usernames are matched first, then chat ids.
    pub fn find_destination(&self, identifier: &str) -> Option<&Channel> {
        let identifier = identifier.trim();
        self.writable_channels()
            .find(|c| c.has_username(identifier))
            .or_else(|| {
                self.writable_channels()
                    .find(|c| c.chat.chat_id.to_string() == identifier)
            })
    }

    pub fn group(&self, chat_id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.chat.chat_id == chat_id)
    }

    pub fn channel(&self, chat_id: i64) -> Option<&Channel> {
        self.channels.iter().find(|c| c.chat.chat_id == chat_id)
    }

    pub fn is_group(&self, chat_id: i64) -> bool {
        self.group(chat_id).is_some()
    }

    fn cache(&self, chat_id: i64) -> Option<&MessageCache> {
        self.group(chat_id)
            .map(|g| &g.messages)
            .or_else(|| self.channel(chat_id).map(|c| &c.messages))
    }

    fn cache_mut(&mut self, chat_id: i64) -> Option<&mut MessageCache> {
        if let Some(group) = self.groups.iter_mut().find(|g| g.chat.chat_id == chat_id) {
            return Some(&mut group.messages);
        }
        self.channels
            .iter_mut()
            .find(|c| c.chat.chat_id == chat_id)
            .map(|c| &mut c.messages)
    }

    /// Refreshes username and title of a known chat from a fresh observation.
    pub fn update_chat(&mut self, chat: &ChatRecord) -> bool {
        let known = self
            .groups
            .iter_mut()
            .map(|g| &mut g.chat)
            .chain(self.channels.iter_mut().map(|c| &mut c.chat))
            .find(|c| c.chat_id == chat.chat_id);
        match known {
            Some(known) => {
                *known = chat.clone();
                true
            }
            None => false,
        }
    }

    /// Caches the message in its chat. Returns false for chats outside the roster.
    pub fn add_message(&mut self, message: MessageRecord) -> bool {
        match self.cache_mut(message.chat_id) {
            Some(cache) => {
                cache.add(message);
                true
            }
            None => false,
        }
    }

    pub fn remove_message(&mut self, key: MessageKey) -> Option<MessageRecord> {
        self.cache_mut(key.chat_id)?
            .remove(key.message_id, key.is_scheduled)
    }

    /// A posted message of the chat.
    pub fn message(&self, chat_id: i64, message_id: i64) -> Option<MessageRecord> {
        self.cache(chat_id)?.get(message_id, false).cloned()
    }

    pub fn latest_video_before(&self, chat_id: i64, message_id: i64) -> Option<MessageRecord> {
        self.cache(chat_id)?.latest_video_before(message_id).cloned()
    }
}
