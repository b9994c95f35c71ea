//! Shared setup for helper integration tests: one command group, three channels, an in-memory
//! store, a temporary media area and the full handler chain over a [`mock_bot::MockBot`].
#![allow(dead_code)]

pub mod mock_bot;

use handler_chain::HandlerChain;
use middleware::{GroupFilterMiddleware, PersistenceMiddleware};
use mock_bot::MockBot;
use pipeline_core::{
    CallbackQuery, Channel, ChatRecord, ChatRegistry, Group, HandlerResponse, IncomingMessage,
    MediaStore, MenuRegistry, MessageKey, MessageRecord, Store,
};
use pipeline_helpers::{DeleteHelper, PipelineContext, SendHelper};
use std::sync::Arc;
use tempfile::TempDir;

pub const GROUP: i64 = 1;
pub const DEER: i64 = 100;
pub const COW: i64 = 200;
pub const ARCHIVE: i64 = 300;
pub const OPERATOR: i64 = 7;
pub const OTHER_OPERATOR: i64 = 8;

pub struct Harness {
    pub bot: Arc<MockBot>,
    pub ctx: PipelineContext,
    pub chain: HandlerChain,
    pub media_dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        let media_dir = tempfile::tempdir().expect("Failed to create media dir");
        let bot = Arc::new(MockBot::new());
        let store = Store::open("sqlite::memory:")
            .await
            .expect("Failed to open store");
        let registry = ChatRegistry::new(
            vec![Group::new(ChatRecord::new(GROUP, None, "Workshop"))],
            vec![
                Channel::new(
                    ChatRecord::new(DEER, Some("deergifs".to_string()), "Deer gifs"),
                    false,
                ),
                Channel::new(
                    ChatRecord::new(COW, Some("cowgifs".to_string()), "Cow gifs"),
                    false,
                ),
                Channel::new(
                    ChatRecord::new(ARCHIVE, Some("archive".to_string()), "Archive"),
                    true,
                ),
            ],
        )
        .into_shared();
        let menus = Arc::new(MenuRegistry::new());
        let ctx = PipelineContext::new(
            bot.clone(),
            store.clone(),
            registry.clone(),
            menus.clone(),
            MediaStore::new(media_dir.path()),
        );
        let chain = HandlerChain::new(menus)
            .add_middleware(Arc::new(PersistenceMiddleware::new(store, registry.clone())))
            .add_middleware(Arc::new(GroupFilterMiddleware::new(registry)))
            .add_handler(Arc::new(SendHelper::new(ctx.clone())))
            .add_handler(Arc::new(DeleteHelper::new(ctx.clone())));
        Self {
            bot,
            ctx,
            chain,
            media_dir,
        }
    }

    /// Passes a group message through the chain as if it had just been observed.
    pub async fn observe(&self, message: MessageRecord) -> HandlerResponse {
        let chat = ChatRecord::new(message.chat_id, None, "Workshop");
        self.chain
            .handle(&IncomingMessage::new(chat, message))
            .await
            .expect("Chain failed")
    }

    /// Writes a video file into the group's media area and observes a message carrying it.
    pub async fn post_video(&self, message_id: i64, reply_to: Option<i64>) -> MessageRecord {
        let path = self.ctx.media.path_for(GROUP, message_id, "mp4");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"video bytes").await.unwrap();
        let mut video = MessageRecord::new(GROUP, message_id, OPERATOR)
            .with_file(path.to_string_lossy(), "video/mp4");
        video.reply_to = reply_to;
        self.observe(video.clone()).await;
        video
    }

    /// A giffed video: message 9 says "gif", video 10 replies to it.
    pub async fn giffed_video(&self) -> MessageRecord {
        self.observe(MessageRecord::new(GROUP, 9, OPERATOR).with_text("gif"))
            .await;
        self.post_video(10, Some(9)).await
    }

    /// Operator command 11, replying to the video.
    pub async fn command(&self, text: &str) -> HandlerResponse {
        self.observe(
            MessageRecord::new(GROUP, 11, OPERATOR)
                .with_text(text)
                .with_reply_to(10),
        )
        .await
    }

    pub async fn press(&self, message_id: i64, sender_id: i64, data: &str) -> HandlerResponse {
        self.chain
            .handle_callback(&CallbackQuery {
                chat_id: GROUP,
                message_id,
                sender_id,
                data: data.to_string(),
            })
            .await
            .expect("Callback failed")
    }

    pub async fn stored(&self, chat_id: i64, message_id: i64) -> Option<MessageRecord> {
        self.ctx
            .store
            .messages
            .get_message(MessageKey {
                chat_id,
                message_id,
                is_scheduled: false,
            })
            .await
            .unwrap()
    }
}

pub fn texts(response: &HandlerResponse) -> Vec<String> {
    response
        .messages()
        .iter()
        .map(|m| m.text.clone().unwrap_or_default())
        .collect()
}
