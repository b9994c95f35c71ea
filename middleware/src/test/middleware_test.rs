//! Unit tests for LoggingMiddleware and GroupFilterMiddleware.

use crate::{GroupFilterMiddleware, LoggingMiddleware};
use pipeline_core::{
    Channel, ChatRecord, ChatRegistry, Group, HandlerResponse, IncomingMessage, MessageRecord,
    Middleware, SharedRegistry,
};

fn sample_message(chat_id: i64, content: &str) -> IncomingMessage {
    IncomingMessage::new(
        ChatRecord::new(chat_id, None, "Workshop"),
        MessageRecord::new(chat_id, 1, 42).with_text(content),
    )
}

fn registry() -> SharedRegistry {
    ChatRegistry::new(
        vec![Group::new(ChatRecord::new(1, None, "Workshop"))],
        vec![Channel::new(
            ChatRecord::new(100, Some("deergifs".to_string()), "Deer gifs"),
            false,
        )],
    )
    .into_shared()
}

#[tokio::test]
async fn test_logging_middleware_before_continues() {
    let mw = LoggingMiddleware;
    let result = mw.before(&sample_message(1, "hello")).await;
    assert!(result.unwrap());
}

#[tokio::test]
async fn test_logging_middleware_after_ok() {
    let mw = LoggingMiddleware;
    let result = mw
        .after(&sample_message(1, "hello"), &HandlerResponse::Stop)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_group_filter_allows_configured_group() {
    let mw = GroupFilterMiddleware::new(registry());
    assert!(mw.before(&sample_message(1, "send")).await.unwrap());
}

#[tokio::test]
async fn test_group_filter_stops_channels_and_strangers() {
    let mw = GroupFilterMiddleware::new(registry());
    assert!(!mw.before(&sample_message(100, "send")).await.unwrap());
    assert!(!mw.before(&sample_message(555, "send")).await.unwrap());
}
