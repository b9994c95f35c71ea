//! Integration tests for [`storage::Store`].
//!
//! Covers chat upsert, message upsert/removal by composite identity, listing and hash lookup
//! using an in-memory SQLite database.

use storage::{ChatRecord, MessageKey, MessageRecord, Store};

async fn open_store() -> Store {
    Store::open("sqlite::memory:")
        .await
        .expect("Failed to open store")
}

/// **Test: Saving a chat twice updates username and title instead of duplicating.**
///
/// **Setup:** Save chat 100 as "Deer gifs" / deergifs.
/// **Action:** Save chat 100 again with a new title and username.
/// **Expected:** One chat row, carrying the new title and username.
#[tokio::test]
async fn test_save_chat_upserts() {
    let store = open_store().await;
    store
        .chats
        .save_chat(&ChatRecord::new(100, Some("deergifs".to_string()), "Deer gifs"))
        .await
        .expect("Failed to save chat");
    store
        .chats
        .save_chat(&ChatRecord::new(100, Some("deer".to_string()), "Deer"))
        .await
        .expect("Failed to save chat");

    let chats = store.chats.list_chats().await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].title, "Deer");
    assert_eq!(chats[0].username.as_deref(), Some("deer"));
}

/// **Test: Upserting an existing identity updates fields without a second row.**
///
/// **Setup:** Save message (1, 10, posted) with text "first".
/// **Action:** Save the same identity with text "edited".
/// **Expected:** One row for chat 1 with text "edited".
#[tokio::test]
async fn test_save_message_updates_existing_identity() {
    let store = open_store().await;
    let original = MessageRecord::new(1, 10, 5).with_text("first");
    store.messages.save_message(&original).await.unwrap();

    let edited = MessageRecord::new(1, 10, 5).with_text("edited");
    store.messages.save_message(&edited).await.unwrap();

    let messages = store.messages.list_messages_for_chat(1).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text.as_deref(), Some("edited"));
}

/// **Test: Upserting a new identity creates exactly one row.**
#[tokio::test]
async fn test_save_message_new_identity_creates_one_row() {
    let store = open_store().await;
    store
        .messages
        .save_message(&MessageRecord::new(1, 10, 5))
        .await
        .unwrap();
    store
        .messages
        .save_message(&MessageRecord::new(1, 11, 5))
        .await
        .unwrap();

    assert_eq!(store.messages.list_messages_for_chat(1).await.unwrap().len(), 2);
}

/// **Test: Scheduled and posted messages with the same id do not collide.**
///
/// **Setup:** Save posted message 10 and scheduled message 10 in chat 1.
/// **Action:** List messages, then remove only the scheduled one.
/// **Expected:** Two rows before removal, the posted one remains afterwards.
#[tokio::test]
async fn test_scheduled_identity_is_distinct() {
    let store = open_store().await;
    let posted = MessageRecord::new(1, 10, 5).with_text("posted");
    let mut scheduled = MessageRecord::new(1, 10, 5).with_text("scheduled");
    scheduled.is_scheduled = true;
    store.messages.save_message(&posted).await.unwrap();
    store.messages.save_message(&scheduled).await.unwrap();

    assert_eq!(store.messages.list_messages_for_chat(1).await.unwrap().len(), 2);

    let removed = store.messages.remove_message(scheduled.key()).await.unwrap();
    assert!(removed);

    let remaining = store.messages.list_messages_for_chat(1).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].is_scheduled);
    assert_eq!(remaining[0].text.as_deref(), Some("posted"));
}

/// **Test: Removing a non-existent message is a no-op.**
#[tokio::test]
async fn test_remove_missing_message_is_noop() {
    let store = open_store().await;
    let removed = store
        .messages
        .remove_message(MessageKey {
            chat_id: 1,
            message_id: 404,
            is_scheduled: false,
        })
        .await
        .expect("Removal of a missing message should not fail");
    assert!(!removed);
}

/// **Test: Listed messages keep attachment presence and parsed timestamps.**
#[tokio::test]
async fn test_list_messages_round_trips_fields() {
    let store = open_store().await;
    let video = MessageRecord::new(3, 1, 9).with_file("store/3/1.mp4", "video/mp4");
    let text = MessageRecord::new(3, 2, 9)
        .with_text("send deergifs")
        .with_reply_to(1);
    store.messages.save_message(&video).await.unwrap();
    store.messages.save_message(&text).await.unwrap();

    let messages = store.messages.list_messages_for_chat(3).await.unwrap();

    assert_eq!(messages.len(), 2);
    assert!(messages[0].has_video());
    assert!(!messages[1].has_video());
    assert_eq!(messages[1].reply_to, Some(1));
    assert_eq!(messages[0].datetime.timestamp(), video.datetime.timestamp());
    assert_eq!(messages[0].file_mime_type.as_deref(), Some("video/mp4"));
}

/// **Test: Hash lookup returns each matching message once.**
///
/// **Setup:** Message A has hashes h1, h2; message B has h3.
/// **Action:** Look up [h1, h2].
/// **Expected:** Only message A, listed once.
#[tokio::test]
async fn test_messages_matching_hashes() {
    let store = open_store().await;
    let a = MessageRecord::new(1, 1, 9).with_file("a.mp4", "video/mp4");
    let b = MessageRecord::new(2, 1, 9).with_file("b.mp4", "video/mp4");
    store.messages.save_message(&a).await.unwrap();
    store.messages.save_message(&b).await.unwrap();
    store
        .messages
        .save_hashes(&a, &["h1".to_string(), "h2".to_string()])
        .await
        .unwrap();
    store.messages.save_hashes(&b, &["h3".to_string()]).await.unwrap();

    let matches = store
        .messages
        .get_messages_matching_hashes(&["h1".to_string(), "h2".to_string()])
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].chat_id, 1);
    assert!(store
        .messages
        .get_messages_matching_hashes(&[])
        .await
        .unwrap()
        .is_empty());
}

/// **Test: Removing a message also drops its fingerprints.**
///
/// **Setup:** Message A with hashes h1, h2; message B with h1.
/// **Action:** Remove A.
/// **Expected:** A is gone and h1 now matches only B; h2 matches nothing.
#[tokio::test]
async fn test_remove_message_drops_hashes() {
    let store = open_store().await;
    let a = MessageRecord::new(1, 1, 9).with_file("a.mp4", "video/mp4");
    let b = MessageRecord::new(2, 5, 9).with_file("b.mp4", "video/mp4");
    store.messages.save_message(&a).await.unwrap();
    store.messages.save_message(&b).await.unwrap();
    store
        .messages
        .save_hashes(&a, &["h1".to_string(), "h2".to_string()])
        .await
        .unwrap();
    store.messages.save_hashes(&b, &["h1".to_string()]).await.unwrap();

    assert!(store.messages.remove_message(a.key()).await.unwrap());

    assert!(store.messages.get_message(a.key()).await.unwrap().is_none());
    let h1 = store
        .messages
        .get_messages_matching_hashes(&["h1".to_string()])
        .await
        .unwrap();
    assert_eq!(h1.len(), 1);
    assert_eq!(h1[0].message_id, 5);
    assert!(store
        .messages
        .get_messages_matching_hashes(&["h2".to_string()])
        .await
        .unwrap()
        .is_empty());
}
