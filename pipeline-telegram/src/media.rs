//! Download of video attachments into the local media store.

use anyhow::Result;
use pipeline_core::MediaStore;
use teloxide::{
    net::Download,
    prelude::*,
    types::{FileMeta, Message},
};
use tracing::{debug, instrument};

/// File extension for a stored attachment of the given MIME type.
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/gif" => "gif",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "video/x-matroska" => "mkv",
        _ => "mp4",
    }
}

/// Video-like attachment of a message: videos, animations, and documents with a video or gif
/// MIME type.
fn attachment(msg: &Message) -> Option<(&FileMeta, String)> {
    if let Some(video) = msg.video() {
        let mime = video.mime_type.as_ref().map(|m| m.to_string());
        return Some((&video.file, mime.unwrap_or_else(|| "video/mp4".to_string())));
    }
    if let Some(animation) = msg.animation() {
        let mime = animation.mime_type.as_ref().map(|m| m.to_string());
        return Some((
            &animation.file,
            mime.unwrap_or_else(|| "video/mp4".to_string()),
        ));
    }
    let document = msg.document()?;
    let mime = document.mime_type.as_ref()?.to_string();
    (mime.starts_with("video/") || mime == "image/gif").then_some((&document.file, mime))
}

/// Downloads the message's video attachment to `<root>/<chat_id>/<message_id>.<ext>`.
/// Returns the local path and MIME type, or None when the message carries no video.
#[instrument(skip(bot, msg, media), fields(chat_id = msg.chat.id.0, message_id = msg.id.0))]
pub async fn download_media(
    bot: &teloxide::Bot,
    msg: &Message,
    media: &MediaStore,
) -> Result<Option<(String, String)>> {
    let Some((meta, mime)) = attachment(msg) else {
        return Ok(None);
    };

    let file = bot.get_file(meta.id.clone()).await?;
    let path = media.path_for(msg.chat.id.0, msg.id.0 as i64, extension_for(&mime));
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut destination = tokio::fs::File::create(&path).await?;
    bot.download_file(&file.path, &mut destination).await?;

    debug!(path = %path.display(), mime = %mime, "step: media downloaded");
    Ok(Some((path.to_string_lossy().into_owned(), mime)))
}
