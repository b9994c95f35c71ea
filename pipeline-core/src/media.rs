//! Local media layout: `<root>/<chat_id>/<message_id>.<ext>`.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, chat_id: i64, message_id: i64, ext: &str) -> PathBuf {
        self.root
            .join(chat_id.to_string())
            .join(format!("{}.{}", message_id, ext))
    }

    /// Copies `source` to the path of the given message, keeping the file extension
    /// (`mp4` when there is none). Returns the new path.
    pub async fn copy_into(
        &self,
        source: &str,
        chat_id: i64,
        message_id: i64,
    ) -> std::io::Result<String> {
        let ext = Path::new(source)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        let target = self.path_for(chat_id, message_id, ext);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(source, &target).await?;
        debug!(source = %source, target = %target.display(), "Copied media file");
        Ok(target.to_string_lossy().into_owned())
    }

    /// Removes a media file; a missing file or an I/O failure is only logged.
    pub async fn remove(&self, path: &str) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, path = %path, "Failed to remove media file");
            }
        }
    }
}
