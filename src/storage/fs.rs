//! Filesystem comment store.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::comment::Comment;
use crate::error::{CommentatorError, Result};
use crate::storage::CommentStore;

/// Comment store that appends each thread to `<base_dir>/<thread>.jsonl`,
/// one JSON object per line.
///
/// The base directory is created on first write. Thread keys produced by
/// [`thread_key`](crate::thread_key) are always valid file names.
///
/// # Example
///
/// ```rust,no_run
/// use commentator::FsCommentStore;
///
/// let store = FsCommentStore::new("/var/data/comments");
/// ```
pub struct FsCommentStore {
    base_dir: PathBuf,
}

impl FsCommentStore {
    /// Create a new `FsCommentStore` rooted at the given directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn thread_path(&self, thread: &str) -> PathBuf {
        self.base_dir.join(format!("{thread}.jsonl"))
    }
}

fn store_err(e: std::io::Error) -> CommentatorError {
    CommentatorError::Store(Box::new(e))
}

impl CommentStore for FsCommentStore {
    async fn append(&self, thread: &str, comments: &[Comment]) -> Result<()> {
        if comments.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for comment in comments {
            serde_json::to_writer(&mut buf, comment)?;
            buf.push(b'\n');
        }

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(store_err)?;

        let path = self.thread_path(thread);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(store_err)?;
        file.write_all(&buf).await.map_err(store_err)?;
        file.flush().await.map_err(store_err)?;

        tracing::debug!("Appended {} comments to {}", comments.len(), path.display());
        Ok(())
    }

    async fn list(&self, thread: &str) -> Result<Vec<Comment>> {
        let path = self.thread_path(thread);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_err(e)),
        };

        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Into::into))
            .collect()
    }
}
