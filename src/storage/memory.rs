//! In-memory comment store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::comment::Comment;
use crate::error::Result;
use crate::storage::CommentStore;

/// Comment store that keeps every thread in memory. Clones share the same
/// threads.
#[derive(Clone, Default)]
pub struct MemoryCommentStore {
    threads: Arc<Mutex<HashMap<String, Vec<Comment>>>>,
}

impl MemoryCommentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored comments across all threads.
    pub fn len(&self) -> usize {
        self.threads.lock().values().map(Vec::len).sum()
    }

    /// Returns `true` if no comment has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CommentStore for MemoryCommentStore {
    async fn append(&self, thread: &str, comments: &[Comment]) -> Result<()> {
        self.threads
            .lock()
            .entry(thread.to_string())
            .or_default()
            .extend_from_slice(comments);
        Ok(())
    }

    async fn list(&self, thread: &str) -> Result<Vec<Comment>> {
        Ok(self.threads.lock().get(thread).cloned().unwrap_or_default())
    }
}
