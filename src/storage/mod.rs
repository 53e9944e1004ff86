//! Pluggable comment stores.
//!
//! The crate ships with two built-in backends:
//!
//! - [`MemoryCommentStore`] -- keeps threads in process memory.
//! - [`FsCommentStore`] -- one JSON-lines file per thread on the local
//!   filesystem.
//!
//! Implement the [`CommentStore`] trait to put comments in your own database.

mod fs;
mod memory;

pub use fs::FsCommentStore;
pub use memory::MemoryCommentStore;

use std::future::Future;

use crate::comment::Comment;
use crate::error::Result;

/// Trait for backends that persist comment threads.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared by
/// the background worker and the handle that reads threads back.
///
/// # Implementing a custom backend
///
/// ```rust,no_run
/// use commentator::{Comment, CommentStore, Result};
///
/// struct MyStore;
///
/// impl CommentStore for MyStore {
///     async fn append(&self, thread: &str, comments: &[Comment]) -> Result<()> {
///         // push comments to the database ...
///         Ok(())
///     }
///
///     async fn list(&self, thread: &str) -> Result<Vec<Comment>> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait CommentStore: Send + Sync + 'static {
    /// Append `comments` to `thread`, keeping their order.
    fn append(
        &self,
        thread: &str,
        comments: &[Comment],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Every comment of `thread`, in insertion order. Unknown threads are
    /// empty, not an error.
    fn list(&self, thread: &str) -> impl Future<Output = Result<Vec<Comment>>> + Send;
}
