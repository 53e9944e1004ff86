//! Handles for submitting comments and controlling the background worker.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::comment::{Comment, thread_key};
use crate::error::{CommentatorError, Result};
use crate::storage::CommentStore;
use crate::submission::{SanitizedSubmission, Submission, SubmissionValidator};
use crate::validator::{ErrorKind, ValidationIssue, ValidationResult};

/// State shared by the handle and every sender.
pub(crate) struct Shared {
    guard: SubmissionValidator,
    sender: mpsc::Sender<Comment>,
}

impl Shared {
    pub(crate) fn new(guard: SubmissionValidator, sender: mpsc::Sender<Comment>) -> Self {
        Self { guard, sender }
    }

    fn submit(
        &self,
        url: &str,
        submission: &Submission,
        identifier: &str,
    ) -> Result<ValidationResult<SanitizedSubmission>> {
        let url_check = self.guard.validator().validate_url(Some(url));
        if !url_check.valid {
            return Err(CommentatorError::InvalidUrl(url_check.errors));
        }

        // Reserve the slot before the rate limiter records this attempt.
        let permit = self
            .sender
            .try_reserve()
            .map_err(|_| CommentatorError::ChannelClosed)?;

        let mut result = self.guard.validate_submission(submission, identifier);
        if result.valid && result.sanitized.text.is_empty() {
            // Whitespace-only text passes the field check but leaves nothing to store.
            result = ValidationResult::new(
                vec![ValidationIssue::new(
                    ErrorKind::TooShort,
                    "text",
                    "Comment cannot be blank",
                )],
                result.sanitized,
            );
        }

        if result.valid {
            let comment = Comment::new(thread_key(&url_check.sanitized), result.sanitized.clone());
            tracing::debug!(id = %comment.id, thread = %comment.thread, "Comment accepted");
            permit.send(comment);
        }
        Ok(result)
    }
}

/// Primary handle returned by [`CommentatorBuilder::build`](crate::CommentatorBuilder::build).
///
/// Owns the shutdown signal and the worker task join handle. Use
/// [`submit`](Self::submit) to validate and queue comments,
/// [`comments`](Self::comments) to read a thread back and
/// [`shutdown`](Self::shutdown) to stop the worker after flushing what is
/// still queued.
///
/// For sharing across multiple tasks, obtain a lightweight [`CommentSender`]
/// via [`sender`](Self::sender).
pub struct CommentatorHandle<S: CommentStore> {
    shared: Arc<Shared>,
    store: Arc<S>,
    shutdown: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl<S: CommentStore> CommentatorHandle<S> {
    pub(crate) fn new(
        shared: Arc<Shared>,
        store: Arc<S>,
        shutdown: oneshot::Sender<()>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            shared,
            store,
            shutdown: Some(shutdown),
            worker: Some(worker),
        }
    }

    /// Validate `submission` for the thread of `url` on behalf of
    /// `identifier`, queueing it for storage when it passes.
    ///
    /// A rejected submission is not an error: the returned result carries
    /// the issues and nothing is queued. Errors are reserved for an
    /// unacceptable `url` ([`CommentatorError::InvalidUrl`]) and a full or
    /// closed worker channel ([`CommentatorError::ChannelClosed`]).
    pub fn submit(
        &self,
        url: &str,
        submission: &Submission,
        identifier: &str,
    ) -> Result<ValidationResult<SanitizedSubmission>> {
        self.shared.submit(url, submission, identifier)
    }

    /// Stored comments of the thread for `url`, oldest first.
    ///
    /// Comments still waiting in the current batch are not visible yet.
    pub async fn comments(&self, url: &str) -> Result<Vec<Comment>> {
        let mut comments = self.store.list(&thread_key(url)).await?;
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    /// Forget the recorded attempts of `identifier`.
    pub fn reset_rate_limit(&self, identifier: &str) -> Result<()> {
        self.shared.guard.limiter().reset(identifier)
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a lightweight, cloneable [`CommentSender`] that shares the same
    /// validator, rate limiter and worker channel.
    pub fn sender(&self) -> CommentSender {
        CommentSender {
            shared: self.shared.clone(),
        }
    }

    /// Gracefully shut down the background worker.
    ///
    /// Sends a shutdown signal, waits for the worker to drain the channel and
    /// flush the final batch, then returns.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.await;
        }
    }
}

/// Lightweight, cloneable submitter for use from multiple tasks.
///
/// Obtained via [`CommentatorHandle::sender`]. Does **not** own the shutdown
/// signal or the worker join handle -- dropping all senders will not stop the
/// worker.
#[derive(Clone)]
pub struct CommentSender {
    shared: Arc<Shared>,
}

impl CommentSender {
    /// See [`CommentatorHandle::submit`].
    pub fn submit(
        &self,
        url: &str,
        submission: &Submission,
        identifier: &str,
    ) -> Result<ValidationResult<SanitizedSubmission>> {
        self.shared.submit(url, submission, identifier)
    }

    /// Submit and log failures via `tracing` instead of returning them.
    pub fn submit_or_log(&self, url: &str, submission: &Submission, identifier: &str) {
        match self.submit(url, submission, identifier) {
            Ok(result) if !result.valid => {
                tracing::info!(identifier, issues = result.errors.len(), "Comment rejected");
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Failed to submit comment: {e}"),
        }
    }
}
