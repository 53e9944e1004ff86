//! Background worker that batches accepted comments and appends them to the
//! store.
//!
//! This module is internal -- users interact with it indirectly through
//! [`CommentatorHandle`](crate::CommentatorHandle).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

use crate::comment::Comment;
use crate::storage::CommentStore;

pub async fn run<S: CommentStore>(
    mut rx: mpsc::Receiver<Comment>,
    mut shutdown_rx: oneshot::Receiver<()>,
    store: Arc<S>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut batch: Vec<Comment> = Vec::with_capacity(batch_size);
    let mut interval = time::interval(flush_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                tracing::info!("Shutdown signal received, draining pending comments");
                rx.close();
                while let Some(comment) = rx.recv().await {
                    batch.push(comment);
                }
                flush_batch(store.as_ref(), &mut batch).await;
                tracing::info!("Comment worker shut down");
                return;
            }

            Some(comment) = rx.recv() => {
                batch.push(comment);
                if batch.len() >= batch_size {
                    flush_batch(store.as_ref(), &mut batch).await;
                }
            }

            _ = interval.tick() => {
                flush_batch(store.as_ref(), &mut batch).await;
            }
        }
    }
}

/// Append the batch grouped by thread, one store call per thread, keeping the
/// submission order inside each thread.
async fn flush_batch<S: CommentStore>(store: &S, batch: &mut Vec<Comment>) {
    if batch.is_empty() {
        return;
    }

    let comments = std::mem::take(batch);
    let count = comments.len();
    tracing::debug!("Flushing batch of {count} comments");

    let mut threads: BTreeMap<String, Vec<Comment>> = BTreeMap::new();
    for comment in comments {
        threads.entry(comment.thread.clone()).or_default().push(comment);
    }

    let futs = threads.iter().map(|(thread, comments)| async move {
        if let Err(e) = store.append(thread, comments).await {
            tracing::error!(
                "Failed to store {} comments for thread {thread}: {e}",
                comments.len()
            );
        }
    });

    futures::future::join_all(futs).await;
    tracing::debug!("Flushed {count} comments");
}
