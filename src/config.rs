//! Builder for configuring and launching the comment service.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{CommentatorError, Result};
use crate::handle::{CommentatorHandle, Shared};
use crate::rate_limit::{
    Clock, KeyValueStore, MemoryStore, RateLimitPolicy, RateLimiter, SystemClock,
};
use crate::sanitizer::{Sanitizer, SanitizerPipeline};
use crate::storage::CommentStore;
use crate::submission::SubmissionValidator;
use crate::validator::{ValidationRules, Validator};
use crate::worker;

/// Builder for configuring and starting a [`CommentatorHandle`].
///
/// Provides a fluent API for the validation rules, extra sanitizers, the
/// rate-limit policy and its state store, and the batching of accepted
/// comments on their way to the [`CommentStore`].
///
/// # Example
///
/// ```rust,no_run
/// use commentator::{CommentatorBuilder, FsCommentStore, RateLimitPolicy, RegexSanitizer};
/// use std::time::Duration;
///
/// # async fn example() -> commentator::Result<()> {
/// let handle = CommentatorBuilder::new(FsCommentStore::new("/var/data/comments"))
///     .batch_size(20)
///     .flush_interval(Duration::from_secs(2))
///     .rate_limit(RateLimitPolicy::new(3, Duration::from_secs(30)))
///     .add_sanitizer(RegexSanitizer::new(vec![(r"(?i)\bviagra\b", "[spam]")]))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct CommentatorBuilder<S: CommentStore> {
    store: S,
    rules: ValidationRules,
    sanitizers: SanitizerPipeline,
    policy: RateLimitPolicy,
    state_store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    batch_size: usize,
    flush_interval: Duration,
    channel_buffer: usize,
}

impl<S: CommentStore> CommentatorBuilder<S> {
    /// Create a new builder with the given comment store and sensible defaults.
    ///
    /// Defaults: default validation rules, markup sanitizer only, 5 comments
    /// per 60 s per identifier tracked in memory, batch size 50, flush
    /// interval 1 s, channel buffer 1000.
    pub fn new(store: S) -> Self {
        Self {
            store,
            rules: ValidationRules::default(),
            sanitizers: SanitizerPipeline::markup(),
            policy: RateLimitPolicy::default(),
            state_store: Arc::new(MemoryStore::new()),
            clock: Arc::new(SystemClock),
            batch_size: 50,
            flush_interval: Duration::from_secs(1),
            channel_buffer: 1000,
        }
    }

    /// Replace the validation rules.
    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Append a [`Sanitizer`] after the built-in markup sanitizer.
    ///
    /// Sanitizers run in the order they are added, each receiving the output
    /// of the previous one.
    pub fn add_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizers.add(sanitizer);
        self
    }

    /// Attempts allowed per identifier and window.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Where rate-limit windows are kept.
    pub fn rate_limit_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.state_store = store;
        self
    }

    /// Time source for the rate limiter.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Maximum number of comments to batch before flushing to the store.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Time interval after which the batch is flushed regardless of size.
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Capacity of the internal channel between submitters and the worker.
    pub fn channel_buffer(mut self, size: usize) -> Self {
        self.channel_buffer = size;
        self
    }

    /// Consume the builder, spawn the background worker, and return the
    /// [`CommentatorHandle`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<CommentatorHandle<S>> {
        if self.batch_size == 0 {
            return Err(CommentatorError::Config("batch_size must be at least 1".into()));
        }
        if self.channel_buffer == 0 {
            return Err(CommentatorError::Config(
                "channel_buffer must be at least 1".into(),
            ));
        }
        if self.flush_interval.is_zero() {
            return Err(CommentatorError::Config(
                "flush_interval must be non-zero".into(),
            ));
        }

        let validator = Validator::new(self.rules, self.sanitizers);
        let limiter = RateLimiter::new(self.state_store, self.clock);
        let guard = SubmissionValidator::new(validator, limiter, self.policy);

        let (tx, rx) = tokio::sync::mpsc::channel(self.channel_buffer);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let store = Arc::new(self.store);

        let worker_handle = tokio::spawn(worker::run(
            rx,
            shutdown_rx,
            store.clone(),
            self.batch_size,
            self.flush_interval,
        ));

        Ok(CommentatorHandle::new(
            Arc::new(Shared::new(guard, tx)),
            store,
            shutdown_tx,
            worker_handle,
        ))
    }
}
