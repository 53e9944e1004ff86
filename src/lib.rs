//! # commentator
//!
//! Input guarding for a threaded-comments widget: sanitization, per-field
//! validation and sliding-window rate limiting, plus a batched service that
//! stores accepted comments in a pluggable backend.
//!
//! ## Overview
//!
//! Every submitted field passes through a [`Validator`], which collects
//! [`ValidationIssue`]s without stopping at the first one and always returns
//! the sanitized value next to the verdict. The [`SubmissionValidator`] adds
//! a per-identifier [`RateLimiter`] in front of the field checks.
//!
//! [`CommentatorBuilder`] wires the checks to a [`CommentStore`] through a
//! background worker that batches accepted comments by count and interval.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use commentator::{CommentatorBuilder, MemoryCommentStore, Submission};
//!
//! # async fn example() -> commentator::Result<()> {
//! let handle = CommentatorBuilder::new(MemoryCommentStore::new()).build()?;
//!
//! let result = handle.submit(
//!     "https://example.com/post/1",
//!     &Submission::new("Nice site!", "Bob"),
//!     "session-1234",
//! )?;
//! assert!(result.valid);
//!
//! // On shutdown, flush queued comments:
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! The checks can also be used on their own:
//!
//! ```
//! use commentator::{ErrorKind, Validator};
//!
//! let result = Validator::default().validate_comment(Some("Hello'; DROP TABLE comments; --"));
//! assert!(result.has_kind(ErrorKind::SecurityViolation));
//! ```

pub mod comment;
pub mod config;
pub mod error;
pub mod handle;
pub mod rate_limit;
pub mod sanitizer;
pub mod storage;
pub mod submission;
pub mod validator;
mod worker;

pub use comment::{Comment, thread_key};
pub use config::CommentatorBuilder;
pub use error::{CommentatorError, Result};
pub use handle::{CommentSender, CommentatorHandle};
pub use rate_limit::{
    Clock, KeyValueStore, ManualClock, MemoryStore, RateLimitPolicy, RateLimiter, SystemClock,
};
pub use sanitizer::{
    EscapeSanitizer, MarkupSanitizer, RegexSanitizer, Sanitizer, SanitizerPipeline, sanitize,
};
pub use storage::{CommentStore, FsCommentStore, MemoryCommentStore};
pub use submission::{SanitizedSubmission, Submission, SubmissionValidator};
pub use validator::{
    ErrorKind, SecurityPatterns, ValidationIssue, ValidationLimits, ValidationResult,
    ValidationRules, Validator,
};
