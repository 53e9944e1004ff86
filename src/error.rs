//! Error types for the `commentator` crate.
//!
//! Validation outcomes are not errors: they are reported through
//! [`ValidationResult`](crate::ValidationResult). This enum covers the
//! operational failures around them.

use crate::validator::ValidationIssue;

/// All errors that can occur while configuring or running the comment service.
#[derive(Debug, thiserror::Error)]
pub enum CommentatorError {
    /// A comment store failed to read or persist comments.
    #[error("Comment store failed: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),

    /// The rate-limit state store failed.
    #[error("Rate-limit state store failed: {0}")]
    StateStore(String),

    /// The internal channel to the background worker is closed or full.
    #[error("Channel closed or full")]
    ChannelClosed,

    /// A configured pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A comment or payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The thread URL a comment was submitted against is not acceptable.
    #[error("Invalid thread url ({} issue(s))", .0.len())]
    InvalidUrl(Vec<ValidationIssue>),

    /// The builder configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

/// A type alias for `Result<T, CommentatorError>`.
pub type Result<T> = std::result::Result<T, CommentatorError>;
