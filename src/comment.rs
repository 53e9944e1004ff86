//! Persisted comments and the thread keys they are filed under.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::submission::SanitizedSubmission;

/// A stored comment. Every text field holds sanitized content only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// [`thread_key`] of the page the comment belongs to.
    pub thread: String,
    pub parent_id: Option<Uuid>,
    pub author: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a new comment from an accepted submission.
    pub fn new(thread: impl Into<String>, sanitized: SanitizedSubmission) -> Self {
        let SanitizedSubmission {
            text,
            author,
            email,
            parent_id,
        } = sanitized;
        Self {
            id: Uuid::new_v4(),
            thread: thread.into(),
            parent_id,
            author,
            text,
            email: Some(email).filter(|e| !e.is_empty()),
            created_at: Utc::now(),
        }
    }

    /// Whether this comment answers another one.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Store key for the comment thread of `url`.
///
/// URL-safe base64 without padding, so the key contains only
/// `[A-Za-z0-9_-]` whatever the URL holds. Surrounding whitespace is ignored.
///
/// ```
/// assert_eq!(commentator::thread_key("https://a.io/"), "aHR0cHM6Ly9hLmlvLw");
/// ```
pub fn thread_key(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.trim())
}
