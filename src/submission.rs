//! The composite check run on every comment submission.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::rate_limit::{RateLimitPolicy, RateLimiter};
use crate::validator::{ErrorKind, ValidationIssue, ValidationResult, Validator};

/// Raw fields of a comment submission as received from the widget.
///
/// Every field is optional at this level; absence is reported by the
/// validator rather than rejected during parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub text: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    /// Id of the comment this one replies to.
    pub parent_id: Option<String>,
}

impl Submission {
    /// Top-level comment with no email.
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            author: Some(author.into()),
            ..Self::default()
        }
    }

    /// Attach the author's email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Make this a reply to the comment with id `parent_id`.
    pub fn reply_to(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Read a submission out of an untyped JSON payload.
    ///
    /// Members that are missing, `null`, or not strings become `None` and are
    /// therefore reported as `REQUIRED` where the field is mandatory. A
    /// payload that is not an object yields an empty submission.
    pub fn from_json(payload: &Value) -> Self {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            text: field("text"),
            author: field("author"),
            email: field("email"),
            parent_id: field("parent_id"),
        }
    }
}

/// Sanitized counterpart of a [`Submission`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedSubmission {
    pub text: String,
    pub author: String,
    pub email: String,
    pub parent_id: Option<Uuid>,
}

/// Rate limiting plus per-field validation for whole submissions.
///
/// # Example
///
/// ```
/// use commentator::{Submission, SubmissionValidator};
///
/// let guard = SubmissionValidator::default();
/// let result = guard.validate_submission(&Submission::new("Nice site!", "Bob"), "user-42");
/// assert!(result.valid);
/// assert_eq!(result.sanitized.text, "Nice site!");
/// ```
pub struct SubmissionValidator {
    validator: Validator,
    limiter: RateLimiter,
    policy: RateLimitPolicy,
}

impl SubmissionValidator {
    /// Combine field validation with rate limiting under `policy`.
    pub fn new(validator: Validator, limiter: RateLimiter, policy: RateLimitPolicy) -> Self {
        Self {
            validator,
            limiter,
            policy,
        }
    }

    /// The field validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// The rate-limit policy applied to every submission.
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Check `data` on behalf of `identifier`.
    ///
    /// The rate limiter is consulted first and records the attempt unless it
    /// is already over the limit. Issues are reported in the order rate
    /// limit, text, author, email, parent.
    pub fn validate_submission(
        &self,
        data: &Submission,
        identifier: &str,
    ) -> ValidationResult<SanitizedSubmission> {
        let mut errors = Vec::new();

        if self.limiter.check(identifier, &self.policy) {
            errors.push(ValidationIssue::new(
                ErrorKind::RateLimited,
                "identifier",
                "Too many comments, please wait before posting again",
            ));
        }

        let text = self.validator.validate_comment(data.text.as_deref());
        let author = self.validator.validate_display_name(data.author.as_deref());
        let email = self.validator.validate_email(data.email.as_deref());
        let (parent_id, parent_issue) = parse_parent(data.parent_id.as_deref());

        errors.extend(text.errors);
        errors.extend(author.errors);
        errors.extend(email.errors);
        errors.extend(parent_issue);

        if !errors.is_empty() {
            tracing::debug!(identifier, issues = errors.len(), "Submission rejected");
        }

        ValidationResult::new(
            errors,
            SanitizedSubmission {
                text: text.sanitized,
                author: author.sanitized,
                email: email.sanitized,
                parent_id,
            },
        )
    }
}

impl Default for SubmissionValidator {
    fn default() -> Self {
        Self::new(
            Validator::default(),
            RateLimiter::in_memory(),
            RateLimitPolicy::default(),
        )
    }
}

fn parse_parent(raw: Option<&str>) -> (Option<Uuid>, Option<ValidationIssue>) {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return (None, None);
    };
    match Uuid::parse_str(raw) {
        Ok(id) => (Some(id), None),
        Err(_) => (
            None,
            Some(ValidationIssue::new(
                ErrorKind::InvalidFormat,
                "parent_id",
                "Reply target is not a valid comment id",
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::rate_limit::{ManualClock, MemoryStore};

    fn guard_with_clock(limit: usize) -> (SubmissionValidator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()), clock.clone());
        let guard = SubmissionValidator::new(
            Validator::default(),
            limiter,
            RateLimitPolicy::new(limit, Duration::from_secs(60)),
        );
        (guard, clock)
    }

    fn kinds<T>(result: &ValidationResult<T>) -> Vec<(ErrorKind, &str)> {
        result
            .errors
            .iter()
            .map(|issue| (issue.kind, issue.field.as_str()))
            .collect()
    }

    #[test]
    fn benign_submission() {
        let guard = SubmissionValidator::default();
        let data = Submission::new("Nice site!", "Bob").with_email("");
        let result = guard.validate_submission(&data, "user-42");

        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.sanitized,
            SanitizedSubmission {
                text: "Nice site!".into(),
                author: "Bob".into(),
                email: String::new(),
                parent_id: None,
            }
        );
    }

    #[test]
    fn malicious_submission() {
        let guard = SubmissionValidator::default();
        let data = Submission::new("<script>alert(1)</script>", "<img onerror=x>").with_email("bad");
        let result = guard.validate_submission(&data, "user-42");

        assert!(!result.valid);
        assert_eq!(
            kinds(&result),
            vec![
                (ErrorKind::SecurityViolation, "text"),
                (ErrorKind::InvalidFormat, "author"),
                (ErrorKind::InvalidFormat, "email"),
            ]
        );
        assert!(!result.sanitized.text.to_lowercase().contains("<script"));
    }

    #[test]
    fn rate_limit_issue_comes_first() {
        let (guard, clock) = guard_with_clock(2);
        let data = Submission::new("hi", "Bob");
        assert!(guard.validate_submission(&data, "u1").valid);
        assert!(guard.validate_submission(&data, "u1").valid);

        let result = guard.validate_submission(&Submission::default(), "u1");
        assert_eq!(
            kinds(&result),
            vec![
                (ErrorKind::RateLimited, "identifier"),
                (ErrorKind::Required, "text"),
                (ErrorKind::Required, "author"),
            ]
        );

        // Another identifier is unaffected, and the window slides.
        assert!(guard.validate_submission(&data, "u2").valid);
        clock.advance(Duration::from_secs(61));
        assert!(guard.validate_submission(&data, "u1").valid);
    }

    #[test]
    fn invalid_submissions_still_count_as_attempts() {
        let (guard, _) = guard_with_clock(1);
        assert!(!guard.validate_submission(&Submission::default(), "u1").valid);
        let result = guard.validate_submission(&Submission::new("hi", "Bob"), "u1");
        assert_eq!(kinds(&result), vec![(ErrorKind::RateLimited, "identifier")]);
    }

    #[test]
    fn reply_parent_is_validated() {
        let guard = SubmissionValidator::default();
        let parent = Uuid::new_v4();
        let result =
            guard.validate_submission(&Submission::new("+1", "Ann").reply_to(parent.to_string()), "a");
        assert!(result.valid);
        assert_eq!(result.sanitized.parent_id, Some(parent));

        let result = guard.validate_submission(&Submission::new("+1", "Ann").reply_to("42"), "b");
        assert_eq!(kinds(&result), vec![(ErrorKind::InvalidFormat, "parent_id")]);

        let result = guard.validate_submission(&Submission::new("+1", "Ann").reply_to(" "), "c");
        assert!(result.valid);
        assert_eq!(result.sanitized.parent_id, None);
    }

    #[test]
    fn from_json_treats_non_strings_as_absent() {
        let data = Submission::from_json(&json!({
            "text": 42,
            "author": null,
            "email": "a@b.co",
            "parent_id": {"nested": true}
        }));
        assert_eq!(data.text, None);
        assert_eq!(data.author, None);
        assert_eq!(data.email.as_deref(), Some("a@b.co"));
        assert_eq!(data.parent_id, None);

        let result = SubmissionValidator::default().validate_submission(&data, "json");
        assert_eq!(
            kinds(&result),
            vec![(ErrorKind::Required, "text"), (ErrorKind::Required, "author")]
        );
    }

    #[test]
    fn from_json_non_object_is_empty() {
        assert_eq!(Submission::from_json(&json!("just text")), Submission::default());
    }

    #[test]
    fn result_serializes_for_callers() {
        let result = SubmissionValidator::default()
            .validate_submission(&Submission::new("", "Bob"), "ser");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["valid"], json!(false));
        assert_eq!(value["errors"][0]["kind"], json!("TOO_SHORT"));
        assert_eq!(value["sanitized"]["author"], json!("Bob"));
    }
}
