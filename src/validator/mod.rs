//! Field validation for comment submissions.
//!
//! Every check reports through a [`ValidationResult`]: a verdict, the ordered
//! list of [`ValidationIssue`]s and the sanitized value, which is filled in
//! even when the input is rejected so callers can log it safely.

mod rules;

pub use rules::{
    DISPLAY_NAME, EMAIL, HTTP_URL, IFRAME_TAG, JAVASCRIPT_URI, SCRIPT_TAG, SQL_INJECTION,
    SecurityPatterns, ValidationLimits, ValidationRules,
};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sanitizer::SanitizerPipeline;

/// Classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Required,
    TooShort,
    TooLong,
    InvalidFormat,
    SecurityViolation,
    RateLimited,
}

impl ErrorKind {
    /// The wire name, e.g. `TOO_SHORT`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Required => "REQUIRED",
            ErrorKind::TooShort => "TOO_SHORT",
            ErrorKind::TooLong => "TOO_LONG",
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::SecurityViolation => "SECURITY_VIOLATION",
            ErrorKind::RateLimited => "RATE_LIMITED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ErrorKind,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    /// Issue of `kind` on `field` with a human-readable `message`.
    pub fn new(kind: ErrorKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.kind, self.message)
    }
}

/// Verdict, issues and sanitized value for one field or one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult<T = String> {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub sanitized: T,
}

impl<T> ValidationResult<T> {
    /// `valid` is derived from `errors`, never set independently.
    pub fn new(errors: Vec<ValidationIssue>, sanitized: T) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            sanitized,
        }
    }

    /// Whether any issue has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|issue| issue.kind == kind)
    }

    /// Issues attached to `field`.
    pub fn issues_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.errors.iter().filter(move |issue| issue.field == field)
    }

    /// Plain error messages, in evaluation order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|issue| issue.message.as_str()).collect()
    }
}

/// Validates the individual fields of a comment submission.
///
/// # Example
///
/// ```
/// use commentator::{ErrorKind, Validator};
///
/// let validator = Validator::default();
/// let result = validator.validate_comment(Some("<script>alert(1)</script>"));
/// assert!(!result.valid);
/// assert!(result.has_kind(ErrorKind::SecurityViolation));
/// assert_eq!(result.sanitized, "");
/// ```
pub struct Validator {
    rules: ValidationRules,
    sanitizers: SanitizerPipeline,
}

impl Validator {
    /// Validator using `rules` and cleaning text with `sanitizers`.
    pub fn new(rules: ValidationRules, sanitizers: SanitizerPipeline) -> Self {
        Self { rules, sanitizers }
    }

    /// The rule tables in use.
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Run the sanitizer pipeline on free text.
    pub fn sanitize(&self, input: &str) -> String {
        self.sanitizers.sanitize(input)
    }

    /// Validate comment text.
    pub fn validate_comment(&self, text: Option<&str>) -> ValidationResult {
        const FIELD: &str = "text";
        let Some(text) = text else {
            return required(FIELD, "Comment text is required");
        };

        let mut errors = Vec::new();
        let len = text.chars().count();
        if len == 0 {
            errors.push(ValidationIssue::new(
                ErrorKind::TooShort,
                FIELD,
                "Comment cannot be empty",
            ));
        }
        if len > self.rules.limits.comment_max {
            errors.push(ValidationIssue::new(
                ErrorKind::TooLong,
                FIELD,
                format!(
                    "Comment must be at most {} characters, got {len}",
                    self.rules.limits.comment_max
                ),
            ));
        }
        if self.rules.security.matches_markup(text) {
            errors.push(ValidationIssue::new(
                ErrorKind::SecurityViolation,
                FIELD,
                "Comment contains potentially dangerous markup",
            ));
        }
        if self.rules.security.matches_sql(text) {
            errors.push(ValidationIssue::new(
                ErrorKind::SecurityViolation,
                FIELD,
                "Comment contains potentially dangerous SQL patterns",
            ));
        }

        ValidationResult::new(errors, self.sanitize(text))
    }

    /// Validate a display name.
    pub fn validate_display_name(&self, name: Option<&str>) -> ValidationResult {
        const FIELD: &str = "author";
        let Some(name) = name else {
            return required(FIELD, "Display name is required");
        };

        let mut errors = Vec::new();
        let len = name.chars().count();
        if len == 0 {
            errors.push(ValidationIssue::new(
                ErrorKind::TooShort,
                FIELD,
                "Display name cannot be empty",
            ));
        }
        if len > self.rules.limits.display_name_max {
            errors.push(ValidationIssue::new(
                ErrorKind::TooLong,
                FIELD,
                format!(
                    "Display name must be at most {} characters",
                    self.rules.limits.display_name_max
                ),
            ));
        }
        if !self.rules.display_name.is_match(name) {
            errors.push(ValidationIssue::new(
                ErrorKind::InvalidFormat,
                FIELD,
                "Display name may only contain letters, numbers, spaces, dots, underscores and hyphens",
            ));
        }

        ValidationResult::new(errors, self.sanitize(name))
    }

    /// Validate an optional email address.
    pub fn validate_email(&self, email: Option<&str>) -> ValidationResult {
        const FIELD: &str = "email";
        let email = email.map(str::trim).unwrap_or_default();
        if email.is_empty() {
            return ValidationResult::new(Vec::new(), String::new());
        }

        let mut errors = Vec::new();
        if !self.rules.email.is_match(email) {
            errors.push(ValidationIssue::new(
                ErrorKind::InvalidFormat,
                FIELD,
                "Email address is not valid",
            ));
        }
        if email.chars().count() > self.rules.limits.email_max {
            errors.push(ValidationIssue::new(
                ErrorKind::TooLong,
                FIELD,
                format!(
                    "Email must be at most {} characters",
                    self.rules.limits.email_max
                ),
            ));
        }

        ValidationResult::new(errors, email.to_lowercase())
    }

    /// Validate the URL a comment thread is attached to.
    pub fn validate_url(&self, url: Option<&str>) -> ValidationResult {
        const FIELD: &str = "url";
        let Some(url) = url else {
            return required(FIELD, "URL is required");
        };
        let url = url.trim();

        let mut errors = Vec::new();
        if !self.rules.url.is_match(url) {
            errors.push(ValidationIssue::new(
                ErrorKind::InvalidFormat,
                FIELD,
                "URL must be an http(s) address",
            ));
        }
        if url.chars().count() > self.rules.limits.url_max {
            errors.push(ValidationIssue::new(
                ErrorKind::TooLong,
                FIELD,
                format!("URL must be at most {} characters", self.rules.limits.url_max),
            ));
        }
        if self.rules.javascript_uri.is_match(url) {
            errors.push(ValidationIssue::new(
                ErrorKind::SecurityViolation,
                FIELD,
                "URL contains a javascript: scheme",
            ));
        }

        ValidationResult::new(errors, url.to_string())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationRules::default(), SanitizerPipeline::markup())
    }
}

fn required(field: &str, message: &str) -> ValidationResult {
    ValidationResult::new(
        vec![ValidationIssue::new(ErrorKind::Required, field, message)],
        String::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::RegexSanitizer;

    fn kinds(result: &ValidationResult) -> Vec<ErrorKind> {
        result.errors.iter().map(|issue| issue.kind).collect()
    }

    #[test]
    fn comment_absent_is_required_only() {
        let result = Validator::default().validate_comment(None);
        assert!(!result.valid);
        assert_eq!(kinds(&result), vec![ErrorKind::Required]);
        assert_eq!(result.sanitized, "");
    }

    #[test]
    fn comment_empty_is_too_short() {
        let result = Validator::default().validate_comment(Some(""));
        assert_eq!(kinds(&result), vec![ErrorKind::TooShort]);
    }

    #[test]
    fn comment_length_boundary() {
        let v = Validator::default();
        assert!(v.validate_comment(Some(&"a".repeat(5000))).valid);

        let result = v.validate_comment(Some(&"a".repeat(5001)));
        assert!(!result.valid);
        assert_eq!(kinds(&result), vec![ErrorKind::TooLong]);
    }

    #[test]
    fn comment_length_counts_characters_not_bytes() {
        let v = Validator::default();
        assert!(v.validate_comment(Some(&"é".repeat(5000))).valid);
    }

    #[test]
    fn comment_sql_injection() {
        let result = Validator::default().validate_comment(Some("Hello'; DROP TABLE comments; --"));
        assert!(!result.valid);
        assert!(result.has_kind(ErrorKind::SecurityViolation));
    }

    #[test]
    fn comment_issues_accumulate() {
        let text = format!("<script>x</script>' {}", "a".repeat(5000));
        let result = Validator::default().validate_comment(Some(&text));
        assert_eq!(
            kinds(&result),
            vec![
                ErrorKind::TooLong,
                ErrorKind::SecurityViolation,
                ErrorKind::SecurityViolation
            ]
        );
        assert!(!result.sanitized.contains("<script"));
    }

    #[test]
    fn comment_sanitized_even_when_valid() {
        let result = Validator::default().validate_comment(Some("  5 > 3  "));
        assert!(result.valid);
        assert_eq!(result.sanitized, "5 &gt; 3");
    }

    #[test]
    fn display_name_rules() {
        let v = Validator::default();
        assert!(v.validate_display_name(Some("Bob")).valid);
        assert!(v.validate_display_name(Some("jane.doe_42-x")).valid);

        let result = v.validate_display_name(None);
        assert_eq!(kinds(&result), vec![ErrorKind::Required]);

        let result = v.validate_display_name(Some(""));
        assert_eq!(kinds(&result), vec![ErrorKind::TooShort, ErrorKind::InvalidFormat]);

        let result = v.validate_display_name(Some(&"a".repeat(51)));
        assert_eq!(kinds(&result), vec![ErrorKind::TooLong, ErrorKind::InvalidFormat]);

        let result = v.validate_display_name(Some("<img onerror=x>"));
        assert_eq!(kinds(&result), vec![ErrorKind::InvalidFormat]);
        assert_eq!(result.sanitized, "&lt;img x&gt;");
    }

    #[test]
    fn email_is_optional() {
        let v = Validator::default();
        for input in [None, Some(""), Some("   ")] {
            let result = v.validate_email(input);
            assert!(result.valid);
            assert!(result.errors.is_empty());
            assert_eq!(result.sanitized, "");
        }
    }

    #[test]
    fn email_rules() {
        let v = Validator::default();
        let result = v.validate_email(Some("  Jane.Doe@Example.COM "));
        assert!(result.valid);
        assert_eq!(result.sanitized, "jane.doe@example.com");

        let result = v.validate_email(Some("bad"));
        assert_eq!(kinds(&result), vec![ErrorKind::InvalidFormat]);

        let long = format!("{}@example.com", "a".repeat(250));
        let result = v.validate_email(Some(&long));
        assert_eq!(kinds(&result), vec![ErrorKind::TooLong]);
    }

    #[test]
    fn url_rules() {
        let v = Validator::default();
        let result = v.validate_url(Some(" https://example.com/post/1 "));
        assert!(result.valid);
        assert_eq!(result.sanitized, "https://example.com/post/1");

        assert_eq!(kinds(&v.validate_url(None)), vec![ErrorKind::Required]);
        assert_eq!(kinds(&v.validate_url(Some(""))), vec![ErrorKind::InvalidFormat]);

        let result = v.validate_url(Some("javascript:alert(1)"));
        assert_eq!(
            kinds(&result),
            vec![ErrorKind::InvalidFormat, ErrorKind::SecurityViolation]
        );

        let result = v.validate_url(Some("https://example.com/?next=javascript:x"));
        assert_eq!(kinds(&result), vec![ErrorKind::SecurityViolation]);

        let long = format!("https://example.com/{}", "a".repeat(2100));
        assert_eq!(kinds(&v.validate_url(Some(&long))), vec![ErrorKind::TooLong]);
    }

    #[test]
    fn custom_rules_and_pipeline() {
        let limits = ValidationLimits {
            comment_max: 10,
            ..ValidationLimits::default()
        };
        let security = SecurityPatterns::try_new(&[r"(?i)viagra"], &[]).unwrap();
        let mut pipeline = SanitizerPipeline::markup();
        pipeline.add(RegexSanitizer::new(vec![(r"\bok\b", "OK")]));
        let v = Validator::new(ValidationRules::new(limits, security), pipeline);

        // Quotes are no longer rejected once the SQL patterns are replaced.
        let result = v.validate_comment(Some("it's ok"));
        assert!(result.valid);
        assert_eq!(result.sanitized, "it&#x27;s OK");

        let result = v.validate_comment(Some("VIAGRA now!"));
        assert_eq!(
            kinds(&result),
            vec![ErrorKind::TooLong, ErrorKind::SecurityViolation]
        );
    }

    #[test]
    fn error_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::SecurityViolation).unwrap();
        assert_eq!(json, "\"SECURITY_VIOLATION\"");
        assert_eq!(ErrorKind::RateLimited.to_string(), "RATE_LIMITED");
    }

    #[test]
    fn messages_projection() {
        let result = Validator::default().validate_display_name(None);
        assert_eq!(result.messages(), vec!["Display name is required"]);
        assert_eq!(result.issues_for("author").count(), 1);
        assert_eq!(result.issues_for("text").count(), 0);
    }
}
