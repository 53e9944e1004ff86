//! Immutable rule tables consumed by the [`Validator`](super::Validator).

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opening `<script` tag.
pub const SCRIPT_TAG: &str = r"(?i)<\s*script\b";
/// Opening `<iframe` tag.
pub const IFRAME_TAG: &str = r"(?i)<\s*iframe\b";
/// `javascript:` scheme.
pub const JAVASCRIPT_URI: &str = r"(?i)javascript:";
/// SQL keywords as whole words, quote characters and comment markers.
pub const SQL_INJECTION: &str =
    r#"(?i)\b(?:select|insert|update|delete|drop|union|alter|create)\b|['"]|--|/\*|\*/"#;

/// Display names: letters, digits, space, dot, underscore and hyphen.
pub const DISPLAY_NAME: &str = r"^[A-Za-z0-9 ._-]{1,50}$";
/// `local@domain.tld`.
pub const EMAIL: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
/// `http://` or `https://` followed by a host and an optional path.
pub const HTTP_URL: &str = r"(?i)^https?://[^\s/$.?#][^\s]*$";

/// Maximum field lengths, counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub comment_max: usize,
    pub display_name_max: usize,
    pub email_max: usize,
    pub url_max: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            comment_max: 5000,
            display_name_max: 50,
            email_max: 254,
            url_max: 2083,
        }
    }
}

/// Signatures that mark free text as hostile.
///
/// `markup` covers script injection (one issue no matter how many match),
/// `sql` covers SQL injection (a separate issue).
#[derive(Debug, Clone)]
pub struct SecurityPatterns {
    pub markup: Vec<Regex>,
    pub sql: Vec<Regex>,
}

impl SecurityPatterns {
    /// Compile custom pattern sets.
    pub fn try_new(markup: &[&str], sql: &[&str]) -> Result<Self> {
        Ok(Self {
            markup: compile_all(markup)?,
            sql: compile_all(sql)?,
        })
    }

    /// Whether `text` contains a script, iframe or `javascript:` construct.
    pub fn matches_markup(&self, text: &str) -> bool {
        self.markup.iter().any(|re| re.is_match(text))
    }

    /// Whether `text` looks like SQL injection.
    pub fn matches_sql(&self, text: &str) -> bool {
        self.sql.iter().any(|re| re.is_match(text))
    }
}

impl Default for SecurityPatterns {
    fn default() -> Self {
        Self::try_new(&[SCRIPT_TAG, IFRAME_TAG, JAVASCRIPT_URI], &[SQL_INJECTION])
            .expect("built-in security patterns compile")
    }
}

/// Everything the validator checks against, built once and shared.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub limits: ValidationLimits,
    pub security: SecurityPatterns,
    pub display_name: Regex,
    pub email: Regex,
    pub url: Regex,
    pub javascript_uri: Regex,
}

impl ValidationRules {
    /// Default format patterns with the given limits and security patterns.
    pub fn new(limits: ValidationLimits, security: SecurityPatterns) -> Self {
        Self {
            limits,
            security,
            ..Self::default()
        }
    }

    /// Replace the display-name format pattern.
    pub fn with_display_name_pattern(mut self, pattern: &str) -> Result<Self> {
        self.display_name = Regex::new(pattern)?;
        Ok(self)
    }

    /// Replace the email format pattern.
    pub fn with_email_pattern(mut self, pattern: &str) -> Result<Self> {
        self.email = Regex::new(pattern)?;
        Ok(self)
    }

    /// Replace the URL format pattern.
    pub fn with_url_pattern(mut self, pattern: &str) -> Result<Self> {
        self.url = Regex::new(pattern)?;
        Ok(self)
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            limits: ValidationLimits::default(),
            security: SecurityPatterns::default(),
            display_name: Regex::new(DISPLAY_NAME).expect("built-in display name pattern"),
            email: Regex::new(EMAIL).expect("built-in email pattern"),
            url: Regex::new(HTTP_URL).expect("built-in url pattern"),
            javascript_uri: Regex::new(JAVASCRIPT_URI).expect("built-in javascript pattern"),
        }
    }
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(Into::into))
        .collect()
}
