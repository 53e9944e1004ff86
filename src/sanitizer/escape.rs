//! Literal-replacement sanitizer used for HTML metacharacter escaping.

use super::Sanitizer;

/// Ampersand first, otherwise the entities inserted by later rules would be
/// escaped a second time.
const HTML_ENTITIES: [(&str, &str); 5] = [
    ("&", "&amp;"),
    ("<", "&lt;"),
    (">", "&gt;"),
    ("\"", "&quot;"),
    ("'", "&#x27;"),
];

/// Sanitizer that performs exact substring replacements in order.
///
/// # Example
///
/// ```
/// use commentator::{EscapeSanitizer, Sanitizer};
///
/// let s = EscapeSanitizer::html();
/// assert_eq!(s.sanitize("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
/// ```
pub struct EscapeSanitizer {
    rules: Vec<(String, String)>,
}

impl EscapeSanitizer {
    /// Create an `EscapeSanitizer` from `(needle, replacement)` pairs.
    pub fn new(rules: Vec<(&str, &str)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(needle, replacement)| (needle.to_string(), replacement.to_string()))
                .collect(),
        }
    }

    /// Escapes the five HTML metacharacters `& < > " '`.
    pub fn html() -> Self {
        Self::new(HTML_ENTITIES.to_vec())
    }
}

impl Default for EscapeSanitizer {
    fn default() -> Self {
        Self::html()
    }
}

impl Sanitizer for EscapeSanitizer {
    fn sanitize(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |acc, (needle, replacement)| {
                acc.replace(needle, replacement)
            })
    }
}
