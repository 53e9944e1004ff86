//! The comment-text sanitizer: strips active markup, then escapes what is left.

use super::{EscapeSanitizer, RegexSanitizer, Sanitizer};

/// Complete `<script>` blocks. Lazy so the match ends at the first closing
/// tag; `s` so bodies spanning lines are covered.
pub const SCRIPT_BLOCK: &str = r"(?is)<script\b.*?</script>";
/// Complete `<iframe>` blocks.
pub const IFRAME_BLOCK: &str = r"(?is)<iframe\b.*?</iframe>";
/// `javascript:` scheme, anywhere.
pub const JAVASCRIPT_SCHEME: &str = r"(?i)javascript:";
/// Inline event-handler attributes such as `onclick=` or `onerror =`.
pub const EVENT_HANDLER: &str = r"(?i)\bon\w+\s*=";
/// `data:` URIs declaring a base64 payload.
pub const BASE64_DATA_URI: &str = r"(?i)data:[^;,\s]*;base64";

/// Default strip patterns, in application order.
pub const DEFAULT_STRIP_PATTERNS: [&str; 5] = [
    SCRIPT_BLOCK,
    IFRAME_BLOCK,
    JAVASCRIPT_SCHEME,
    EVENT_HANDLER,
    BASE64_DATA_URI,
];

/// Sanitizer that turns arbitrary text into something safe to store and later
/// render inside HTML.
///
/// Three stages run in a fixed order:
///
/// 1. dangerous constructs are stripped (see [`DEFAULT_STRIP_PATTERNS`]),
///    repeating until nothing more matches so that a removal can never splice
///    together a new match (`javajavascript:script:`);
/// 2. the HTML metacharacters are escaped by [`EscapeSanitizer::html`];
/// 3. surrounding whitespace is trimmed.
///
/// # Example
///
/// ```
/// use commentator::{MarkupSanitizer, Sanitizer};
///
/// let s = MarkupSanitizer::new();
/// assert_eq!(s.sanitize(" <b>hi</b><script>x()</script> "), "&lt;b&gt;hi&lt;/b&gt;");
/// ```
pub struct MarkupSanitizer {
    strip: RegexSanitizer,
    escape: EscapeSanitizer,
}

impl MarkupSanitizer {
    /// Sanitizer with the default strip patterns and HTML escaping.
    pub fn new() -> Self {
        Self {
            strip: RegexSanitizer::new(DEFAULT_STRIP_PATTERNS.iter().map(|p| (*p, "")).collect()),
            escape: EscapeSanitizer::html(),
        }
    }

    /// Sanitizer with a custom set of strip patterns.
    pub fn with_strip_patterns(patterns: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            strip: RegexSanitizer::strip(patterns)?,
            escape: EscapeSanitizer::html(),
        })
    }

    fn strip_until_stable(&self, input: &str) -> String {
        let mut current = input.to_string();
        loop {
            let next = self.strip.sanitize(&current);
            // Every effective pass removes at least one byte, so this ends.
            if next == current {
                return next;
            }
            current = next;
        }
    }
}

impl Default for MarkupSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for MarkupSanitizer {
    fn sanitize(&self, input: &str) -> String {
        let stripped = self.strip_until_stable(input);
        self.escape.sanitize(&stripped).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(input: &str) -> String {
        MarkupSanitizer::new().sanitize(input)
    }

    #[test]
    fn removes_script_blocks_any_case() {
        assert_eq!(clean("a<ScRiPt type=\"x\">evil()</sCrIpT>b"), "ab");
    }

    #[test]
    fn removes_multiline_script_block() {
        assert_eq!(clean("before<script>\nline1\nline2\n</script>after"), "beforeafter");
    }

    #[test]
    fn script_block_ends_at_first_closing_tag() {
        let out = clean("<script>a</script>keep<script>b</script>");
        assert_eq!(out, "keep");
    }

    #[test]
    fn unclosed_script_is_escaped_not_kept() {
        let out = clean("<script>alert(1)");
        assert_eq!(out, "&lt;script&gt;alert(1)");
    }

    #[test]
    fn removes_iframes() {
        assert_eq!(clean("x<iframe src=\"//evil\"></IFRAME>y"), "xy");
    }

    #[test]
    fn removes_javascript_scheme() {
        assert_eq!(clean("click JavaScript:alert(1)"), "click alert(1)");
    }

    #[test]
    fn removal_does_not_resurrect_scheme() {
        assert_eq!(clean("javajavascript:script:go"), "go");
    }

    #[test]
    fn removes_event_handlers() {
        assert_eq!(clean("<img onerror=x>"), "&lt;img x&gt;");
        assert_eq!(clean("<div ONCLICK = \"y\">"), "&lt;div  &quot;y&quot;&gt;");
    }

    #[test]
    fn event_handler_needs_word_boundary() {
        assert_eq!(clean("moonlight=bright"), "moonlight=bright");
    }

    #[test]
    fn handler_after_slash_or_quote_is_stripped() {
        assert_eq!(clean("<svg/onload=x>"), "&lt;svg/x&gt;");
        assert_eq!(clean("<a\"onmouseover=x>"), "&lt;a&quot;x&gt;");
        assert_eq!(clean("<img src=x\tONERROR\t=alert(1)>"), "&lt;img src=x\talert(1)&gt;");
    }

    #[test]
    fn removes_base64_data_uri_prefix() {
        let out = clean("data:text/html;base64,PHNjcmlwdD4=");
        assert_eq!(out, ",PHNjcmlwdD4=");
        assert!(!out.to_lowercase().contains("base64"));
    }

    #[test]
    fn plain_data_uri_left_alone() {
        assert_eq!(clean("data:text/plain,hello"), "data:text/plain,hello");
    }

    #[test]
    fn escapes_and_trims() {
        assert_eq!(clean("  Tom & \"Jerry\"  "), "Tom &amp; &quot;Jerry&quot;");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(clean(" \n\t "), "");
    }

    #[test]
    fn custom_strip_patterns() {
        let s = MarkupSanitizer::with_strip_patterns(&[r"(?i)badword"]).unwrap();
        assert_eq!(s.sanitize("a BADWORD <script>"), "a  &lt;script&gt;");
    }
}
