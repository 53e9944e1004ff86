//! Regex-based find-and-replace sanitizer.

use regex::Regex;

use super::Sanitizer;

/// Sanitizer that applies a series of regex find-and-replace rules.
///
/// Rules are applied in order; each rule operates on the output of the
/// previous one. A rule with an empty replacement strips its matches.
///
/// # Example
///
/// ```
/// use commentator::{RegexSanitizer, Sanitizer};
///
/// let sanitizer = RegexSanitizer::strip(&[r"(?i)javascript:"]).unwrap();
/// assert_eq!(sanitizer.sanitize("JavaScript:alert(1)"), "alert(1)");
/// ```
pub struct RegexSanitizer {
    rules: Vec<(Regex, String)>,
}

impl RegexSanitizer {
    /// Create a new `RegexSanitizer` from `(pattern, replacement)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if any regex pattern is invalid. Use [`try_new`](Self::try_new)
    /// for a fallible alternative.
    pub fn new(rules: Vec<(&str, &str)>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| {
                (
                    Regex::new(pattern).expect("invalid regex pattern"),
                    replacement.to_string(),
                )
            })
            .collect();
        Self { rules }
    }

    /// Fallible constructor that returns a [`regex::Error`] for invalid patterns.
    pub fn try_new(rules: Vec<(&str, &str)>) -> Result<Self, regex::Error> {
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, replacement.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Build a sanitizer that deletes every match of each pattern, in order.
    pub fn strip(patterns: &[&str]) -> Result<Self, regex::Error> {
        Self::try_new(patterns.iter().map(|p| (*p, "")).collect())
    }

    /// Number of rules in this sanitizer.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the sanitizer has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Sanitizer for RegexSanitizer {
    fn sanitize(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_removes_every_occurrence() {
        let sanitizer = RegexSanitizer::strip(&[r"(?i)javascript:"]).unwrap();
        let result = sanitizer.sanitize("javascript:a JAVASCRIPT:b jAvAsCrIpT:c");
        assert_eq!(result, "a b c");
    }

    #[test]
    fn strip_patterns_applied_in_order() {
        // The second rule only matches once the first has removed the marker.
        let sanitizer = RegexSanitizer::strip(&[r"#", r"ab"]).unwrap();
        assert_eq!(sanitizer.sanitize("a#b"), "");
    }

    #[test]
    fn replacement_rules() {
        let sanitizer = RegexSanitizer::new(vec![(r"(?i)\bdrop\b", "[removed]")]);
        assert_eq!(sanitizer.sanitize("please DROP it"), "please [removed] it");
    }

    #[test]
    fn no_rules_returns_original() {
        let sanitizer = RegexSanitizer::new(vec![]);
        assert!(sanitizer.is_empty());
        let text = "<p>unchanged</p>";
        assert_eq!(sanitizer.sanitize(text), text);
    }

    #[test]
    fn try_new_invalid_pattern() {
        let result = RegexSanitizer::try_new(vec![("[invalid", "x")]);
        assert!(result.is_err());
    }

    #[test]
    fn strip_invalid_pattern() {
        assert!(RegexSanitizer::strip(&["(unclosed"]).is_err());
    }

    #[test]
    fn len_counts_rules() {
        let sanitizer = RegexSanitizer::strip(&["a", "b", "c"]).unwrap();
        assert_eq!(sanitizer.len(), 3);
    }
}
