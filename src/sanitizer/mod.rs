//! Sanitizers that neutralize user-supplied text before it is stored.
//!
//! Sanitizers implement the [`Sanitizer`] trait and are composed into a
//! [`SanitizerPipeline`] that runs them sequentially.
//!
//! Built-in sanitizers:
//!
//! - [`MarkupSanitizer`] -- strips scripts, iframes, `javascript:` schemes,
//!   event handlers and base64 `data:` URIs, then escapes HTML.
//! - [`RegexSanitizer`] -- regex-based replacements.
//! - [`EscapeSanitizer`] -- literal replacements, HTML escaping by default.

mod escape;
mod markup;
mod regex;

pub use self::regex::RegexSanitizer;
pub use escape::EscapeSanitizer;
pub use markup::{
    BASE64_DATA_URI, DEFAULT_STRIP_PATTERNS, EVENT_HANDLER, IFRAME_BLOCK, JAVASCRIPT_SCHEME,
    MarkupSanitizer, SCRIPT_BLOCK,
};

use once_cell::sync::Lazy;

static DEFAULT_MARKUP: Lazy<MarkupSanitizer> = Lazy::new(MarkupSanitizer::new);

/// Trait for text sanitizers.
///
/// Implementations must be `Send + Sync` so a single pipeline can be shared
/// between the submitting tasks and the background worker.
pub trait Sanitizer: Send + Sync {
    /// Transform the given text, returning the sanitized result.
    fn sanitize(&self, input: &str) -> String;
}

/// Sanitize free text with the default [`MarkupSanitizer`].
///
/// Absent input is treated as the empty string.
///
/// ```
/// assert_eq!(commentator::sanitize(Some("<script>alert(1)</script>hi")), "hi");
/// assert_eq!(commentator::sanitize(None), "");
/// ```
pub fn sanitize(input: Option<&str>) -> String {
    DEFAULT_MARKUP.sanitize(input.unwrap_or_default())
}

/// An ordered chain of [`Sanitizer`] implementations applied sequentially.
///
/// Each sanitizer receives the output of the previous one. An empty pipeline
/// is a no-op.
pub struct SanitizerPipeline {
    sanitizers: Vec<Box<dyn Sanitizer>>,
}

impl SanitizerPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            sanitizers: Vec::new(),
        }
    }

    /// Pipeline holding only the default [`MarkupSanitizer`].
    pub fn markup() -> Self {
        let mut pipeline = Self::new();
        pipeline.add(MarkupSanitizer::new());
        pipeline
    }

    /// Append a sanitizer to the end of the pipeline.
    pub fn add(&mut self, sanitizer: impl Sanitizer + 'static) {
        self.sanitizers.push(Box::new(sanitizer));
    }

    /// Run the full pipeline on the given text, returning the final result.
    pub fn sanitize(&self, input: &str) -> String {
        self.sanitizers
            .iter()
            .fold(input.to_string(), |acc, s| s.sanitize(&acc))
    }

    /// Returns `true` if no sanitizers have been added.
    pub fn is_empty(&self) -> bool {
        self.sanitizers.is_empty()
    }
}

impl Default for SanitizerPipeline {
    fn default() -> Self {
        Self::markup()
    }
}

impl Sanitizer for SanitizerPipeline {
    fn sanitize(&self, input: &str) -> String {
        SanitizerPipeline::sanitize(self, input)
    }
}
