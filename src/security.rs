//! DOM-level security checks applied during conversion
//!
//! Editor HTML is untrusted. While walking the DOM the converter:
//!
//! 1. drops elements that carry executable or non-content payloads
//!    (`<script>`, `<iframe>`, `<object>`, ...) together with their children;
//! 2. refuses link and image targets with executable URL schemes;
//! 3. bounds the nesting depth so pathological input cannot exhaust the stack.
//!
//! String-level sanitization of HTML that is rendered back to the site lives
//! in [`crate::sanitize`].

/// Elements removed entirely, children included
const DANGEROUS_ELEMENTS: &[&str] = &[
    "script",   // JavaScript execution
    "style",    // CSS injection (can contain expressions)
    "noscript", // Alternative content, not needed for Markdown
    "iframe",   // Can load external content
    "object",   // Can execute plugins
    "embed",    // Can execute plugins
    "applet",   // Legacy Java applets
    "link",     // Can load external stylesheets with expressions
    "base",     // Can change base URL for all relative URLs
];

/// URL schemes never written into Markdown links or images
const DANGEROUS_URL_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:", "file:", "about:"];

/// Action to take when an element is encountered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeAction {
    /// Convert the element normally
    Allow,
    /// Remove the element and all its children
    Remove,
}

/// Security validator for DOM traversal
#[derive(Debug, Clone)]
pub struct SecurityValidator {
    max_depth: usize,
}

impl SecurityValidator {
    /// Create a validator with the given maximum nesting depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Decide whether an element is converted or dropped
    ///
    /// ```
    /// use cms_markdown_converter::security::{SecurityValidator, SanitizeAction};
    ///
    /// let validator = SecurityValidator::with_max_depth(100);
    /// assert_eq!(validator.check_element("script"), SanitizeAction::Remove);
    /// assert_eq!(validator.check_element("div"), SanitizeAction::Allow);
    /// ```
    pub fn check_element(&self, tag_name: &str) -> SanitizeAction {
        if DANGEROUS_ELEMENTS.contains(&tag_name) {
            SanitizeAction::Remove
        } else {
            SanitizeAction::Allow
        }
    }

    /// Check if a URL uses a dangerous scheme (case-insensitive, leading
    /// whitespace ignored)
    pub fn is_dangerous_url(&self, url: &str) -> bool {
        let url_lower = url.trim().to_lowercase();
        DANGEROUS_URL_SCHEMES
            .iter()
            .any(|scheme| url_lower.starts_with(scheme))
    }

    /// Return the URL if it is safe to emit
    ///
    /// ```
    /// use cms_markdown_converter::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::with_max_depth(100);
    /// assert_eq!(validator.sanitize_url("javascript:alert('xss')"), None);
    /// assert_eq!(validator.sanitize_url("/kolsai-lakes"), Some("/kolsai-lakes"));
    /// ```
    pub fn sanitize_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        if self.is_dangerous_url(url) {
            None
        } else {
            Some(url)
        }
    }

    /// Validate nesting depth to prevent stack exhaustion
    pub fn validate_depth(&self, depth: usize) -> Result<(), String> {
        if depth > self.max_depth {
            Err(format!(
                "HTML nesting depth {} exceeds maximum allowed depth {}",
                depth, self.max_depth
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for SecurityValidator {
    fn default() -> Self {
        Self::with_max_depth(crate::options::DEFAULT_MAX_DEPTH)
    }
}
