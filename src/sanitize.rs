//! Server-side HTML sanitization
//!
//! HTML that is rendered back onto the site (legacy HTML fields, and the
//! output of [`crate::render::markdown_to_html`]) goes through a string-level
//! pass that removes:
//!
//! - `<script>` elements with their content
//! - inline event handler attributes (`onclick="..."`, `onerror='...'`)
//! - `javascript:` and `data:text/html` URL prefixes
//! - `<iframe>`, `<object>` and `<embed>` elements with their content
//!
//! This is not a full HTML sanitizer: it works on text, not on a DOM, and
//! keeps every other element and attribute. If the patterns cannot be
//! compiled the sanitizer returns an empty string rather than unfiltered
//! HTML.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Minimum trimmed length of article content, in characters
pub const MIN_CONTENT_LENGTH: usize = 10;

/// Maximum trimmed length of article content, in characters
pub const MAX_CONTENT_LENGTH: usize = 100_000;

/// Applied in order; every match is removed
const REMOVAL_PATTERNS: &[&str] = &[
    r"(?is)<script\b.*?</script>",
    r#"(?i)\s*on\w+\s*=\s*["'][^"']*["']"#,
    r"(?i)javascript:",
    r"(?i)data:text/html",
    r"(?is)<iframe\b.*?</iframe>",
    r"(?is)<object\b.*?</object>",
    r"(?is)<embed\b.*?</embed>",
];

fn removal_patterns() -> Option<&'static [Regex]> {
    static PATTERNS: OnceLock<Option<Vec<Regex>>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            REMOVAL_PATTERNS
                .iter()
                .map(|pattern| Regex::new(pattern))
                .collect::<Result<Vec<_>, _>>()
                .ok()
        })
        .as_deref()
}

/// Remove executable content from an HTML string
///
/// ```rust
/// use cms_markdown_converter::sanitize::sanitize_html;
///
/// let html = r#"<p onclick="steal()">Hi</p><script>alert(1)</script>"#;
/// assert_eq!(sanitize_html(Some(html)), "<p>Hi</p>");
/// assert_eq!(sanitize_html(None), "");
/// ```
pub fn sanitize_html(html: Option<&str>) -> String {
    let Some(html) = html.filter(|html| !html.is_empty()) else {
        return String::new();
    };

    let Some(patterns) = removal_patterns() else {
        log::error!("[sanitize] removal patterns failed to compile; dropping content");
        return String::new();
    };

    let mut sanitized = html.to_string();
    for pattern in patterns {
        if pattern.is_match(&sanitized) {
            sanitized = pattern.replace_all(&sanitized, "").into_owned();
        }
    }
    sanitized
}

/// Result of validating article content before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentValidation {
    pub is_valid: bool,
    /// Sanitized, trimmed content (empty when the input was absent)
    pub sanitized: String,
    pub errors: Vec<String>,
}

/// Validate length limits and sanitize article HTML
///
/// Content longer than 100 characters that loses more than half of its
/// length to sanitization is flagged as unsafe.
pub fn validate_and_sanitize_content(content: Option<&str>) -> ContentValidation {
    let Some(content) = content.filter(|content| !content.is_empty()) else {
        return ContentValidation {
            is_valid: false,
            sanitized: String::new(),
            errors: vec!["Content is empty or invalid".to_string()],
        };
    };

    let mut errors = Vec::new();
    let trimmed = content.trim();
    let length = trimmed.chars().count();

    if length < MIN_CONTENT_LENGTH {
        errors.push(format!(
            "Content is too short (minimum {MIN_CONTENT_LENGTH} characters required)"
        ));
    }
    if length > MAX_CONTENT_LENGTH {
        errors.push("Content is too long (maximum 100,000 characters)".to_string());
    }

    let sanitized = sanitize_html(Some(trimmed));
    if length > 100 && sanitized.chars().count() * 2 < length {
        errors.push("Content contains potentially unsafe HTML that was removed".to_string());
    }

    ContentValidation {
        is_valid: errors.is_empty(),
        sanitized,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_removes_script_blocks() {
        let html = "<p>Before</p><SCRIPT type=\"text/javascript\">\nalert('x');\n</script><p>After</p>";
        assert_eq!(sanitize_html(Some(html)), "<p>Before</p><p>After</p>");
    }

    #[test]
    fn test_removes_event_handlers() {
        let html = r#"<img src="a.jpg" onerror="alert(1)" alt="A"><a href="/" OnClick='go()'>x</a>"#;
        assert_eq!(
            sanitize_html(Some(html)),
            r#"<img src="a.jpg" alt="A"><a href="/">x</a>"#
        );
    }

    #[test]
    fn test_removes_dangerous_url_prefixes() {
        let html = r#"<a href="JavaScript:alert(1)">x</a><a href="data:text/html,<b>">y</a>"#;
        assert_eq!(
            sanitize_html(Some(html)),
            r#"<a href="alert(1)">x</a><a href=",<b>">y</a>"#
        );
    }

    #[test]
    fn test_removes_embedding_elements() {
        let html = concat!(
            "<p>a</p>",
            "<iframe src=\"https://evil.example\">fallback</iframe>",
            "<object data=\"x.swf\"><param name=\"q\"></object>",
            "<embed src=\"y.swf\"></embed>",
            "<p>b</p>"
        );
        assert_eq!(sanitize_html(Some(html)), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_keeps_safe_markup() {
        let html = r#"<h2 id="route">Route</h2><p class="lead">Take <a href="https://example.com">the bus</a>.</p>"#;
        assert_eq!(sanitize_html(Some(html)), html);
    }

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(sanitize_html(None), "");
        assert_eq!(sanitize_html(Some("")), "");
    }

    #[test]
    fn test_validate_content_absent() {
        let result = validate_and_sanitize_content(None);
        assert!(!result.is_valid);
        assert_eq!(result.sanitized, "");
        assert_eq!(result.errors, vec!["Content is empty or invalid".to_string()]);
    }

    #[test]
    fn test_validate_content_too_short() {
        let result = validate_and_sanitize_content(Some("  <p>x</p> "));
        assert!(!result.is_valid);
        assert_eq!(result.sanitized, "<p>x</p>");
        assert_eq!(
            result.errors,
            vec!["Content is too short (minimum 10 characters required)".to_string()]
        );
    }

    #[test]
    fn test_validate_content_too_long() {
        let content = format!("<p>{}</p>", "a".repeat(MAX_CONTENT_LENGTH));
        let result = validate_and_sanitize_content(Some(&content));
        assert!(result
            .errors
            .contains(&"Content is too long (maximum 100,000 characters)".to_string()));
    }

    #[test]
    fn test_validate_content_flags_mostly_unsafe() {
        let content = format!("<p>ok</p><script>{}</script>", "x".repeat(200));
        let result = validate_and_sanitize_content(Some(&content));
        assert!(!result.is_valid);
        assert_eq!(result.sanitized, "<p>ok</p>");
        assert_eq!(
            result.errors,
            vec!["Content contains potentially unsafe HTML that was removed".to_string()]
        );
    }

    #[test]
    fn test_validate_content_ok() {
        let result = validate_and_sanitize_content(Some("<p>Charyn Canyon is 154 km long.</p>"));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    proptest! {
        #[test]
        fn prop_no_script_survives(
            before in "[a-zA-Z0-9 ]{0,40}",
            body in "[a-zA-Z0-9 ();'=<>]{0,40}",
            after in "[a-zA-Z0-9 ]{0,40}",
        ) {
            let html = format!("<p>{before}</p><script>{body}</script><p>{after}</p>");
            let sanitized = sanitize_html(Some(&html)).to_lowercase();
            prop_assert!(!sanitized.contains("<script>"), "{}", sanitized);
        }

        #[test]
        fn prop_no_javascript_scheme_survives(prefix in "[a-z ]{0,10}", case_mask in any::<u16>()) {
            let scheme: String = "javascript:"
                .chars()
                .enumerate()
                .map(|(i, c)| if case_mask & (1 << i) != 0 { c.to_ascii_uppercase() } else { c })
                .collect();
            let html = format!("<a href=\"{prefix}{scheme}x()\">y</a>");
            prop_assert!(!sanitize_html(Some(&html)).to_lowercase().contains("javascript:"));
        }
    }
}
