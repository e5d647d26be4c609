//! Content-format detection
//!
//! Stored article bodies may hold Markdown (new content) or HTML (legacy
//! content). [`detect_content_format`] guesses which one a field contains so
//! the render path can pick the right treatment.
//!
//! HTML tags are the stronger signal and are checked first. Text without
//! tags or Markdown syntax is reported as [`ContentFormat::Html`] so legacy
//! plain-text fields keep rendering through the HTML path.

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Detected format of a content field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Markdown,
    Html,
    /// Absent or whitespace-only content
    Plain,
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentFormat::Markdown => "markdown",
            ContentFormat::Html => "html",
            ContentFormat::Plain => "plain",
        };
        f.write_str(name)
    }
}

/// Caller-supplied hint for [`crate::render::process_content`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    Markdown,
    Html,
    /// Detect the format from the content
    #[default]
    Auto,
}

/// Markdown constructs that mark content as Markdown
const MARKDOWN_PATTERNS: &[&str] = &[
    r"(?m)^#{1,6}\s+",       // headings
    r"(?m)^\*\s+",           // unordered lists
    r"(?m)^\d+\.\s+",        // ordered lists
    r"\[.*?\]\(.*?\)",       // links
    r"!\[.*?\]\(.*?\)",      // images
    r"(?m)^\s*>",            // blockquotes
    r"`[^`]+`",              // inline code
    r"(?s)```.*?```",        // fenced code
    r"(?m)^\s*[-*+]\s+",     // list items
    r"\*\*.*?\*\*",          // bold
    r"\*.*?\*",              // italic
    r"__.*?__",              // bold (underscores)
    r"_.*?_",                // italic (underscores)
];

/// Guess whether content is Markdown, HTML, or empty
///
/// ```rust
/// use cms_markdown_converter::format::{detect_content_format, ContentFormat};
///
/// assert_eq!(detect_content_format(Some("# Kolsai Lakes")), ContentFormat::Markdown);
/// assert_eq!(detect_content_format(Some("<p>Kolsai Lakes</p>")), ContentFormat::Html);
/// assert_eq!(detect_content_format(Some("   ")), ContentFormat::Plain);
/// ```
pub fn detect_content_format(content: Option<&str>) -> ContentFormat {
    let Some(content) = content.map(str::trim).filter(|c| !c.is_empty()) else {
        return ContentFormat::Plain;
    };

    if contains_html_tag(content) {
        return ContentFormat::Html;
    }

    if contains_markdown_syntax(content) {
        return ContentFormat::Markdown;
    }

    ContentFormat::Html
}

fn contains_html_tag(content: &str) -> bool {
    static HTML_TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    HTML_TAG_REGEX
        .get_or_init(|| Regex::new(r"(?is)<[a-z].*>").ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(content))
}

fn contains_markdown_syntax(content: &str) -> bool {
    static MARKDOWN_SET: OnceLock<Option<RegexSet>> = OnceLock::new();
    MARKDOWN_SET
        .get_or_init(|| RegexSet::new(MARKDOWN_PATTERNS).ok())
        .as_ref()
        .is_some_and(|set| set.is_match(content))
}
