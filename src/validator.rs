//! Conversion and Markdown validation
//!
//! The converter fails open, so a caller cannot tell from the Markdown alone
//! whether content was lost. [`validate_conversion`] compares the word count
//! of the source HTML with the word count of the produced Markdown and turns
//! the ratio into a review signal.
//!
//! The comparison is deliberately rough: tags are stripped from the HTML,
//! Markdown syntax characters are stripped from the output, and only the
//! number of remaining words is compared. Reordered or garbled text with the
//! same word count scores as fully preserved.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::converter::Conversion;

/// Below this similarity a "low content preservation" warning is emitted
pub const LOW_PRESERVATION_THRESHOLD: f64 = 0.7;

/// A report is only valid when similarity is strictly above this value
pub const MIN_VALID_SIMILARITY: f64 = 0.5;

/// Minimum trimmed length of stored Markdown, in characters
pub const MIN_MARKDOWN_LENGTH: usize = 10;

/// Maximum trimmed length of stored Markdown, in characters
pub const MAX_MARKDOWN_LENGTH: usize = 100_000;

/// Confidence signal for one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    /// Fraction of the original word count found in the output, `0.0..=1.0`
    pub similarity: f64,
}

impl ConversionReport {
    /// Validate a [`Conversion`] outcome against its source HTML
    ///
    /// A conversion that failed open is never valid; its diagnostic is
    /// appended to the warnings.
    pub fn from_conversion(original_html: &str, conversion: &Conversion) -> Self {
        let mut report = validate_conversion(original_html, conversion.markdown());
        if let Some(diagnostic) = conversion.diagnostic() {
            report.warnings.push(format!("Conversion failed: {diagnostic}"));
            report.is_valid = false;
        }
        report
    }

    /// Similarity as a rounded percentage
    pub fn similarity_percent(&self) -> u32 {
        (self.similarity * 100.0).round() as u32
    }
}

/// Estimate how much of the original content survived conversion
///
/// ```rust
/// use cms_markdown_converter::validator::validate_conversion;
///
/// let report = validate_conversion(
///     "<h1>Title</h1><p>One two three four five.</p>",
///     "# Title\n\nOne two three four five.",
/// );
/// assert!(report.is_valid);
/// assert_eq!(report.similarity, 1.0);
/// ```
pub fn validate_conversion(original_html: &str, converted_markdown: &str) -> ConversionReport {
    let original_words = count_words(&strip_html_tags(original_html));
    let converted_words = count_words(&strip_markdown_syntax(converted_markdown));

    let similarity = if original_words > 0 {
        (converted_words as f64 / original_words as f64).min(1.0)
    } else {
        0.0
    };

    let mut warnings = Vec::new();

    if similarity < LOW_PRESERVATION_THRESHOLD {
        warnings.push(format!(
            "Low content preservation ({}%). Some content may be lost.",
            (similarity * 100.0).round() as u32
        ));
    }

    if converted_markdown.is_empty() && !original_html.is_empty() {
        warnings.push("Conversion resulted in empty Markdown".to_string());
    }

    ConversionReport {
        is_valid: warnings.is_empty() && similarity > MIN_VALID_SIMILARITY,
        warnings,
        similarity,
    }
}

/// Result of checking Markdown before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check that Markdown is present and within the stored length limits
pub fn validate_markdown(markdown: Option<&str>) -> MarkdownValidation {
    let Some(markdown) = markdown.filter(|markdown| !markdown.is_empty()) else {
        return MarkdownValidation {
            is_valid: false,
            errors: vec!["Markdown content is empty or invalid".to_string()],
        };
    };

    let mut errors = Vec::new();
    let length = markdown.trim().chars().count();

    if length < MIN_MARKDOWN_LENGTH {
        errors.push(format!(
            "Markdown content is too short (minimum {MIN_MARKDOWN_LENGTH} characters)"
        ));
    }
    if length > MAX_MARKDOWN_LENGTH {
        errors.push("Markdown content is too long (maximum 100,000 characters)".to_string());
    }

    MarkdownValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Approximate the visible text of HTML by removing tags
fn strip_html_tags(html: &str) -> String {
    static TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    match TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").ok()) {
        Some(regex) => regex.replace_all(html, "").into_owned(),
        None => html.to_string(),
    }
}

/// Approximate the visible text of Markdown by removing syntax characters
fn strip_markdown_syntax(markdown: &str) -> String {
    markdown
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`' | '[' | ']' | '(' | ')'))
        .collect()
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
