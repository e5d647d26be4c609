//! Markdown style configuration
//!
//! Style choices (heading style, fence, bullet marker, emphasis delimiters)
//! are an explicit value handed to
//! [`MarkdownConverter::with_options`](crate::converter::MarkdownConverter::with_options),
//! so call sites with different needs never share mutable global state.
//!
//! The defaults match the content store's convention:
//!
//! | Setting            | Default   |
//! |--------------------|-----------|
//! | heading style      | ATX (`#`) |
//! | code blocks        | fenced    |
//! | bullet marker      | `-`       |
//! | emphasis / strong  | `*` / `**`|
//!
//! Options can be loaded from TOML; every field is optional:
//!
//! ```rust
//! use cms_markdown_converter::options::{ConversionOptions, HeadingStyle};
//!
//! let options = ConversionOptions::from_toml_str(r#"
//!     heading_style = "setext"
//!     bullet_list_marker = "*"
//! "#).expect("valid style file");
//! assert_eq!(options.heading_style, HeadingStyle::Setext);
//! assert_eq!(options.bullet_list_marker, '*');
//! assert_eq!(options.strong_delimiter, "**");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConversionError;

/// Deepest element nesting the recursive walk handles on a 2 MiB thread stack
pub const MAX_SUPPORTED_DEPTH: usize = 256;

/// Maximum allowed nesting depth for HTML elements
pub const DEFAULT_MAX_DEPTH: usize = MAX_SUPPORTED_DEPTH;

/// How headings are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// `# Heading`
    Atx,
    /// Underlined with `===` / `---` (h1 and h2 only; deeper levels stay ATX)
    Setext,
}

/// How `<pre>` blocks are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeBlockStyle {
    Fenced,
    Indented,
}

/// Conversion options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub heading_style: HeadingStyle,
    pub code_block_style: CodeBlockStyle,
    /// Minimum fence for fenced code blocks (```` ``` ```` or `~~~`)
    pub fence: String,
    pub bullet_list_marker: char,
    pub em_delimiter: String,
    pub strong_delimiter: String,
    /// Thematic break written for `<hr>`
    pub horizontal_rule: String,
    /// Drop `javascript:`, `data:` and similar URLs from links and images
    pub strip_dangerous_urls: bool,
    /// Maximum element nesting depth before conversion fails open; values
    /// above [`MAX_SUPPORTED_DEPTH`] are clamped
    pub max_depth: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            bullet_list_marker: '-',
            em_delimiter: "*".to_string(),
            strong_delimiter: "**".to_string(),
            horizontal_rule: "* * *".to_string(),
            strip_dangerous_urls: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConversionOptions {
    /// Parse options from a TOML document and validate them
    pub fn from_toml_str(source: &str) -> Result<Self, ConversionError> {
        let options: Self =
            toml::from_str(source).map_err(|e| ConversionError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Read and parse a TOML style file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            ConversionError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject delimiter combinations that would not produce valid Markdown
    pub fn validate(&self) -> Result<(), ConversionError> {
        if !matches!(self.bullet_list_marker, '-' | '+' | '*') {
            return Err(ConversionError::Config(format!(
                "bullet_list_marker must be one of '-', '+', '*', got '{}'",
                self.bullet_list_marker
            )));
        }
        if !matches!(self.em_delimiter.as_str(), "*" | "_") {
            return Err(ConversionError::Config(format!(
                "em_delimiter must be '*' or '_', got '{}'",
                self.em_delimiter
            )));
        }
        if !matches!(self.strong_delimiter.as_str(), "**" | "__") {
            return Err(ConversionError::Config(format!(
                "strong_delimiter must be '**' or '__', got '{}'",
                self.strong_delimiter
            )));
        }
        if !is_valid_fence(&self.fence) {
            return Err(ConversionError::Config(format!(
                "fence must be at least three backticks or tildes, got '{}'",
                self.fence
            )));
        }
        if self.horizontal_rule.trim().is_empty() {
            return Err(ConversionError::Config(
                "horizontal_rule must not be empty".to_string(),
            ));
        }
        if self.max_depth == 0 || self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConversionError::Config(format!(
                "max_depth must be between 1 and {MAX_SUPPORTED_DEPTH}, got {}",
                self.max_depth
            )));
        }
        Ok(())
    }
}

fn is_valid_fence(fence: &str) -> bool {
    let mut chars = fence.chars();
    match chars.next() {
        Some(first @ ('`' | '~')) => fence.len() >= 3 && chars.all(|c| c == first),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_store_convention() {
        let options = ConversionOptions::default();
        assert_eq!(options.heading_style, HeadingStyle::Atx);
        assert_eq!(options.code_block_style, CodeBlockStyle::Fenced);
        assert_eq!(options.bullet_list_marker, '-');
        assert_eq!(options.em_delimiter, "*");
        assert_eq!(options.strong_delimiter, "**");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let options = ConversionOptions::from_toml_str("").expect("empty style file");
        assert_eq!(options, ConversionOptions::default());
    }

    #[test]
    fn test_toml_overrides() {
        let options = ConversionOptions::from_toml_str(
            r#"
            code_block_style = "indented"
            em_delimiter = "_"
            max_depth = 64
            "#,
        )
        .expect("valid style file");

        assert_eq!(options.code_block_style, CodeBlockStyle::Indented);
        assert_eq!(options.em_delimiter, "_");
        assert_eq!(options.max_depth, 64);
        assert_eq!(options.fence, "```");
    }

    #[test]
    fn test_unknown_enum_value_is_config_error() {
        let result = ConversionOptions::from_toml_str(r#"heading_style = "underline""#);
        assert!(matches!(result, Err(ConversionError::Config(_))));
    }

    #[test]
    fn test_invalid_delimiters_rejected() {
        let cases = [
            r#"bullet_list_marker = "x""#,
            r#"em_delimiter = "~""#,
            r#"strong_delimiter = "*""#,
            r#"fence = "``""#,
            r#"fence = "`~`""#,
            r#"horizontal_rule = "  ""#,
            "max_depth = 0",
            "max_depth = 1000",
        ];
        for case in cases {
            let result = ConversionOptions::from_toml_str(case);
            assert!(
                matches!(result, Err(ConversionError::Config(_))),
                "expected config error for {case}"
            );
        }
    }

    #[test]
    fn test_tilde_fence_accepted() {
        let options = ConversionOptions::from_toml_str(r#"fence = "~~~~""#).expect("tilde fence");
        assert_eq!(options.fence, "~~~~");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = ConversionOptions::from_toml_file("/nonexistent/style.toml");
        match result {
            Err(ConversionError::Config(message)) => assert!(message.contains("cannot read")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
