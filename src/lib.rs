//! CMS Markdown Converter - content pipeline core
//!
//! This library converts editor and legacy HTML into the Markdown stored in
//! the site's document store, and reports whether each conversion can be
//! trusted without manual review.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `parser`: HTML5 parsing using html5ever, behind the `HtmlParser` trait
//! - `converter`: Markdown generation from the DOM tree (fail-open)
//! - `options`: Markdown style configuration, loadable from TOML
//! - `security`: element and URL filtering during conversion
//! - `validator`: conversion confidence report and Markdown checks
//! - `format`: Markdown/HTML content detection
//! - `render`: Markdown to sanitized HTML for display
//! - `sanitize`: string-level HTML sanitization
//! - `audit`: content-quality audit of article records
//!
//! # Conversion
//!
//! Conversion never returns an error to the caller. Internal failures
//! produce an empty string, which [`validate_conversion`] then flags:
//!
//! ```rust
//! use cms_markdown_converter::{html_to_markdown, validate_conversion};
//!
//! let html = "<h1>Title</h1><p>One two three four five.</p>";
//! let markdown = html_to_markdown(Some(html));
//! assert_eq!(markdown, "# Title\n\nOne two three four five.");
//!
//! let report = validate_conversion(html, &markdown);
//! assert!(report.is_valid);
//! ```

// Module declarations
pub mod audit;
pub mod converter;
pub mod error;
pub mod format;
pub mod options;
pub mod parser;
pub mod render;
pub mod sanitize;
pub mod security;
pub mod validator;

// Re-export main types for convenience
pub use converter::{html_to_markdown, Conversion, MarkdownConverter};
pub use error::ConversionError;
pub use format::{detect_content_format, ContentFormat, FormatHint};
pub use options::ConversionOptions;
pub use parser::{parse_html, Html5everParser, HtmlParser};
pub use render::{markdown_to_html, process_content};
pub use sanitize::sanitize_html;
pub use validator::{validate_conversion, ConversionReport};
