//! HTML5 parser using html5ever
//!
//! The converter does not talk to html5ever directly. It goes through the
//! [`HtmlParser`] capability so that the Markdown rules stay independent of
//! the concrete parser and tests can substitute a parser that fails.
//!
//! html5ever implements the WHATWG parsing algorithm, so malformed editor
//! markup (unclosed tags, misnested inline elements, stray attributes) is
//! repaired the same way a browser would repair it rather than rejected.
//!
//! ```rust
//! use cms_markdown_converter::parser::{Html5everParser, HtmlParser};
//!
//! let parser = Html5everParser;
//! let dom = parser.parse("<p>Unclosed <b>bold").expect("html5ever repairs markup");
//! assert!(!dom.document.children.borrow().is_empty());
//! ```

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;

use crate::error::ConversionError;

/// Capability that turns an HTML fragment into a DOM tree
pub trait HtmlParser {
    /// Parse `html` into a reference-counted DOM.
    ///
    /// Implementations return [`ConversionError::ParseError`] or
    /// [`ConversionError::InvalidInput`] instead of panicking.
    fn parse(&self, html: &str) -> Result<RcDom, ConversionError>;
}

/// Default parser backed by html5ever
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5everParser;

impl HtmlParser for Html5everParser {
    fn parse(&self, html: &str) -> Result<RcDom, ConversionError> {
        parse_html(html)
    }
}

/// Parse an HTML string into a DOM tree
///
/// Fragments are accepted; html5ever wraps them in the implied
/// `html`/`head`/`body` elements.
///
/// # Errors
///
/// - `ConversionError::InvalidInput`: input is empty
pub fn parse_html(html: &str) -> Result<RcDom, ConversionError> {
    if html.is_empty() {
        return Err(ConversionError::InvalidInput(
            "HTML input is empty".to_string(),
        ));
    }

    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    Ok(dom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_html() {
        let result = parse_html("<h1>Hello</h1><p>World</p>");
        assert!(result.is_ok(), "Should parse simple HTML");
    }

    #[test]
    fn test_parse_malformed_html() {
        let result = parse_html("<html><body><h1>Hello");
        assert!(result.is_ok(), "Should handle malformed HTML gracefully");
    }

    #[test]
    fn test_parse_empty_input() {
        match parse_html("") {
            Err(ConversionError::InvalidInput(_)) => (),
            other => panic!("Expected InvalidInput error, got {:?}", other.as_ref().err()),
        }
    }

    #[test]
    fn test_parse_misnested_tags() {
        let result = parse_html("<b><i>text</b></i>");
        assert!(result.is_ok(), "Should handle misnested tags");
    }

    #[test]
    fn test_parse_with_comments() {
        let result = parse_html("<!-- editor note --><p>Text</p>");
        assert!(result.is_ok(), "Should parse HTML with comments");
    }

    #[test]
    fn test_trait_object_dispatch() {
        let parser: &dyn HtmlParser = &Html5everParser;
        assert!(parser.parse("<p>Almaty</p>").is_ok());
        assert!(parser.parse("").is_err());
    }

    proptest! {
        #[test]
        fn prop_unclosed_tags_handled(
            tag in prop::sample::select(vec!["div", "p", "span", "h1", "h2", "ul", "ol", "li", "blockquote"]),
            content in "[a-zA-Z0-9 ]{1,50}",
        ) {
            let html = format!("<{0}>{1}", tag, content);
            prop_assert!(parse_html(&html).is_ok(), "Parser should handle unclosed tags: {}", html);
        }

        #[test]
        fn prop_broken_attributes_handled(
            tag in prop::sample::select(vec!["div", "p", "a", "img"]),
            attr_name in "[a-z]{1,10}",
            attr_value in "[a-zA-Z0-9]{0,20}",
            broken in prop::bool::ANY,
        ) {
            let html = if broken {
                format!("<{} {}=\"{}>Content</{}>", tag, attr_name, attr_value, tag)
            } else {
                format!("<{} {}>Content</{}>", tag, attr_name, tag)
            };
            prop_assert!(parse_html(&html).is_ok(), "Parser should handle broken attributes: {}", html);
        }
    }
}
