//! Markdown converter - transforms editor HTML into stored Markdown
//!
//! The converter parses an HTML fragment through an [`HtmlParser`], walks the
//! resulting DOM depth-first in document order, and writes Markdown according
//! to the [`ConversionOptions`] it was built with.
//!
//! # Element Handlers
//!
//! - **Headings (h1-h6)**: ATX (`#` per level) or Setext underlines
//! - **Paragraphs and block containers**: separated by one blank line
//! - **Lists (ul/ol/li)**: `- item` / `1. item`, nested content indented to
//!   the marker width
//! - **Code (pre/code)**: fenced or indented blocks, backtick spans
//! - **Emphasis (em/i, strong/b)**: `*text*`, `**text**`
//! - **Links and images**: `[text](url "title")`, `![alt](src "title")`
//! - **Line breaks (br)**: a literal newline
//! - **Blockquotes and rules**: `> ` prefixes, `* * *`
//!
//! Script-like and metadata elements are dropped with their children.
//!
//! # Failure Policy
//!
//! [`MarkdownConverter::convert`] never panics and never returns an error.
//! When the parser or the traversal fails, the result is
//! [`Conversion::FailedOpen`]: the Markdown is empty, the diagnostic is kept
//! on the value, and an error is logged. Callers are expected to run the
//! output through [`crate::validator::validate_conversion`], which flags an
//! empty conversion of non-empty input.
//!
//! # Example
//!
//! Input HTML:
//! ```html
//! <h1>Charyn Canyon</h1><p>Known as the <em>Valley of Castles</em>.</p>
//! <ul><li>Hiking</li><li>Camping</li></ul>
//! ```
//!
//! Output Markdown:
//! ```markdown
//! # Charyn Canyon
//!
//! Known as the *Valley of Castles*.
//!
//! - Hiking
//! - Camping
//! ```

use markup5ever_rcdom::{Handle, NodeData};

use crate::error::ConversionError;
use crate::options::{CodeBlockStyle, ConversionOptions, HeadingStyle, MAX_SUPPORTED_DEPTH};
use crate::parser::{Html5everParser, HtmlParser};
use crate::security::{SanitizeAction, SecurityValidator};

/// Largest ordinal a Markdown ordered list marker can carry (nine digits)
const MAX_LIST_ORDINAL: i64 = 999_999_999;

/// Elements that never carry article content
const NON_CONTENT_ELEMENTS: &[&str] = &["head", "title", "meta", "template"];

/// Elements rendered as blank-line separated blocks
const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "header",
    "footer",
    "main",
    "aside",
    "nav",
    "figure",
    "figcaption",
    "address",
    "details",
    "summary",
    "dl",
    "dt",
    "dd",
    "table",
    "caption",
    "thead",
    "tbody",
    "tfoot",
    "tr",
    "th",
    "td",
    "form",
    "fieldset",
];

/// Outcome of a conversion
///
/// A failed conversion is not an error for the caller: it carries empty
/// Markdown plus the diagnostic explaining why.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// Conversion succeeded (possibly to an empty string for empty input)
    Converted(String),
    /// Conversion failed internally and degraded to empty output
    FailedOpen {
        /// Why the conversion failed
        diagnostic: ConversionError,
    },
}

impl Conversion {
    /// Markdown text; empty when the conversion failed open
    pub fn markdown(&self) -> &str {
        match self {
            Conversion::Converted(markdown) => markdown,
            Conversion::FailedOpen { .. } => "",
        }
    }

    /// Consume the outcome and return the Markdown text
    pub fn into_markdown(self) -> String {
        match self {
            Conversion::Converted(markdown) => markdown,
            Conversion::FailedOpen { .. } => String::new(),
        }
    }

    pub fn is_failed_open(&self) -> bool {
        matches!(self, Conversion::FailedOpen { .. })
    }

    pub fn diagnostic(&self) -> Option<&ConversionError> {
        match self {
            Conversion::Converted(_) => None,
            Conversion::FailedOpen { diagnostic } => Some(diagnostic),
        }
    }
}

/// Per-conversion traversal state
#[derive(Debug, Default)]
struct ConversionContext {
    /// Number of DOM nodes visited
    node_count: u32,
    /// Current list nesting
    list_depth: usize,
}

/// HTML to Markdown converter
///
/// Holds only immutable configuration, so one instance can be shared by
/// reference between threads.
///
/// ```rust
/// use cms_markdown_converter::converter::MarkdownConverter;
///
/// let converter = MarkdownConverter::new();
/// let conversion = converter.convert(Some("<h1>Big Almaty Lake</h1><p>2,511 m above sea level.</p>"));
/// assert_eq!(conversion.markdown(), "# Big Almaty Lake\n\n2,511 m above sea level.");
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownConverter<P = Html5everParser> {
    options: ConversionOptions,
    parser: P,
    security_validator: SecurityValidator,
}

impl MarkdownConverter {
    /// Create a converter with the default style and the html5ever parser
    pub fn new() -> Self {
        Self::with_options(ConversionOptions::default())
    }

    /// Create a converter with a custom style and the html5ever parser
    pub fn with_options(options: ConversionOptions) -> Self {
        Self::with_parser(options, Html5everParser)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: HtmlParser> MarkdownConverter<P> {
    /// Create a converter with a custom style and parser
    pub fn with_parser(options: ConversionOptions, parser: P) -> Self {
        let security_validator =
            SecurityValidator::with_max_depth(options.max_depth.min(MAX_SUPPORTED_DEPTH));
        Self {
            options,
            parser,
            security_validator,
        }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert an HTML fragment to Markdown
    ///
    /// Absent, empty, and whitespace-only input converts to an empty string.
    /// Internal failures are logged and returned as [`Conversion::FailedOpen`].
    pub fn convert(&self, html: Option<&str>) -> Conversion {
        let Some(html) = html else {
            return Conversion::Converted(String::new());
        };

        let trimmed = html.trim();
        if trimmed.is_empty() {
            return Conversion::Converted(String::new());
        }

        match self.convert_document(trimmed) {
            Ok(markdown) => Conversion::Converted(markdown),
            Err(diagnostic) => {
                log::error!(
                    "[html-to-markdown] Conversion error (code {}): {}",
                    diagnostic.code(),
                    diagnostic
                );
                Conversion::FailedOpen { diagnostic }
            }
        }
    }

    fn convert_document(&self, html: &str) -> Result<String, ConversionError> {
        let dom = self.parser.parse(html)?;

        let mut ctx = ConversionContext::default();
        let mut output = String::with_capacity(html.len());
        self.traverse_node(&dom.document, &mut output, 0, &mut ctx)?;

        let markdown = normalize_output(&output);
        log::debug!(
            "converted {} DOM nodes ({} bytes of HTML) into {} bytes of Markdown",
            ctx.node_count,
            html.len(),
            markdown.len()
        );

        Ok(markdown)
    }

    /// Traverse a DOM node and convert it to Markdown
    fn traverse_node(
        &self,
        node: &Handle,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        ctx.node_count += 1;

        match node.data {
            NodeData::Document => {
                for child in node.children.borrow().iter() {
                    self.traverse_node(child, output, depth, ctx)?;
                }
            }
            NodeData::Element { ref name, .. } => {
                let tag_name = name.local.as_ref();
                self.handle_element(node, tag_name, output, depth, ctx)?;
            }
            NodeData::Text { ref contents } => {
                write_text(&contents.borrow(), output);
            }
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }

        Ok(())
    }

    fn traverse_children(
        &self,
        node: &Handle,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        for child in node.children.borrow().iter() {
            self.traverse_node(child, output, depth + 1, ctx)?;
        }
        Ok(())
    }

    /// Dispatch an element to its handler
    fn handle_element(
        &self,
        node: &Handle,
        tag_name: &str,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        if self.security_validator.check_element(tag_name) == SanitizeAction::Remove
            || NON_CONTENT_ELEMENTS.contains(&tag_name)
        {
            return Ok(());
        }

        self.security_validator
            .validate_depth(depth)
            .map_err(ConversionError::InvalidInput)?;

        match tag_name {
            "h1" => self.handle_heading(node, 1, output, depth, ctx)?,
            "h2" => self.handle_heading(node, 2, output, depth, ctx)?,
            "h3" => self.handle_heading(node, 3, output, depth, ctx)?,
            "h4" => self.handle_heading(node, 4, output, depth, ctx)?,
            "h5" => self.handle_heading(node, 5, output, depth, ctx)?,
            "h6" => self.handle_heading(node, 6, output, depth, ctx)?,

            "br" => output.push('\n'),
            "hr" => self.handle_horizontal_rule(output),

            "a" => self.handle_link(node, output, depth, ctx)?,
            "img" => self.handle_image(node, output),

            "ul" => self.handle_list(node, output, depth, false, ctx)?,
            "ol" => self.handle_list(node, output, depth, true, ctx)?,
            "li" => {
                ensure_newline(output);
                let marker = format!("{} ", self.options.bullet_list_marker);
                self.write_list_item(node, &marker, output, depth, ctx)?;
            }

            "blockquote" => self.handle_blockquote(node, output, depth, ctx)?,

            "pre" => self.handle_code_block(node, output),
            "code" => handle_inline_code(node, output),

            "strong" | "b" => {
                self.handle_emphasis(node, &self.options.strong_delimiter, output, depth, ctx)?
            }
            "em" | "i" => {
                self.handle_emphasis(node, &self.options.em_delimiter, output, depth, ctx)?
            }

            _ if BLOCK_ELEMENTS.contains(&tag_name) => {
                self.handle_block(node, output, depth, ctx)?
            }

            // html, body, span and unknown inline elements are transparent
            _ => self.traverse_children(node, output, depth, ctx)?,
        }

        Ok(())
    }

    /// Handle heading elements (h1-h6)
    ///
    /// Heading text is collapsed onto one line. Empty headings are dropped.
    fn handle_heading(
        &self,
        node: &Handle,
        level: usize,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth, ctx)?;
        let text = normalize_text(&content);
        if text.is_empty() {
            return Ok(());
        }

        ensure_blank_line(output);
        match (self.options.heading_style, level) {
            (HeadingStyle::Setext, 1 | 2) => {
                let underline = if level == 1 { '=' } else { '-' };
                output.push_str(&text);
                output.push('\n');
                output.extend(std::iter::repeat_n(underline, text.chars().count()));
            }
            _ => {
                output.extend(std::iter::repeat_n('#', level));
                output.push(' ');
                output.push_str(&text);
            }
        }
        output.push_str("\n\n");

        Ok(())
    }

    /// Handle paragraphs and other block containers
    fn handle_block(
        &self,
        node: &Handle,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        ensure_blank_line(output);

        let start_len = output.len();
        self.traverse_children(node, output, depth, ctx)?;

        if output.len() > start_len {
            ensure_blank_line(output);
        }

        Ok(())
    }

    fn handle_horizontal_rule(&self, output: &mut String) {
        ensure_blank_line(output);
        output.push_str(&self.options.horizontal_rule);
        output.push_str("\n\n");
    }

    /// Handle anchor (link) elements
    ///
    /// Links without an href, or whose href uses a blocked scheme, are
    /// written as their text. Links with no text are dropped.
    fn handle_link(
        &self,
        node: &Handle,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth, ctx)?;

        let href = attribute(node, "href").filter(|href| !href.trim().is_empty());
        let url = match href.as_deref() {
            Some(href) => self.safe_url(href),
            None => None,
        };

        let Some(url) = url else {
            write_flanked(output, &content, |text| text.to_string());
            return Ok(());
        };

        let text = normalize_text(&content);
        if text.is_empty() {
            return Ok(());
        }

        let title = attribute(node, "title")
            .filter(|title| !title.trim().is_empty())
            .map(|title| link_title(&title))
            .unwrap_or_default();

        let destination = escape_link_destination(url);
        write_flanked(output, &content, |_| format!("[{text}]({destination}{title})"));
        Ok(())
    }

    /// Handle image elements
    ///
    /// Written as `![alt](src "title")`; the title segment is omitted when the
    /// element has no non-empty title. Images without a usable src are dropped.
    fn handle_image(&self, node: &Handle, output: &mut String) {
        let Some(src) = attribute(node, "src").filter(|src| !src.trim().is_empty()) else {
            return;
        };
        let Some(src) = self.safe_url(&src) else {
            return;
        };

        let alt = attribute(node, "alt")
            .map(|alt| escape_image_alt(&normalize_text(&alt)))
            .unwrap_or_default();

        output.push_str("![");
        output.push_str(&alt);
        output.push_str("](");
        output.push_str(&escape_link_destination(src));
        if let Some(title) = attribute(node, "title").filter(|title| !title.trim().is_empty()) {
            output.push_str(&link_title(&title));
        }
        output.push(')');
    }

    /// Handle list elements (ul/ol)
    ///
    /// Top-level lists are surrounded by blank lines; nested lists start on
    /// the line after their parent item's text.
    fn handle_list(
        &self,
        node: &Handle,
        output: &mut String,
        depth: usize,
        ordered: bool,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        if ctx.list_depth > 0 {
            ensure_newline(output);
        } else {
            ensure_blank_line(output);
        }

        let start = if ordered {
            attribute(node, "start")
                .and_then(|start| start.trim().parse::<i64>().ok())
                .map_or(1, |start| start.clamp(0, MAX_LIST_ORDINAL))
        } else {
            1
        };

        ctx.list_depth += 1;
        let result = self.write_list_items(node, output, depth, ordered, start, ctx);
        ctx.list_depth -= 1;
        result?;

        ensure_newline(output);
        if ctx.list_depth == 0 {
            output.push('\n');
        }

        Ok(())
    }

    fn write_list_items(
        &self,
        node: &Handle,
        output: &mut String,
        depth: usize,
        ordered: bool,
        start: i64,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        let mut ordinal = start;
        let mut marker_width = 2;

        for child in node.children.borrow().iter() {
            let NodeData::Element { ref name, .. } = child.data else {
                continue;
            };

            if name.local.as_ref() == "li" {
                let marker = if ordered {
                    format!("{ordinal}. ")
                } else {
                    format!("{} ", self.options.bullet_list_marker)
                };
                marker_width = marker.len();
                self.write_list_item(child, &marker, output, depth + 1, ctx)?;
                ordinal = ordinal.saturating_add(1).min(MAX_LIST_ORDINAL);
            } else {
                // Stray content directly inside the list continues the previous item
                let mut content = String::new();
                self.traverse_node(child, &mut content, depth + 1, ctx)?;
                let indent = " ".repeat(marker_width);
                write_indented(output, content.trim(), &indent, &indent);
                ensure_newline(output);
            }
        }

        Ok(())
    }

    /// Write one list item, indenting continuation lines to the marker width
    fn write_list_item(
        &self,
        node: &Handle,
        marker: &str,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth, ctx)?;

        let indent = " ".repeat(marker.len());
        write_indented(output, content.trim(), marker, &indent);
        output.push('\n');

        Ok(())
    }

    fn handle_blockquote(
        &self,
        node: &Handle,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth, ctx)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }

        ensure_blank_line(output);
        for (i, line) in content.lines().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            if line.is_empty() {
                output.push('>');
            } else {
                output.push_str("> ");
                output.push_str(line);
            }
        }
        output.push_str("\n\n");

        Ok(())
    }

    /// Handle code block elements (pre)
    ///
    /// Code content is copied verbatim. The language comes from a
    /// `language-*` or `lang-*` class on the inner `<code>` element.
    fn handle_code_block(&self, node: &Handle, output: &mut String) {
        let language = detect_code_language(node);

        let mut code = String::new();
        extract_code_content(node, &mut code);
        let code = code.strip_suffix('\n').unwrap_or(&code);

        match self.options.code_block_style {
            CodeBlockStyle::Fenced => {
                ensure_blank_line(output);
                let fence = self.fence_for(code);
                output.push_str(&fence);
                output.push_str(&language);
                output.push('\n');
                output.push_str(code);
                if !code.is_empty() {
                    output.push('\n');
                }
                output.push_str(&fence);
                output.push_str("\n\n");
            }
            CodeBlockStyle::Indented => {
                if code.trim().is_empty() {
                    return;
                }
                ensure_blank_line(output);
                write_indented(output, code, "    ", "    ");
                output.push_str("\n\n");
            }
        }
    }

    /// Fence long enough that no backtick (or tilde) run in the code closes it
    fn fence_for(&self, code: &str) -> String {
        let fence_char = self.options.fence.chars().next().unwrap_or('`');
        let length = self
            .options
            .fence
            .chars()
            .count()
            .max(longest_run(code, fence_char) + 1);
        std::iter::repeat_n(fence_char, length).collect()
    }

    /// Handle bold and italic elements
    ///
    /// Whitespace at the edges of the element is moved outside the
    /// delimiters; empty elements produce no delimiters.
    fn handle_emphasis(
        &self,
        node: &Handle,
        delimiter: &str,
        output: &mut String,
        depth: usize,
        ctx: &mut ConversionContext,
    ) -> Result<(), ConversionError> {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth, ctx)?;
        write_flanked(output, &content, |inner| {
            format!("{delimiter}{inner}{delimiter}")
        });
        Ok(())
    }

    fn safe_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let url = url.trim();
        if self.options.strip_dangerous_urls {
            self.security_validator.sanitize_url(url)
        } else {
            Some(url)
        }
    }
}

/// Convert HTML to Markdown with the default style
///
/// Returns an empty string for absent input and when conversion fails open.
///
/// ```rust
/// use cms_markdown_converter::html_to_markdown;
///
/// assert_eq!(html_to_markdown(Some("<p>hello world</p>")), "hello world");
/// assert_eq!(html_to_markdown(None), "");
/// ```
pub fn html_to_markdown(html: Option<&str>) -> String {
    MarkdownConverter::new().convert(html).into_markdown()
}

/// Write a text node, collapsing whitespace and escaping Markdown syntax
fn write_text(raw: &str, output: &mut String) {
    let normalized = normalize_text(raw);
    let at_line_start = output.is_empty() || output.ends_with('\n');

    if normalized.is_empty() {
        // Whitespace between inline elements still separates words
        if !raw.is_empty() && needs_space(output) {
            output.push(' ');
        }
        return;
    }

    if raw.starts_with(char::is_whitespace) && !output.ends_with([' ', '\n']) {
        output.push(' ');
    }
    output.push_str(&escape_markdown(&normalized, at_line_start));
    if raw.ends_with(char::is_whitespace) {
        output.push(' ');
    }
}

/// Write rendered inline content, keeping its edge whitespace outside the markup
fn write_flanked(output: &mut String, content: &str, render: impl FnOnce(&str) -> String) {
    let inner = content.trim();
    if inner.is_empty() {
        if !content.is_empty() && needs_space(output) {
            output.push(' ');
        }
        return;
    }

    if content.starts_with(char::is_whitespace) && needs_space(output) {
        output.push(' ');
    }
    output.push_str(&render(inner));
    if content.ends_with(char::is_whitespace) {
        output.push(' ');
    }
}

fn needs_space(output: &str) -> bool {
    !output.is_empty() && !output.ends_with([' ', '\n'])
}

fn ensure_newline(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

fn ensure_blank_line(output: &mut String) {
    if !output.is_empty() && !output.ends_with("\n\n") {
        if output.ends_with('\n') {
            output.push('\n');
        } else {
            output.push_str("\n\n");
        }
    }
}

/// Write `content` with `first` before its first line and `rest` before
/// every following non-empty line
fn write_indented(output: &mut String, content: &str, first: &str, rest: &str) {
    for (i, line) in content.lines().enumerate() {
        if i == 0 {
            output.push_str(first);
        } else {
            output.push('\n');
            if !line.is_empty() {
                output.push_str(rest);
            }
        }
        output.push_str(line);
    }
}

/// Handle inline code elements
///
/// Content containing backticks is wrapped in a longer delimiter, padded
/// with spaces when it starts or ends with a backtick.
fn handle_inline_code(node: &Handle, output: &mut String) {
    let mut code = String::new();
    extract_code_content(node, &mut code);
    let code = code.replace('\n', " ");
    if code.is_empty() {
        return;
    }

    let delimiter = "`".repeat(longest_run(&code, '`') + 1);
    let padding = if code.starts_with('`') || code.ends_with('`') {
        " "
    } else {
        ""
    };

    output.push_str(&delimiter);
    output.push_str(padding);
    output.push_str(&code);
    output.push_str(padding);
    output.push_str(&delimiter);
}

fn detect_code_language(node: &Handle) -> String {
    for child in node.children.borrow().iter() {
        let is_code = matches!(
            child.data,
            NodeData::Element { ref name, .. } if name.local.as_ref() == "code"
        );
        if !is_code {
            continue;
        }
        if let Some(class_value) = attribute(child, "class") {
            for class in class_value.split_whitespace() {
                if let Some(lang) = class
                    .strip_prefix("language-")
                    .or_else(|| class.strip_prefix("lang-"))
                {
                    return lang.to_string();
                }
            }
        }
    }
    String::new()
}

/// Extract code content from a node without any normalization
///
/// Walks with an explicit stack: markup inside `<pre>` is not depth-checked.
fn extract_code_content(node: &Handle, output: &mut String) {
    let mut pending = vec![node.clone()];
    while let Some(node) = pending.pop() {
        match node.data {
            NodeData::Text { ref contents } => output.push_str(&contents.borrow()),
            NodeData::Element { ref name, .. } => {
                if name.local.as_ref() == "br" {
                    output.push('\n');
                }
                pending.extend(node.children.borrow().iter().rev().cloned());
            }
            _ => {}
        }
    }
}

fn attribute(node: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = node.data {
        attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string())
    } else {
        None
    }
}

/// Collapse runs of whitespace to single spaces and trim
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn longest_run(text: &str, target: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == target {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn escape_link_destination(url: &str) -> String {
    url.replace('(', "\\(").replace(')', "\\)")
}

/// ` "title"` segment shared by links and images
fn link_title(title: &str) -> String {
    format!(" \"{}\"", title.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_image_alt(alt: &str) -> String {
    let mut escaped = String::with_capacity(alt.len());
    for ch in alt.chars() {
        if matches!(ch, '\\' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Backslash-escape characters that would otherwise be read as Markdown
///
/// Inline syntax (`\ * _ ` [ ]`) is escaped everywhere. Block syntax is only
/// escaped when the text begins a line: ATX heading markers, `-`/`+` bullets,
/// `>` quotes, `=` underlines, `~~~` fences and `1.` ordinals.
fn escape_markdown(text: &str, at_line_start: bool) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    if !at_line_start {
        return escaped;
    }

    if escaped.starts_with(['-', '>', '='])
        || escaped.starts_with("+ ")
        || escaped.starts_with("~~~")
        || is_atx_heading(&escaped)
    {
        escaped.insert(0, '\\');
    } else {
        let digits = escaped.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 && escaped[digits..].starts_with(". ") {
            escaped.insert(digits, '\\');
        }
    }

    escaped
}

/// True for `#`..`######` followed by whitespace or end of line
fn is_atx_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    (1..=6).contains(&hashes)
        && line[hashes..]
            .chars()
            .next()
            .is_none_or(|c| c == ' ' || c == '\t')
}

/// Opening/closing fence on this line: fence character and run length
///
/// A backtick run followed by more backticks on the same line is an inline
/// code span, not a fence.
fn fence_run(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let fence_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = trimmed.chars().take_while(|&c| c == fence_char).count();
    if fence_char == '`' && trimmed[length..].contains('`') {
        return None;
    }
    (length >= 3).then_some((fence_char, length))
}

fn update_fence(fence: Option<(char, usize)>, line: &str) -> Option<(char, usize)> {
    match (fence, fence_run(line)) {
        (None, Some(opening)) => Some(opening),
        (Some((open_char, open_len)), Some((close_char, close_len)))
            if open_char == close_char
                && close_len >= open_len
                && line.trim().trim_start_matches(close_char).is_empty() =>
        {
            None
        }
        (state, _) => state,
    }
}

/// Normalize final output
///
/// 1. Strip trailing whitespace from every line
/// 2. Collapse runs of blank lines to a single blank line
/// 3. Put exactly one blank line before and after every ATX heading
///    (outside fenced code)
/// 4. Trim the document
fn normalize_output(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut previous_heading = false;

    for line in raw.lines() {
        let line = line.trim_end();

        if line.is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push("");
            }
            previous_heading = false;
            continue;
        }

        let heading = fence.is_none() && is_atx_heading(line);
        if (heading || previous_heading) && lines.last().is_some_and(|last| !last.is_empty()) {
            lines.push("");
        }

        fence = update_fence(fence, line);
        previous_heading = heading;
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}
