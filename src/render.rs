//! Markdown to HTML rendering for display
//!
//! Stored Markdown is rendered with pulldown-cmark using the GitHub-flavoured
//! extensions the site relies on (tables, strikethrough, task lists). Single
//! newlines inside a paragraph become `<br />`, and every heading gets a
//! slug `id` so sections can be linked to. The rendered HTML is passed
//! through [`sanitize_html`] before it is returned.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

use crate::format::{detect_content_format, ContentFormat, FormatHint};
use crate::sanitize::sanitize_html;

/// Render Markdown to sanitized HTML
///
/// ```rust
/// use cms_markdown_converter::render::markdown_to_html;
///
/// let html = markdown_to_html(Some("# Kolsai Lakes\n\nThree lakes.\nOne trail."));
/// assert_eq!(
///     html,
///     "<h1 id=\"kolsai-lakes\">Kolsai Lakes</h1>\n<p>Three lakes.<br />\nOne trail.</p>"
/// );
/// ```
pub fn markdown_to_html(markdown: Option<&str>) -> String {
    let Some(markdown) = markdown.map(str::trim).filter(|m| !m.is_empty()) else {
        return String::new();
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options)
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        })
        .collect();
    assign_heading_ids(&mut events);

    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, events.into_iter());

    log::debug!(
        "rendered {} bytes of Markdown into {} bytes of HTML",
        markdown.len(),
        html_output.len()
    );

    sanitize_html(Some(html_output.trim()))
}

/// Render a content field for display
///
/// `content` is preferred; `fallback` (typically the legacy HTML field) is
/// used when `content` is absent or empty. Primary content is treated as
/// Markdown unless the hint says HTML; fallback content is treated as
/// Markdown only when the hint or detection says so. Everything else is
/// sanitized as HTML.
///
/// ```rust
/// use cms_markdown_converter::format::FormatHint;
/// use cms_markdown_converter::render::process_content;
///
/// let html = process_content(None, FormatHint::Auto, Some("<p>Legacy body</p>"));
/// assert_eq!(html, "<p>Legacy body</p>");
/// ```
pub fn process_content(content: Option<&str>, hint: FormatHint, fallback: Option<&str>) -> String {
    let content = content.filter(|content| !content.is_empty());
    let Some(primary) = content.or(fallback.filter(|fallback| !fallback.is_empty())) else {
        return String::new();
    };

    let trimmed = primary.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let detected = match hint {
        FormatHint::Auto => detect_content_format(Some(trimmed)),
        FormatHint::Markdown => ContentFormat::Markdown,
        FormatHint::Html => ContentFormat::Html,
    };
    let primary_is_markdown = content.is_some() && hint != FormatHint::Html;

    if detected == ContentFormat::Markdown || primary_is_markdown {
        markdown_to_html(Some(trimmed))
    } else {
        sanitize_html(Some(trimmed))
    }
}

/// Give every heading without an explicit id a unique slug id
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut slugger = Slugger::default();

    for i in 0..events.len() {
        let explicit_id = match &events[i] {
            Event::Start(Tag::Heading { id, .. }) => id.clone(),
            _ => continue,
        };
        if let Some(id) = explicit_id {
            slugger.reserve(&id);
            continue;
        }

        let mut text = String::new();
        for event in &events[i + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        let slug = slugger.slug(&text);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

/// Generates unique heading slugs within one document
#[derive(Debug, Default)]
struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Slug for `text`; repeats get `-1`, `-2`, ... suffixes
    fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();

        if let Some(&count) = self.seen.get(&base) {
            let mut count = count;
            loop {
                count += 1;
                slug = format!("{base}-{count}");
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
            self.seen.insert(base, count);
        }

        self.seen.insert(slug.clone(), 0);
        slug
    }

    fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }
}

/// Lowercase, drop punctuation, turn whitespace into hyphens
fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|&c| !is_slug_punctuation(c))
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

fn is_slug_punctuation(c: char) -> bool {
    (c.is_ascii_punctuation() && c != '-' && c != '_')
        || ('\u{2000}'..='\u{206F}').contains(&c)
        || ('\u{2E00}'..='\u{2E7F}').contains(&c)
}
