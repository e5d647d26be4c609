//! Security validation tests
//!
//! Editor HTML is untrusted. This suite checks that executable content never
//! reaches the stored Markdown, and that HTML rendered back to the site is
//! sanitized.

use cms_markdown_converter::converter::MarkdownConverter;
use cms_markdown_converter::options::ConversionOptions;
use cms_markdown_converter::render::markdown_to_html;
use cms_markdown_converter::sanitize::sanitize_html;

fn convert(html: &str) -> String {
    let conversion = MarkdownConverter::new().convert(Some(html));
    assert!(!conversion.is_failed_open(), "conversion failed: {conversion:?}");
    conversion.into_markdown()
}

/// Test that script tags are completely removed from output
#[test]
fn test_xss_script_tag_removal() {
    let html = r#"<html><body>
        <p>Before dangerous element</p>
        <script>alert('xss')</script>
        <p>After dangerous element</p>
    </body></html>"#;

    let markdown = convert(html);

    // Script tag and its content should be completely removed
    assert!(!markdown.contains("<script"));
    assert!(!markdown.contains("alert"));
    assert!(!markdown.contains("xss"));

    assert_eq!(markdown, "Before dangerous element\n\nAfter dangerous element");
}

/// Test that inline script tags are removed
#[test]
fn test_xss_inline_script_removal() {
    let markdown = convert(r#"<p>Text <script>malicious()</script> more text</p>"#);

    assert!(!markdown.contains("script"));
    assert!(!markdown.contains("malicious"));
    assert_eq!(markdown, "Text more text");
}

/// Test that event handler attributes never reach the Markdown
#[test]
fn test_xss_event_handler_removal() {
    let html = r#"<html><body>
        <p onclick="alert('xss')">Click me</p>
        <div onload="malicious()">Content</div>
        <a href="test.html" onmouseover="attack()">Link</a>
    </body></html>"#;

    let markdown = convert(html);

    assert!(!markdown.contains("onclick"));
    assert!(!markdown.contains("onload"));
    assert!(!markdown.contains("onmouseover"));
    assert!(!markdown.contains("alert"));
    assert!(!markdown.contains("malicious"));
    assert!(!markdown.contains("attack"));

    assert!(markdown.contains("Click me"));
    assert!(markdown.contains("Content"));
    assert!(markdown.contains("[Link](test.html)"));
}

/// Test that javascript: URLs are blocked in links
#[test]
fn test_xss_javascript_url_in_link() {
    let markdown = convert(r#"<a href="javascript:alert('xss')">Click</a>"#);

    // Link degrades to its text
    assert_eq!(markdown, "Click");
}

/// Test that javascript: URLs are blocked regardless of case or padding
#[test]
fn test_xss_javascript_url_case_insensitive() {
    let test_cases = [
        r#"<a href="javascript:alert('xss')">Test1</a>"#,
        r#"<a href="JavaScript:alert('xss')">Test2</a>"#,
        r#"<a href="JAVASCRIPT:alert('xss')">Test3</a>"#,
        r#"<a href="  JaVaScRiPt:alert('xss')">Test4</a>"#,
    ];

    for html in test_cases {
        let markdown = convert(html);
        assert!(!markdown.to_lowercase().contains("javascript:"), "{html}");
        assert!(!markdown.contains("alert"), "{html}");
    }
}

/// Test that data: URLs are blocked in links and images
#[test]
fn test_xss_data_urls() {
    let markdown = convert(
        r#"<p><a href="data:text/html,<script>alert(1)</script>">Open</a>
        <img src="data:image/svg+xml;base64,PHN2Zz4=" alt="Logo"></p>"#,
    );

    assert!(!markdown.contains("data:"));
    assert!(!markdown.contains("Logo"));
    assert_eq!(markdown, "Open");
}

/// Test that javascript: URLs are blocked in images
#[test]
fn test_xss_javascript_url_in_image() {
    let markdown = convert(r#"<p>Photo: <img src="javascript:alert('xss')" alt="Lake"></p>"#);
    assert_eq!(markdown, "Photo:");
}

/// Test that safe URLs are preserved
#[test]
fn test_safe_urls_preserved() {
    let html = r##"<p>
        <a href="https://example.com/tours">Tours</a>
        <a href="/attractions/charyn">Charyn</a>
        <a href="#getting-there">Getting there</a>
        <a href="mailto:info@example.com">Mail</a>
        <img src="https://res.cloudinary.com/demo/lake.jpg" alt="Lake">
    </p>"##;

    let markdown = convert(html);

    assert!(markdown.contains("[Tours](https://example.com/tours)"));
    assert!(markdown.contains("[Charyn](/attractions/charyn)"));
    assert!(markdown.contains("[Getting there](#getting-there)"));
    assert!(markdown.contains("[Mail](mailto:info@example.com)"));
    assert!(markdown.contains("![Lake](https://res.cloudinary.com/demo/lake.jpg)"));
}

/// Test that dangerous URLs can be kept when stripping is disabled
#[test]
fn test_url_stripping_can_be_disabled() {
    let options = ConversionOptions {
        strip_dangerous_urls: false,
        ..Default::default()
    };
    let markdown = MarkdownConverter::with_options(options)
        .convert(Some(r#"<img src="data:image/png;base64,AAAA" alt="Dot">"#))
        .into_markdown();

    assert_eq!(markdown, "![Dot](data:image/png;base64,AAAA)");
}

/// Test that embedding elements are removed with their fallback content
#[test]
fn test_embedding_elements_removal() {
    let html = r#"<p>Before</p>
        <iframe src="https://www.youtube.com/embed/x">Your browser does not support iframes</iframe>
        <object data="movie.swf"><p>Flash fallback</p></object>
        <embed src="movie.swf">
        <p>After</p>"#;

    let markdown = convert(html);

    assert!(!markdown.contains("iframe"));
    assert!(!markdown.contains("browser"));
    assert!(!markdown.contains("Flash"));
    assert!(!markdown.contains("swf"));
    assert_eq!(markdown, "Before\n\nAfter");
}

/// Test that file:, vbscript: and about: URLs are blocked
#[test]
fn test_other_dangerous_schemes_blocked() {
    let cases = [
        (r#"<a href="file:///etc/passwd">Passwd</a>"#, "Passwd"),
        (r#"<a href="vbscript:msgbox('xss')">Click</a>"#, "Click"),
        (r#"<a href="about:blank">About</a>"#, "About"),
    ];

    for (html, expected) in cases {
        assert_eq!(convert(html), expected, "{html}");
    }
}

/// Entity declarations in a DOCTYPE are not processed by an HTML parser
#[test]
fn test_xxe_prevention_doctype() {
    let html = r#"<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
    <html><body><p>&xxe;</p></body></html>"#;

    let markdown = convert(html);

    assert!(!markdown.contains("/etc/passwd"));
    assert!(!markdown.contains("root:"));
}

/// Test that style, link and base tags are removed
#[test]
fn test_style_link_base_removal() {
    let html = r#"<html><head>
        <base href="https://evil.example/">
        <link rel="stylesheet" href="https://evil.example/x.css">
        </head><body>
        <style>body { background: url("javascript:alert(1)") }</style>
        <p>Visible</p>
    </body></html>"#;

    let markdown = convert(html);

    assert!(!markdown.contains("evil"));
    assert!(!markdown.contains("background"));
    assert_eq!(markdown, "Visible");
}

/// Test deeply nested HTML within the default limit
#[test]
fn test_deeply_nested_html() {
    let html = format!(
        "<html><body>{}<p>Deep content</p>{}</body></html>",
        "<div>".repeat(100),
        "</div>".repeat(100)
    );

    let markdown = convert(&html);
    assert_eq!(markdown, "Deep content");
}

/// Test that nesting past the configured limit fails open instead of
/// exhausting the stack
#[test]
fn test_nesting_limit_fails_open() {
    let options = ConversionOptions {
        max_depth: 50,
        ..Default::default()
    };
    let html = format!("{}too deep{}", "<span>".repeat(200), "</span>".repeat(200));

    let conversion = MarkdownConverter::with_options(options).convert(Some(&html));

    assert!(conversion.is_failed_open());
    assert_eq!(conversion.markdown(), "");
}

/// Test multiple XSS vectors in one document
#[test]
fn test_multiple_xss_vectors() {
    let html = r#"<html><body>
        <script>alert('xss1')</script>
        <p onclick="alert('xss2')">Click</p>
        <a href="javascript:alert('xss3')">Link</a>
        <img src="javascript:alert('xss4')" alt="Image">
        <iframe src="javascript:alert('xss5')"></iframe>
        <object data="javascript:alert('xss6')"></object>
        <embed src="javascript:alert('xss7')">
        <p>Safe content</p>
    </body></html>"#;

    let markdown = convert(html);

    for needle in [
        "script", "onclick", "javascript:", "iframe", "object", "embed", "alert", "xss",
    ] {
        assert!(!markdown.contains(needle), "found {needle} in {markdown}");
    }

    assert!(markdown.contains("Safe content"));
    assert!(markdown.contains("Click"));
}

/// Raw HTML embedded in stored Markdown is sanitized on the way out
#[test]
fn test_rendered_markdown_is_sanitized() {
    let markdown = "# Title\n\n<iframe src=\"https://evil.example\"></iframe>\n\n\
                    <a href=\"javascript:alert(1)\" onclick=\"steal()\">x</a>";

    let html = markdown_to_html(Some(markdown));

    assert!(html.contains("<h1 id=\"title\">Title</h1>"), "{html}");
    assert!(!html.contains("iframe"), "{html}");
    assert!(!html.contains("onclick"), "{html}");
    assert!(!html.to_lowercase().contains("javascript:"), "{html}");
}

/// Legacy HTML fields are sanitized before display
#[test]
fn test_legacy_html_sanitized() {
    let html = r#"<div onmouseover='track()'><p>Hello</p><embed src="x.swf"></embed></div>"#;
    assert_eq!(sanitize_html(Some(html)), "<div><p>Hello</p></div>");
}
