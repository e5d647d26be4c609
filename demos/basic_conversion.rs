//! Basic conversion example: HTML in, Markdown and a confidence report out

use cms_markdown_converter::{validate_conversion, Conversion, MarkdownConverter};

fn main() {
    println!("=== CMS Markdown Converter - Basic Examples ===\n");

    let converter = MarkdownConverter::new();

    show(
        &converter,
        "Simple heading and paragraph",
        "<h1>Charyn Canyon</h1><p>A red sandstone canyon east of Almaty.</p>",
    );
    show(
        &converter,
        "Lists and links",
        r#"<h2>What to bring</h2><ul><li>Water</li><li>Hat</li></ul><p>See <a href="/guides/charyn">the guide</a>.</p>"#,
    );
    show(
        &converter,
        "Script removal (security)",
        "<h1>Title</h1><script>alert('xss')</script><p>Safe content</p>",
    );
    show(
        &converter,
        "Content lost in conversion",
        "<p>Kept</p><iframe>Embedded tour video with a long description</iframe>",
    );
}

fn show(converter: &MarkdownConverter, title: &str, html: &str) {
    println!("{title}");
    println!("Input HTML:\n{html}\n");

    let conversion = converter.convert(Some(html));
    if let Conversion::FailedOpen { diagnostic } = &conversion {
        println!("Conversion failed open: {diagnostic}");
    }

    println!("Output Markdown:\n{}\n", conversion.markdown());

    let report = validate_conversion(html, conversion.markdown());
    println!(
        "Valid: {} (similarity {}%)",
        report.is_valid,
        report.similarity_percent()
    );
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    println!("---\n");
}
