#![no_main]

use cms_markdown_converter::{validate_conversion, MarkdownConverter};
use libfuzzer_sys::fuzz_target;

// Conversion must never panic, and its report must stay in range
fuzz_target!(|data: &[u8]| {
    let Ok(html) = std::str::from_utf8(data) else {
        return;
    };

    let conversion = MarkdownConverter::new().convert(Some(html));
    let report = validate_conversion(html, conversion.markdown());
    assert!((0.0..=1.0).contains(&report.similarity));
});
