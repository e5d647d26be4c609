#![no_main]

use cms_markdown_converter::{markdown_to_html, sanitize_html};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let _ = sanitize_html(Some(input));
    let _ = markdown_to_html(Some(input));
});
