#![no_main]

use hartlog::config::SanitizerOptions;
use hartlog::sanitizer::sanitize_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary logs either sanitize or fail with a named error
    if let Ok(log) = std::str::from_utf8(data) {
        let options = SanitizerOptions {
            skip_blank_lines: true,
            ..SanitizerOptions::default()
        };
        let _ = sanitize_str(log, &options);
    }
});
