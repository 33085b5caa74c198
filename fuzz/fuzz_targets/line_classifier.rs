#![no_main]

use hartlog::classify::classify_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Classification must return a kind or a trace-token error, never panic
    if let Ok(line) = std::str::from_utf8(data) {
        let _ = classify_line(line, false);
        let _ = classify_line(line, true);
    }
});
