#![no_main]

use libfuzzer_sys::fuzz_target;
use stepwatch::events::parse_event_line;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any replay line either parses or yields an EventError, never a panic
        for (i, line) in input.lines().enumerate() {
            let _ = parse_event_line(line, i + 1);
        }
    }
});
