#![no_main]
//! Arbitrary text, split at arbitrary points, must never panic the decoder,
//! and every byte must be accounted for as discarded or retained.

use arena_log_decoder::{LogDecoder, LogEntry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&stride, rest)) = data.split_first() else {
        return;
    };
    let text = String::from_utf8_lossy(rest);
    let stride = usize::from(stride).max(1);

    let mut decoder = LogDecoder::new();
    let mut last_end = 0u64;
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + stride).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        decoder
            .append(&text[start..end], &mut |entry: LogEntry| {
                assert!(entry.position >= last_end);
                last_end = entry.position + entry.source_len as u64;
                let _ = entry.json();
            })
            .expect("every searched label is recognised by the pattern table");
        start = end;
    }
    assert_eq!(
        decoder.total_discarded() + decoder.retained_len() as u64,
        text.len() as u64
    );
});
