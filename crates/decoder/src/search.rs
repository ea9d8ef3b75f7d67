// crates/decoder/src/search.rs
use memchr::memrchr_iter;

/// Byte index of the `n`-th last occurrence of `needle` in `haystack`.
///
/// `n` is 1-based: `n == 1` is the last occurrence. Returns `None` when there
/// are fewer than `n` occurrences or when `n == 0`.
pub fn nth_last_index_of(haystack: &str, needle: u8, n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    memrchr_iter(needle, haystack.as_bytes()).nth(n - 1)
}
