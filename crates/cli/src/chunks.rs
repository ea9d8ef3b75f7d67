// crates/cli/src/chunks.rs
//! Fixed-size reads turned into UTF-8 text chunks.
//!
//! A multi-byte character split across two reads is held back and completed
//! by the next read. Invalid sequences are replaced with U+FFFD.

use std::io::{self, Read};

pub struct TextChunks<R> {
    reader: R,
    read_buf: Vec<u8>,
    pending: Vec<u8>,
    bytes_read: u64,
}

impl<R: Read> TextChunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            read_buf: vec![0u8; chunk_size.max(1)],
            pending: Vec::new(),
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Next non-empty text chunk, or `None` at end of input.
    pub fn next_chunk(&mut self) -> io::Result<Option<String>> {
        loop {
            let n = match self.reader.read(&mut self.read_buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if n == 0 {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let tail = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                return Ok(Some(tail));
            }

            self.bytes_read += n as u64;
            self.pending.extend_from_slice(&self.read_buf[..n]);
            let text = take_decodable(&mut self.pending);
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
}

/// Drain the decodable prefix of `pending`, leaving an incomplete trailing
/// sequence in place.
fn take_decodable(pending: &mut Vec<u8>) -> String {
    let mut out = String::with_capacity(pending.len());
    let mut start = 0;
    loop {
        match std::str::from_utf8(&pending[start..]) {
            Ok(text) => {
                out.push_str(text);
                start = pending.len();
                break;
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&pending[start..valid_end]));
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }
    pending.drain(..start);
    out
}
