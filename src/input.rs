use std::io::{self, ErrorKind, Read};

const CHUNK: usize = 4096;

fn is_char_start(byte: u8) -> bool {
    byte & 0xC0 != 0x80
}

/// Encoded length announced by a UTF-8 lead byte. Invalid leads count as one.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Bytes still missing from the last character of `raw`.
fn pending_bytes(raw: &[u8]) -> usize {
    match raw.iter().rposition(|b| is_char_start(*b)) {
        Some(start) => utf8_width(raw[start]).saturating_sub(raw.len() - start),
        None => 0,
    }
}

/// Read at most `limit` characters of body text, dropping NUL characters
/// and surrounding whitespace.
///
/// Reading stops as soon as `limit` characters are in hand, so a producer
/// that keeps the pipe open does not block us. Input that is not valid UTF-8
/// is decoded lossily.
pub fn read_body_text(reader: &mut impl Read, limit: usize) -> io::Result<String> {
    let mut raw = Vec::new();
    let mut chars = 0;
    let mut chunk = [0u8; CHUNK];

    loop {
        // Every character still to come takes at least one byte, so asking
        // for this many never reads past the limit.
        let want = pending_bytes(&raw) + limit.saturating_sub(chars);
        if want == 0 {
            break;
        }
        let n = match reader.read(&mut chunk[..want.min(CHUNK)]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        chars += chunk[..n].iter().filter(|b| is_char_start(**b)).count();
        raw.extend_from_slice(&chunk[..n]);
    }

    let text: String = String::from_utf8_lossy(&raw).chars().take(limit).collect();
    Ok(text.replace('\0', "").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out `data` at most `step` bytes at a time, then panics: the
    /// writer is still attached, so another read would block forever.
    struct OpenPipe {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl OpenPipe {
        fn new(data: &str, step: usize) -> Self {
            Self {
                data: data.as_bytes().to_vec(),
                pos: 0,
                step,
            }
        }
    }

    impl Read for OpenPipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            assert!(
                self.pos < self.data.len(),
                "read past {} bytes on an open pipe",
                self.pos
            );
            let n = buf.len().min(self.step).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_strips_and_trims() {
        let mut input = Cursor::new("\n  hello\0 world \n\n");
        assert_eq!(read_body_text(&mut input, 1024).unwrap(), "hello world");
    }

    #[test]
    fn test_blank_input_is_empty() {
        let mut input = Cursor::new("\n\n");
        assert_eq!(read_body_text(&mut input, 1024).unwrap(), "");
    }

    #[test]
    fn test_limit_counts_characters() {
        let mut input = Cursor::new("ééééé");
        assert_eq!(read_body_text(&mut input, 3).unwrap(), "ééé");
    }

    #[test]
    fn test_zero_limit() {
        let mut input = Cursor::new("anything");
        assert_eq!(read_body_text(&mut input, 0).unwrap(), "");
    }

    #[test]
    fn test_stops_at_limit_on_open_pipe() {
        let mut pipe = OpenPipe::new("0123456789", 64);
        assert_eq!(read_body_text(&mut pipe, 10).unwrap(), "0123456789");
    }

    #[test]
    fn test_open_pipe_multibyte_trickle() {
        // One byte per read: the second 'é' arrives split across calls.
        let mut pipe = OpenPipe::new("aéé", 1);
        assert_eq!(read_body_text(&mut pipe, 3).unwrap(), "aéé");
    }

    #[test]
    fn test_read_error_propagates() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("stdin closed"))
            }
        }
        assert!(read_body_text(&mut Broken, 10).is_err());
    }
}
