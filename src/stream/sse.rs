//! SSE message-line reading.
//!
//! Only the minimal framing the run endpoint uses is handled here: the byte
//! stream is split into lines, blank separator lines and `:` comment lines
//! are dropped, and every other line is surfaced verbatim for the iterator to
//! inspect.
use bytes::{Bytes, BytesMut};
use memchr::memchr;
use std::io::{self, Read};

use crate::config::DecoderConfig;

/// Something that yields raw SSE message lines on demand.
pub trait LineSource {
    /// Read the next message line, without its line terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when reading fails, or
    /// [`io::ErrorKind::InvalidData`] when a line exceeds the configured
    /// length limit.
    fn next_line(&mut self) -> io::Result<Option<Bytes>>;
}

// ---------------------------------------------------------------------------
// LineBuffer: incremental line splitter
// ---------------------------------------------------------------------------

/// Incremental line splitter.
///
/// Feed it byte chunks split on arbitrary boundaries and pull complete
/// message lines out of it.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: BytesMut,
    scan_from: usize,
    max_line_bytes: usize,
}

impl LineBuffer {
    #[must_use]
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scan_from: 0,
            max_line_bytes,
        }
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Pop the next complete message line, if one is buffered.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidData`] when the pending (unterminated)
    /// line is longer than the limit.
    pub fn next_line(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            let Some(rel_pos) = memchr(b'\n', &self.buffer[self.scan_from..]) else {
                self.scan_from = self.buffer.len();
                if self.buffer.len() > self.max_line_bytes {
                    return Err(line_too_long(self.max_line_bytes));
                }
                return Ok(None);
            };
            let line_end = self.scan_from + rel_pos;
            self.scan_from = 0;
            if line_end > self.max_line_bytes {
                return Err(line_too_long(self.max_line_bytes));
            }
            let line = self.buffer.split_to(line_end + 1).freeze();
            if let Some(line) = message_line(line.slice(..line_end)) {
                return Ok(Some(line));
            }
        }
    }

    /// Take the trailing unterminated line at end of input.
    pub fn take_remainder(&mut self) -> Option<Bytes> {
        self.scan_from = 0;
        if self.buffer.is_empty() {
            return None;
        }
        message_line(self.buffer.split().freeze())
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DecoderConfig::default().max_line_bytes)
    }
}

fn message_line(mut line: Bytes) -> Option<Bytes> {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    // Blank lines separate frames; lines starting with ':' are comments.
    if line.is_empty() || line[0] == b':' {
        return None;
    }
    Some(line)
}

fn line_too_long(limit: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("SSE line exceeds {limit} bytes"),
    )
}

// ---------------------------------------------------------------------------
// SseLineReader: blocking line source over a reader
// ---------------------------------------------------------------------------

/// Blocking [`LineSource`] over any [`Read`] body.
///
/// Owns the reader; dropping the line reader releases it.
#[derive(Debug)]
pub struct SseLineReader<R> {
    reader: R,
    lines: LineBuffer,
    chunk: Vec<u8>,
    eof: bool,
}

impl<R: Read> SseLineReader<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, &DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(reader: R, config: &DecoderConfig) -> Self {
        Self {
            reader,
            lines: LineBuffer::new(config.max_line_bytes),
            chunk: vec![0; config.read_chunk_bytes.max(1)],
            eof: false,
        }
    }
}

impl<R: Read> LineSource for SseLineReader<R> {
    fn next_line(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            if let Some(line) = self.lines.next_line()? {
                return Ok(Some(line));
            }
            if self.eof {
                return Ok(self.lines.take_remainder());
            }
            match self.reader.read(&mut self.chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.lines.extend(&self.chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> io::Result<Option<Bytes>> {
        (**self).next_line()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect_lines(input: &[u8]) -> Vec<String> {
        let mut reader = SseLineReader::new(Cursor::new(input.to_vec()));
        let mut out = Vec::new();
        while let Some(line) = reader.next_line().unwrap() {
            out.push(String::from_utf8(line.to_vec()).unwrap());
        }
        out
    }

    /// Reader that yields its input one byte per `read` call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_lines_skip_blank_and_comment_lines() {
        let lines = collect_lines(b": keep-alive\ndata: {\"a\":1}\n\ndata: {\"a\":2}\n\n");
        assert_eq!(lines, vec!["data: {\"a\":1}", "data: {\"a\":2}"]);
    }

    #[test]
    fn test_lines_strip_crlf() {
        let lines = collect_lines(b"data: x\r\n\r\ndata: y\r\n");
        assert_eq!(lines, vec!["data: x", "data: y"]);
    }

    #[test]
    fn test_trailing_line_without_newline_is_returned() {
        let lines = collect_lines(b"data: first\n\ninternal error");
        assert_eq!(lines, vec!["data: first", "internal error"]);
    }

    #[test]
    fn test_empty_input_is_immediate_eof() {
        assert!(collect_lines(b"").is_empty());
        assert!(collect_lines(b"\n\n\r\n").is_empty());
    }

    #[test]
    fn test_byte_at_a_time_reader() {
        let mut reader = SseLineReader::new(Trickle(Cursor::new(
            b"data: one\n\ndata: two\n\n".to_vec(),
        )));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some(&b"data: one"[..]));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some(&b"data: two"[..]));
        assert_eq!(reader.next_line().unwrap(), None);
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn test_line_buffer_incremental_chunks() {
        let mut buffer = LineBuffer::new(1024);
        buffer.extend(b"data: hel");
        assert_eq!(buffer.next_line().unwrap(), None);
        buffer.extend(b"lo\n");
        assert_eq!(buffer.next_line().unwrap().as_deref(), Some(&b"data: hello"[..]));
        assert_eq!(buffer.next_line().unwrap(), None);
        assert_eq!(buffer.take_remainder(), None);
    }

    #[test]
    fn test_line_buffer_rejects_oversized_line() {
        let mut buffer = LineBuffer::new(8);
        buffer.extend(b"data: 0123456789");
        let err = buffer.next_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let mut buffer = LineBuffer::new(8);
        buffer.extend(b"data: 0123456789\n");
        assert!(buffer.next_line().is_err());
    }

    #[test]
    fn test_small_read_chunks_still_split_lines() {
        let config = DecoderConfig {
            max_line_bytes: 64,
            read_chunk_bytes: 3,
        };
        let mut reader =
            SseLineReader::with_config(Cursor::new(b"data: abc\ndata: defgh\n".to_vec()), &config);
        assert_eq!(reader.next_line().unwrap().as_deref(), Some(&b"data: abc"[..]));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some(&b"data: defgh"[..]));
        assert_eq!(reader.next_line().unwrap(), None);
    }
}
