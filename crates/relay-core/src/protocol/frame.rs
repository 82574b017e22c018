//! Length-prefixed frame codec for the native messaging stdio channel.
//!
//! Wire format:
//! ```text
//! [length:4][payload:length]
//! ```
//! `length` is an unsigned 32-bit little-endian integer.  The payload is UTF-8
//! JSON, but this module treats it as opaque bytes.
//!
//! # Blocking reads
//!
//! The reader blocks until a whole frame has arrived.  A pipe can hand back
//! any number of bytes per `read()`, so both the prefix and the payload are
//! accumulated across as many reads as it takes.  Fewer than four bytes
//! before EOF is the normal end of the session, reported as `Ok(None)`.

use std::io::{ErrorKind, Read, Write};

use thiserror::Error;

/// Size of the little-endian length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Errors raised by the frame codec.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The underlying stream failed.
    #[error("stdio transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before the declared payload length was received.
    #[error("frame truncated: header declared {declared} bytes, stream ended after {received}")]
    Truncated { declared: u32, received: usize },

    /// The payload does not fit in a 32-bit length prefix.
    #[error("frame payload of {0} bytes exceeds the 4-byte length prefix")]
    TooLarge(usize),
}

/// Reads one frame from `reader`.
///
/// Returns `Ok(None)` when the stream ends before a complete length prefix is
/// available.
///
/// # Errors
///
/// Returns [`FrameError::Truncated`] when the stream ends inside a payload,
/// and [`FrameError::Io`] for any other read failure.
///
/// # Examples
///
/// ```rust
/// use mouse_relay_core::protocol::frame::{encode_frame, read_frame};
///
/// let bytes = encode_frame(br#"{"event":{"type":"click"}}"#).unwrap();
/// let mut cursor = std::io::Cursor::new(bytes);
/// let payload = read_frame(&mut cursor).unwrap().unwrap();
/// assert_eq!(payload, br#"{"event":{"type":"click"}}"#);
/// assert!(read_frame(&mut cursor).unwrap().is_none());
/// ```
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, FrameError> {
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    if !fill_prefix(reader, &mut prefix)? {
        return Ok(None);
    }
    let declared = u32::from_le_bytes(prefix);

    // `take` + `read_to_end` grows the buffer as bytes arrive instead of
    // trusting the prefix for a single up-front allocation.
    let mut payload = Vec::new();
    reader
        .by_ref()
        .take(u64::from(declared))
        .read_to_end(&mut payload)?;

    if payload.len() < declared as usize {
        return Err(FrameError::Truncated {
            declared,
            received: payload.len(),
        });
    }
    Ok(Some(payload))
}

/// Writes `payload` as one frame and flushes `writer`.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the payload length does not fit in a
/// `u32`, or [`FrameError::Io`] if the write or flush fails.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    let length = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge(payload.len()))?;
    writer.write_all(&length.to_le_bytes())?;
    writer.write_all(payload)?;
    // The browser reads frames eagerly; an unflushed reply is never seen.
    writer.flush()?;
    Ok(())
}

/// Encodes `payload` into a standalone frame buffer.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the payload length does not fit in a `u32`.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let length = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge(payload.len()))?;
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    buf.extend_from_slice(&length.to_le_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Fills `prefix` completely, returning `false` if EOF arrives first.
fn fill_prefix<R: Read>(reader: &mut R, prefix: &mut [u8; LENGTH_PREFIX_LEN]) -> Result<bool, FrameError> {
    let mut filled = 0;
    while filled < LENGTH_PREFIX_LEN {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(true)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `chunk` bytes per `read()` call, with an
    /// `Interrupted` error before every chunk, to mimic a slow pipe.
    struct TricklingReader {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        interrupt_next: bool,
    }

    impl TricklingReader {
        fn new(data: Vec<u8>, chunk: usize) -> Self {
            Self {
                data,
                pos: 0,
                chunk,
                interrupt_next: true,
            }
        }
    }

    impl Read for TricklingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(std::io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            self.interrupt_next = true;
            let remaining = self.data.len() - self.pos;
            let n = remaining.min(self.chunk).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_write_frame_emits_le_prefix_then_payload() {
        // Arrange
        let mut out = Vec::new();

        // Act
        write_frame(&mut out, br#"{"status":"ready"}"#).unwrap();

        // Assert: 18 == 0x12, little-endian
        assert_eq!(&out[..4], &[0x12, 0x00, 0x00, 0x00]);
        assert_eq!(&out[4..], br#"{"status":"ready"}"#);
    }

    #[test]
    fn test_prefix_is_little_endian_for_multi_byte_lengths() {
        let payload = vec![b'x'; 0x0102];
        let frame = encode_frame(&payload).unwrap();
        assert_eq!(&frame[..4], &[0x02, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_round_trip_through_cursor() {
        let payloads: [&[u8]; 3] = [b"", b"{}", &[0u8, 159, 146, 150, 255]];
        let mut stream = Vec::new();
        for p in payloads {
            write_frame(&mut stream, p).unwrap();
        }

        let mut cursor = Cursor::new(stream);
        for p in payloads {
            assert_eq!(read_frame(&mut cursor).unwrap().as_deref(), Some(p));
        }
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_single_byte_chunks_yield_one_complete_frame() {
        // Arrange
        let payload = br#"{"event":{"type":"move","dx":5,"dy":-3}}"#.to_vec();
        let mut reader = TricklingReader::new(encode_frame(&payload).unwrap(), 1);

        // Act
        let decoded = read_frame(&mut reader).unwrap();

        // Assert
        assert_eq!(decoded, Some(payload));
        assert!(read_frame(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_uneven_chunks_spanning_prefix_and_payload() {
        let mut stream = encode_frame(b"first").unwrap();
        stream.extend(encode_frame(b"second frame").unwrap());
        let mut reader = TricklingReader::new(stream, 3);

        assert_eq!(read_frame(&mut reader).unwrap().unwrap(), b"first");
        assert_eq!(read_frame(&mut reader).unwrap().unwrap(), b"second frame");
        assert!(read_frame(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_empty_stream_is_end_of_stream() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_partial_prefix_is_end_of_stream_not_error() {
        for len in 1..LENGTH_PREFIX_LEN {
            let mut cursor = Cursor::new(vec![0x05; len]);
            assert!(read_frame(&mut cursor).unwrap().is_none(), "{len} prefix bytes");
        }
    }

    #[test]
    fn test_short_payload_is_truncated_error() {
        // Arrange: header declares 10 bytes, only 4 follow
        let mut stream = 10u32.to_le_bytes().to_vec();
        stream.extend_from_slice(b"abcd");

        // Act
        let err = read_frame(&mut Cursor::new(stream)).unwrap_err();

        // Assert
        assert!(matches!(
            err,
            FrameError::Truncated {
                declared: 10,
                received: 4
            }
        ));
    }

    #[test]
    fn test_huge_declared_length_does_not_preallocate() {
        // A bogus prefix must fail as truncated, not abort on allocation.
        let stream = u32::MAX.to_le_bytes().to_vec();
        let err = read_frame(&mut Cursor::new(stream)).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { received: 0, .. }));
    }

    #[test]
    fn test_write_frame_flushes() {
        struct FlushTracker {
            bytes: Vec<u8>,
            flushes: usize,
        }
        impl Write for FlushTracker {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                self.flushes += 1;
                Ok(())
            }
        }

        let mut out = FlushTracker {
            bytes: Vec::new(),
            flushes: 0,
        };
        write_frame(&mut out, b"{}").unwrap();
        write_frame(&mut out, b"{}").unwrap();
        assert_eq!(out.flushes, 2);
        assert_eq!(out.bytes.len(), 12);
    }
}
