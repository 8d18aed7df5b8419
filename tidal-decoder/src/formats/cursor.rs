//! Sequential byte cursor
//!
//! `ByteCursor` is the only place the decoder touches its byte source. Every
//! read either returns exactly the requested bytes or fails; the single
//! exception is `read_marker`, which reports a clean end of file as `None`.
//! All multi-byte integers are little-endian.

use crate::types::{DecoderError, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::{BufRead, ErrorKind, Read};

/// Byte reader that tracks its absolute offset for diagnostics
pub struct ByteCursor<R: BufRead> {
    reader: R,
    offset: u64,
}

impl<R: BufRead> ByteCursor<R> {
    /// Wrap a buffered reader positioned at the start of a log
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Number of bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record marker
    ///
    /// Returns `Ok(None)` only when the source has no bytes left. This is the
    /// termination test of the dispatch loop.
    pub fn read_marker(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read exactly `n` bytes
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.read_exact_into(n, &mut bytes)?;
        Ok(bytes)
    }

    /// Append exactly `n` bytes to `out`
    ///
    /// The buffer grows with the data actually read, so a corrupt length never
    /// causes a large up-front allocation. On a short read `out` is restored to
    /// its previous length.
    pub fn read_exact_into(&mut self, n: usize, out: &mut Vec<u8>) -> Result<()> {
        let start = self.offset;
        let original_len = out.len();

        let available = Read::by_ref(&mut self.reader)
            .take(n as u64)
            .read_to_end(out)?;
        self.offset += available as u64;

        if available < n {
            out.truncate(original_len);
            return Err(DecoderError::UnexpectedEndOfStream {
                offset: start,
                needed: n,
                available,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let bytes = self.read_exact(1)?;
        Ok(bytes[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_exact(4)?;
        Ok(LittleEndian::read_u32(&bytes))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_exact(8)?;
        Ok(LittleEndian::read_u64(&bytes))
    }

    /// Read a zero-terminated UTF-8 string (terminator consumed, not returned)
    pub fn read_cstring(&mut self) -> Result<String> {
        let start = self.offset;
        let mut bytes = Vec::new();

        let read = self.reader.read_until(0, &mut bytes)?;
        self.offset += read as u64;

        if bytes.pop() != Some(0) {
            return Err(DecoderError::UnterminatedString { offset: start });
        }

        String::from_utf8(bytes).map_err(|source| DecoderError::InvalidUtf8 {
            offset: start,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cursor(bytes: &[u8]) -> ByteCursor<Cursor<Vec<u8>>> {
        ByteCursor::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn test_little_endian_reads() {
        let mut c = cursor(&[0x2A, 0x01, 0x00, 0x00, 0x00, 0xA0, 0x0F, 0, 0, 0, 0, 0, 0]);
        assert_eq!(c.read_u8().unwrap(), 42);
        assert_eq!(c.read_u32().unwrap(), 1);
        assert_eq!(c.read_u64().unwrap(), 4000);
        assert_eq!(c.offset(), 13);
    }

    #[test]
    fn test_marker_reports_clean_eof() {
        let mut c = cursor(&[0xA5]);
        assert_eq!(c.read_marker().unwrap(), Some(0xA5));
        assert_eq!(c.read_marker().unwrap(), None);
        assert_eq!(c.read_marker().unwrap(), None);
    }

    #[test]
    fn test_short_fixed_width_read() {
        let mut c = cursor(&[0x01, 0x02]);
        let err = c.read_u32().unwrap_err();
        match err {
            DecoderError::UnexpectedEndOfStream {
                offset,
                needed,
                available,
            } => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_read_exact_into_restores_buffer() {
        let mut c = cursor(&[1, 2, 3]);
        let mut out = vec![9];
        assert!(c.read_exact_into(8, &mut out).is_err());
        assert_eq!(out, vec![9]);

        let mut c = cursor(&[1, 2, 3]);
        c.read_exact_into(2, &mut out).unwrap();
        assert_eq!(out, vec![9, 1, 2]);
        assert_eq!(c.read_exact(1).unwrap(), vec![3]);
    }

    #[test]
    fn test_zero_length_read() {
        let mut c = cursor(&[]);
        assert!(c.read_exact(0).unwrap().is_empty());
    }

    #[test]
    fn test_cstring() {
        let mut c = cursor(b"stuff\0small stream\0");
        assert_eq!(c.read_cstring().unwrap(), "stuff");
        assert_eq!(c.read_cstring().unwrap(), "small stream");
        assert_eq!(c.offset(), 19);
    }

    #[test]
    fn test_empty_cstring() {
        let mut c = cursor(b"\0x");
        assert_eq!(c.read_cstring().unwrap(), "");
        assert_eq!(c.offset(), 1);
    }

    #[test]
    fn test_unterminated_cstring() {
        let mut c = cursor(b"\x01abc");
        c.read_u8().unwrap();
        assert!(matches!(
            c.read_cstring(),
            Err(DecoderError::UnterminatedString { offset: 1 })
        ));
    }

    #[test]
    fn test_invalid_utf8_cstring() {
        let mut c = cursor(&[0xFF, 0xFE, 0x00]);
        assert!(matches!(
            c.read_cstring(),
            Err(DecoderError::InvalidUtf8 { offset: 0, .. })
        ));
    }
}
