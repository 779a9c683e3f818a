//! Bounds-checked sequential reader over an in-memory byte buffer.
//!
//! The chunk container encodes extents as byte counts, so the parser needs
//! absolute seeks in addition to sequential reads. All reads are checked
//! against the buffer length up front; nothing here panics on foreign input.

use crate::core::error::VoxError;

/// Read-only cursor over a byte slice. Little-endian fixed-width reads.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current absolute position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Bytes remaining past the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True when the cursor has consumed the whole buffer.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Move to an absolute position. Seeking to exactly `len()` is allowed
    /// (end-of-buffer); anything past it is an error.
    pub fn seek(&mut self, target: usize) -> Result<(), VoxError> {
        if target > self.data.len() {
            return Err(VoxError::OutOfRange {
                target,
                len: self.data.len(),
            });
        }
        self.pos = target;
        Ok(())
    }

    /// Read `n` raw bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], VoxError> {
        if self.remaining() < n {
            return Err(VoxError::TruncatedInput {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, VoxError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32, VoxError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian i32.
    pub fn read_i32(&mut self) -> Result<i32, VoxError> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read `n` bytes as text. Foreign-authored files are not guaranteed to
    /// hold valid UTF-8, so invalid sequences are replaced rather than fatal.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String, VoxError> {
        let bytes = self.read_bytes(n)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let data = [0x01, 0x02, 0x00, 0x00, 0x00, 0xFF];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u32().unwrap(), 2);
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn test_i32_negative() {
        let data = (-7i32).to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_i32().unwrap(), -7);
    }

    #[test]
    fn test_truncated_read() {
        let data = [0x01, 0x02];
        let mut cursor = ByteCursor::new(&data);
        match cursor.read_u32() {
            Err(VoxError::TruncatedInput {
                offset,
                needed,
                remaining,
            }) => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected TruncatedInput, got {:?}", other.map(|_| ())),
        }
        // A failed read must not advance the cursor
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 8];
        let mut cursor = ByteCursor::new(&data);
        cursor.seek(8).unwrap();
        assert!(cursor.is_empty());
        assert!(matches!(
            cursor.seek(9),
            Err(VoxError::OutOfRange { target: 9, len: 8 })
        ));
    }

    #[test]
    fn test_fixed_string_lossy() {
        let data = [b'V', b'O', b'X', b' ', 0xFF];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_fixed_string(4).unwrap(), "VOX ");
        assert_eq!(cursor.read_fixed_string(1).unwrap(), "\u{FFFD}");
    }
}
