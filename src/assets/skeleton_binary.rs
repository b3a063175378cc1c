//! Skeleton Binary Reader
//!
//! Low-level primitives for the skeletal animation binary stream: a
//! forward-only cursor over a byte buffer with varint, fixed-width int and
//! length-prefixed string reads, plus the version-compatibility probe that
//! validates a skeleton blob against the supported runtime version before
//! handing it to the native decoder.
//!
//! The cursor advances monotonically and never rewinds. Any read that needs
//! more bytes than remain fails with [`SableError::BufferUnderflow`], which
//! is fatal to the calling decode operation — the cursor position is
//! unspecified after a failed read.

use crate::errors::{Result, SableError};

/// Skeleton runtime version supported by this build.
pub const SKELETON_VERSION: &str = "4.2";

// Major.minor prefix with a trailing dot, so "4.20" does not match.
const SKELETON_VERSION_PREFIX: &str = "4.2.";

/// A forward-only read cursor over a byte buffer.
pub struct DataInput<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> DataInput<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Current read position, in bytes from the start of the buffer.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Remaining readable bytes.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn read_byte(&mut self) -> Result<u8> {
        let b = *self
            .data
            .get(self.cursor)
            .ok_or(SableError::BufferUnderflow)?;
        self.cursor += 1;
        Ok(b)
    }

    /// Reads a variable-length integer: up to 5 bytes, 7 payload bits per
    /// byte, continuation flag in the high bit.
    ///
    /// When `optimize_positive` is `false` the value is zigzag-decoded to
    /// recover a signed integer (small-magnitude negatives stay compact in
    /// the encoding).
    pub fn read_varint(&mut self, optimize_positive: bool) -> Result<i32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let b = self.read_byte()?;
            value |= u32::from(b & 0x7F) << shift;
            shift += 7;
            if b & 0x80 == 0 || shift >= 32 {
                break;
            }
        }

        if optimize_positive {
            Ok(value as i32)
        } else {
            // Unsigned right shift by one, XOR the negated low bit.
            Ok(((value >> 1) as i32) ^ -((value & 1) as i32))
        }
    }

    /// Reads a 4-byte big-endian signed 32-bit integer.
    ///
    /// Overflow wraps per two's-complement semantics.
    pub fn read_int(&mut self) -> Result<i32> {
        if self.remaining() < 4 {
            return Err(SableError::BufferUnderflow);
        }
        let bytes = &self.data[self.cursor..self.cursor + 4];
        self.cursor += 4;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// The length is a positive varint. Length 0 means "no string" and
    /// returns `None` without consuming further bytes. Otherwise
    /// `length - 1` bytes are consumed — the format reserves one byte for a
    /// trailing terminator that is not materialized in the decoded string.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let length = self.read_varint(true)? as usize;
        if length == 0 {
            return Ok(None);
        }

        let byte_count = length - 1;
        if self.remaining() < byte_count {
            return Err(SableError::BufferUnderflow);
        }
        let bytes = &self.data[self.cursor..self.cursor + byte_count];
        self.cursor += byte_count;

        // Invalid sequences are replaced, matching the lenient decoding of
        // the runtime this format targets.
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }
}

fn is_version_compatible(version: Option<&str>) -> bool {
    version.is_some_and(|v| v.starts_with(SKELETON_VERSION_PREFIX))
}

/// Probes a skeleton binary blob for runtime compatibility.
///
/// Reads the two leading 4-byte hashes, then the length-prefixed semantic
/// version string, and accepts the blob iff the version starts with the
/// supported major.minor prefix. A malformed or truncated header is simply
/// incompatible — the probe never fails with an error.
#[must_use]
pub fn is_binary_supported(buffer: &[u8]) -> bool {
    let mut input = DataInput::new(buffer);
    let mut probe = || -> Result<Option<String>> {
        input.read_int()?; // hash
        input.read_int()?; // hash
        input.read_string()
    };
    match probe() {
        Ok(version) => is_version_compatible(version.as_deref()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_single_byte() {
        let mut input = DataInput::new(&[0x05]);
        assert_eq!(input.read_varint(true).unwrap(), 5);
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn test_varint_continuation() {
        // 300 = 0b1_0010_1100 → [0xAC, 0x02]
        let mut input = DataInput::new(&[0xAC, 0x02]);
        assert_eq!(input.read_varint(true).unwrap(), 300);
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_version_prefix_rejects_lookalike() {
        assert!(is_version_compatible(Some("4.2.11")));
        assert!(!is_version_compatible(Some("4.20.1")));
        assert!(!is_version_compatible(None));
    }
}
