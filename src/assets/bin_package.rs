//! Bin Package Container Codec
//!
//! A length-prefixed multi-file binary container. Small binary assets are
//! packed into a single download unit at build time and unpacked lazily at
//! load time into zero-copy views over the original buffer.
//!
//! # Format (current version, 2)
//!
//! ```text
//! |PACK_BIN_TYPE - 4 bytes|          "BINP"
//! |VERSION       - 4 bytes|          little-endian
//! |FILES_COUNT   - 4 bytes|          little-endian
//! |FILE_1_OFFSET - 4 bytes|          relative to end of header table
//! |FILE_1_SIZE   - 4 bytes|
//! ...
//! |FILE_N_OFFSET - 4 bytes|
//! |FILE_N_SIZE   - 4 bytes|
//! |PACKED_BIN|
//! ```
//!
//! Version 1 stored only per-file sizes; absolute offsets are reconstructed
//! by prefix-summing the sizes, starting just after the size table.
//!
//! # Failure modes
//!
//! Decoding is all-or-nothing: a bad magic tag, an unknown version, or any
//! entry reaching past the end of the buffer fails the whole `unpack` call.
//! There is no partial result and no retry.

use crate::errors::{Result, SableError};

/// Magic tag at the start of every package.
pub const PACK_BIN_TYPE: [u8; 4] = *b"BINP";

/// Current container version, written by [`pack`].
pub const VERSION: u32 = 2;

/// All header integers are little-endian 32-bit.
const UNIT_SIZE: usize = 4;

/// Known container versions.
///
/// Unknown version numbers are rejected at the boundary with
/// [`SableError::UnsupportedPackVersion`] instead of an undefined decoder
/// lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackVersion {
    /// Sizes-only header; offsets derived by prefix sum.
    V1,
    /// (relative offset, size) header table.
    V2,
}

impl PackVersion {
    /// Maps a raw version number to a known decoder version.
    #[must_use]
    pub fn from_raw(version: u32) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }
}

/// Reads the little-endian u32 at byte offset `pos`.
fn read_u32_le(buffer: &[u8], pos: usize) -> Result<u32> {
    let bytes = buffer
        .get(pos..pos + UNIT_SIZE)
        .ok_or(SableError::BufferUnderflow)?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

/// Slices one file entry out of the payload, validating bounds.
fn file_view(buffer: &[u8], index: usize, offset: usize, size: usize) -> Result<&[u8]> {
    buffer
        .get(offset..offset + size)
        .ok_or_else(|| SableError::PackEntryOutOfBounds {
            context: format!("file {index}"),
            offset,
            size,
        })
}

/// Unpacks a bin package into one zero-copy byte view per file, in
/// file-table order.
///
/// # Errors
///
/// - [`SableError::InvalidPackFormat`] if the magic tag mismatches.
/// - [`SableError::UnsupportedPackVersion`] if no decoder is registered for
///   the version field.
/// - [`SableError::BufferUnderflow`] / [`SableError::PackEntryOutOfBounds`]
///   if the header or any file entry is truncated.
pub fn unpack(buffer: &[u8]) -> Result<Vec<&[u8]>> {
    let magic = buffer.get(..UNIT_SIZE).ok_or(SableError::BufferUnderflow)?;
    if magic != PACK_BIN_TYPE {
        return Err(SableError::InvalidPackFormat);
    }

    let raw_version = read_u32_le(buffer, UNIT_SIZE)?;
    match PackVersion::from_raw(raw_version) {
        Some(PackVersion::V2) => unpack_v2(buffer),
        Some(PackVersion::V1) => unpack_v1(buffer),
        None => Err(SableError::UnsupportedPackVersion(raw_version)),
    }
}

fn unpack_v2(buffer: &[u8]) -> Result<Vec<&[u8]>> {
    let files_count = read_u32_le(buffer, UNIT_SIZE * 2)? as usize;

    // Offsets in the file table are relative to the end of the header.
    let head_offset = UNIT_SIZE * (3 + files_count * 2);

    let mut files = Vec::with_capacity(files_count);
    for i in 0..files_count {
        let offset = read_u32_le(buffer, UNIT_SIZE * (3 + i * 2))? as usize + head_offset;
        let size = read_u32_le(buffer, UNIT_SIZE * (3 + i * 2 + 1))? as usize;
        files.push(file_view(buffer, i, offset, size)?);
    }
    Ok(files)
}

/// Legacy version-1 decoder. The header stores sizes only; file `i` starts
/// at `header_end + sum(size_0 .. size_(i-1))`.
fn unpack_v1(buffer: &[u8]) -> Result<Vec<&[u8]>> {
    let files_count = read_u32_le(buffer, UNIT_SIZE * 2)? as usize;

    let mut offset = UNIT_SIZE * (3 + files_count);
    let mut files = Vec::with_capacity(files_count);
    for i in 0..files_count {
        let size = read_u32_le(buffer, UNIT_SIZE * (3 + i))? as usize;
        files.push(file_view(buffer, i, offset, size)?);
        offset += size;
    }
    Ok(files)
}

/// Packs files into a current-version ([`VERSION`]) container.
///
/// Inverse of [`unpack`] for version-2 packages:
/// `unpack(&pack(files))` yields byte-identical views of `files`.
#[must_use]
pub fn pack(files: &[&[u8]]) -> Vec<u8> {
    let header_len = UNIT_SIZE * (3 + files.len() * 2);
    let payload_len: usize = files.iter().map(|f| f.len()).sum();

    let mut out = Vec::with_capacity(header_len + payload_len);
    out.extend_from_slice(&PACK_BIN_TYPE);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());

    let mut rel_offset = 0u32;
    for file in files {
        out.extend_from_slice(&rel_offset.to_le_bytes());
        out.extend_from_slice(&(file.len() as u32).to_le_bytes());
        rel_offset += file.len() as u32;
    }
    for file in files {
        out.extend_from_slice(file);
    }
    out
}
