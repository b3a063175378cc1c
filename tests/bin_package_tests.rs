//! Bin Package Container Tests
//!
//! Tests for:
//! - Version-2 pack/unpack round trips (zero-copy views)
//! - Version-1 prefix-sum offset reconstruction
//! - Header rejection: bad magic, unknown version
//! - Bounds validation of file entries

use sable::assets::bin_package::{pack, unpack, PACK_BIN_TYPE, VERSION};
use sable::SableError;

fn v1_package(files: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&PACK_BIN_TYPE);
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());
    for file in files {
        out.extend_from_slice(&(file.len() as u32).to_le_bytes());
    }
    for file in files {
        out.extend_from_slice(file);
    }
    out
}

// ============================================================================
// Version 2
// ============================================================================

#[test]
fn v2_round_trip_preserves_files() {
    let files: [&[u8]; 3] = [b"first", b"", b"third-file-payload"];
    let packed = pack(&files);

    let views = unpack(&packed).unwrap();
    assert_eq!(views.len(), 3);
    assert_eq!(views[0], b"first");
    assert_eq!(views[1], b"");
    assert_eq!(views[2], b"third-file-payload");
}

#[test]
fn v2_views_borrow_from_the_packed_buffer() {
    let files: [&[u8]; 1] = [b"payload"];
    let packed = pack(&files);
    let views = unpack(&packed).unwrap();

    let buffer_range = packed.as_ptr() as usize..packed.as_ptr() as usize + packed.len();
    assert!(buffer_range.contains(&(views[0].as_ptr() as usize)));
}

#[test]
fn v2_header_uses_current_version() {
    let packed = pack(&[]);
    assert_eq!(&packed[0..4], b"BINP");
    assert_eq!(
        u32::from_le_bytes(packed[4..8].try_into().unwrap()),
        VERSION
    );
}

#[test]
fn v2_truncated_payload_is_out_of_bounds() {
    let files: [&[u8]; 2] = [b"aaaa", b"bbbb"];
    let mut packed = pack(&files);
    packed.truncate(packed.len() - 2);

    match unpack(&packed) {
        Err(SableError::PackEntryOutOfBounds { offset, size, .. }) => {
            assert_eq!(size, 4);
            assert!(offset > 0);
        }
        other => panic!("expected out-of-bounds error, got {other:?}"),
    }
}

// ============================================================================
// Version 1
// ============================================================================

#[test]
fn v1_offsets_are_prefix_sums() {
    let files: [&[u8]; 3] = [b"ab", b"cdef", b"g"];
    let packed = v1_package(&files);

    let views = unpack(&packed).unwrap();
    assert_eq!(views, files);
}

#[test]
fn v1_empty_package() {
    let packed = v1_package(&[]);
    assert!(unpack(&packed).unwrap().is_empty());
}

// ============================================================================
// Header rejection
// ============================================================================

#[test]
fn bad_magic_is_invalid_format() {
    let mut packed = pack(&[]);
    packed[0] = b'X';
    assert!(matches!(
        unpack(&packed),
        Err(SableError::InvalidPackFormat)
    ));
}

#[test]
fn unknown_version_is_rejected_with_the_raw_number() {
    let mut packed = pack(&[]);
    packed[4..8].copy_from_slice(&7u32.to_le_bytes());
    assert!(matches!(
        unpack(&packed),
        Err(SableError::UnsupportedPackVersion(7))
    ));
}

#[test]
fn truncated_header_underflows() {
    assert!(matches!(
        unpack(b"BINP\x02"),
        Err(SableError::BufferUnderflow)
    ));
}
