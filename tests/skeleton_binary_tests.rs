//! Skeleton Binary Reader Tests
//!
//! Tests for:
//! - Varint decoding, positive and zigzag-signed
//! - Fixed-width big-endian int reads
//! - Length-prefixed string reads (0 = none, length - 1 payload bytes)
//! - Buffer underflow behavior
//! - The version-compatibility probe

use sable::assets::skeleton_binary::is_binary_supported;
use sable::{DataInput, SableError};

/// Varint-encodes an unsigned value, 7 bits per byte, low group first.
fn encode_varint(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out
}

fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

// ============================================================================
// Varint
// ============================================================================

#[test]
fn varint_five_byte_maximum() {
    let bytes = encode_varint(u32::MAX);
    assert_eq!(bytes.len(), 5);

    let mut input = DataInput::new(&bytes);
    assert_eq!(input.read_varint(true).unwrap(), -1);
    assert_eq!(input.cursor(), 5);
}

#[test]
fn varint_zigzag_round_trips_signed_values() {
    for value in [0, -1, 1, -2, 2, 63, -64, 64, -65, 1_000_000, -1_000_000, i32::MAX, i32::MIN] {
        let bytes = encode_varint(zigzag(value));
        let mut input = DataInput::new(&bytes);
        assert_eq!(
            input.read_varint(false).unwrap(),
            value,
            "zigzag round trip failed for {value}"
        );
    }
}

#[test]
fn varint_small_negatives_stay_compact() {
    // Zigzag keeps -1 in a single byte.
    assert_eq!(encode_varint(zigzag(-1)), vec![0x01]);
    assert_eq!(encode_varint(zigzag(1)), vec![0x02]);
}

#[test]
fn varint_underflow_on_empty_buffer() {
    let mut input = DataInput::new(&[]);
    assert!(matches!(
        input.read_varint(true),
        Err(SableError::BufferUnderflow)
    ));
}

#[test]
fn varint_underflow_on_dangling_continuation() {
    // Continuation bit set, no following byte.
    let mut input = DataInput::new(&[0x80]);
    assert!(matches!(
        input.read_varint(true),
        Err(SableError::BufferUnderflow)
    ));
}

// ============================================================================
// Fixed-width int
// ============================================================================

#[test]
fn int_is_big_endian() {
    let mut input = DataInput::new(&[0, 0, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(input.read_int().unwrap(), 1);
    assert_eq!(input.read_int().unwrap(), -1);
    assert_eq!(input.remaining(), 0);
}

#[test]
fn int_underflow_leaves_no_partial_read() {
    let mut input = DataInput::new(&[0, 0, 1]);
    assert!(matches!(input.read_int(), Err(SableError::BufferUnderflow)));
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn string_length_zero_is_none() {
    let mut input = DataInput::new(&[0x00, 0xAB]);
    assert_eq!(input.read_string().unwrap(), None);
    // Only the length byte is consumed.
    assert_eq!(input.cursor(), 1);
}

#[test]
fn string_consumes_length_minus_one_bytes() {
    // Length 4 → 3 payload bytes.
    let mut input = DataInput::new(&[0x04, b'a', b'b', b'c', b'z']);
    assert_eq!(input.read_string().unwrap().as_deref(), Some("abc"));
    assert_eq!(input.cursor(), 4);
}

#[test]
fn string_length_one_is_empty() {
    let mut input = DataInput::new(&[0x01]);
    assert_eq!(input.read_string().unwrap().as_deref(), Some(""));
}

#[test]
fn string_underflow_when_payload_is_truncated() {
    let mut input = DataInput::new(&[0x05, b'a', b'b']);
    assert!(matches!(
        input.read_string(),
        Err(SableError::BufferUnderflow)
    ));
}

// ============================================================================
// Version probe
// ============================================================================

fn skeleton_header(version: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&123i32.to_be_bytes());
    out.extend_from_slice(&456i32.to_be_bytes());
    out.extend_from_slice(&encode_varint(version.len() as u32 + 1));
    out.extend_from_slice(version.as_bytes());
    out
}

#[test]
fn probe_accepts_supported_patch_versions() {
    assert!(is_binary_supported(&skeleton_header("4.2.0")));
    assert!(is_binary_supported(&skeleton_header("4.2.37")));
}

#[test]
fn probe_rejects_other_minor_versions() {
    assert!(!is_binary_supported(&skeleton_header("4.1.9")));
    assert!(!is_binary_supported(&skeleton_header("4.20.1")));
    assert!(!is_binary_supported(&skeleton_header("3.8.99")));
}

#[test]
fn probe_rejects_missing_version_string() {
    let mut header = Vec::new();
    header.extend_from_slice(&0i32.to_be_bytes());
    header.extend_from_slice(&0i32.to_be_bytes());
    header.push(0x00); // no string
    assert!(!is_binary_supported(&header));
}

#[test]
fn probe_rejects_truncated_header() {
    assert!(!is_binary_supported(&[0, 0, 0]));
    assert!(!is_binary_supported(&[]));
}
