//! Binary Asset Decoding
//!
//! Load-time codecs for packaged binary assets:
//!
//! - [`bin_package`] — the `BINP` multi-file container format (versioned,
//!   zero-copy unpacking).
//! - [`skeleton_binary`] — the low-level big-endian/varint reader used by
//!   skeletal animation data, plus the runtime version-compatibility probe.

pub mod bin_package;
pub mod skeleton_binary;

pub use bin_package::{pack, unpack, PackVersion};
pub use skeleton_binary::{is_binary_supported, DataInput, SKELETON_VERSION};
