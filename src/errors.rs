//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`SableError`] covers the failure modes of the
//! binary asset codecs and configuration loading:
//! - Bin-package container decoding errors
//! - Skeleton binary stream underflow
//! - Settings (de)serialization errors
//!
//! Pipeline wiring violations (a negative remaining-pass counter, a pass
//! chain that does not drain its counter) are **not** represented here:
//! they are programming errors and surface as assertion failures, never as
//! recoverable `Result`s.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, SableError>`.

use thiserror::Error;

/// The main error type for the Sable engine.
#[derive(Error, Debug)]
pub enum SableError {
    // ========================================================================
    // Bin-Package Container Errors
    // ========================================================================
    /// The buffer does not start with the `BINP` magic tag.
    #[error("Invalid bin package format")]
    InvalidPackFormat,

    /// The package version has no registered decoder.
    #[error("Unsupported bin package version: {0}")]
    UnsupportedPackVersion(u32),

    /// A file entry points outside the package payload.
    #[error("Bin package entry out of bounds: {context} (offset: {offset}, size: {size})")]
    PackEntryOutOfBounds {
        /// Description of the offending entry
        context: String,
        /// Absolute byte offset of the entry
        offset: usize,
        /// Entry size in bytes
        size: usize,
    },

    // ========================================================================
    // Binary Stream Errors
    // ========================================================================
    /// A read required more bytes than remain in the buffer.
    ///
    /// Fatal to the current decode operation; the cursor state is
    /// unspecified afterwards.
    #[error("Buffer underflow")]
    BufferUnderflow,

    // ========================================================================
    // I/O & Configuration Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error (pipeline settings).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, SableError>`.
pub type Result<T> = std::result::Result<T, SableError>;
