//! Crate-specific error types for mmap-region.

use std::io;
use thiserror::Error;

/// Result alias for mmap-region operations.
pub type Result<T> = std::result::Result<T, RegionError>;

/// Error type covering caller misuse of a region and pass-through OS failures.
#[derive(Debug, Error)]
pub enum RegionError {
    /// Wrapper for `std::io::Error`. OS failures from map, msync, madvise,
    /// mlock and munlock are carried here unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An accessor was invoked on a region that has been unmapped.
    #[error("unmapped memory")]
    UnmappedMemory,

    /// Error when a requested offset/length pair is out of bounds.
    #[error("offset out of mapped region: offset={offset}, len={len}, total={total}")]
    OutOfBounds {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        len: u64,
        /// Total length of the mapped region.
        total: u64,
    },

    /// The requested mapping length is zero or cannot be represented.
    #[error("invalid mapping length: {0}")]
    InvalidLength(u64),

    /// Error returned when attempting an operation in an incompatible mode.
    #[error("invalid access mode: {0}")]
    InvalidMode(&'static str),

    /// A text read ran into bytes that are not UTF-8.
    #[error("invalid UTF-8 at offset {offset} after {valid_up_to} valid bytes")]
    InvalidUtf8 {
        /// Offset the read started at.
        offset: u64,
        /// Number of valid bytes before the bad sequence.
        valid_up_to: usize,
    },
}

impl RegionError {
    /// Whether this error reports caller misuse (lifecycle, bounds, length or
    /// mode) rather than an environmental failure or bad data.
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::UnmappedMemory
                | Self::OutOfBounds { .. }
                | Self::InvalidLength(_)
                | Self::InvalidMode(_)
        )
    }
}

impl From<RegionError> for io::Error {
    fn from(err: RegionError) -> Self {
        match err {
            RegionError::Io(e) => e,
            err if err.is_misuse() => io::Error::new(io::ErrorKind::InvalidInput, err),
            err => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}
