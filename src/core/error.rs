//! Error types for the voxmarch loader and preprocessor

use thiserror::Error;

/// Main error type for loading and preprocessing
#[derive(Debug, Error)]
pub enum VoxError {
    #[error("bad magic: expected \"VOX \", found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("truncated input: needed {needed} bytes at offset {offset}, {remaining} remain")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("seek target {target} outside buffer of {len} bytes")]
    OutOfRange { target: usize, len: usize },

    #[error("malformed {chunk} chunk: {reason}")]
    MalformedChunk { chunk: &'static str, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoxError {
    /// Shorthand for a `MalformedChunk` with a formatted reason.
    pub fn malformed(chunk: &'static str, reason: impl Into<String>) -> Self {
        VoxError::MalformedChunk {
            chunk,
            reason: reason.into(),
        }
    }
}
