//! Error types for hashing, encoding and hash-string parsing.

use thiserror::Error;

use crate::{MAX_COST, MIN_COST, SALT_LEN};

/// Errors raised by the bcrypt base64 codec.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A byte outside `./A-Za-z0-9` was found.
    #[error("invalid character {byte:#04x} at offset {offset}")]
    InvalidByte {
        /// Position of the offending byte in the input.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// The input ends in a lone character, which cannot carry a full byte.
    #[error("invalid length {0}: a trailing group of one character holds no byte")]
    InvalidLength(usize),
}

/// Why a salt was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SaltError {
    /// The salt decoded to the wrong number of bytes.
    #[error("decoded to {0} bytes, expected {len}", len = SALT_LEN)]
    Length(usize),

    /// The salt is not valid bcrypt base64.
    #[error(transparent)]
    Encoding(#[from] DecodeError),
}

/// A bcrypt error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BcryptError {
    /// The cost is outside the supported range.
    #[error("invalid cost {0}: must be between {min} and {max}", min = MIN_COST, max = MAX_COST)]
    InvalidCost(u32),

    /// The encoded salt could not be turned into 16 bytes.
    #[error("invalid salt: {0}")]
    InvalidSalt(#[from] SaltError),

    /// Malformed bcrypt base64 outside of a salt.
    #[error("invalid bcrypt base64: {0}")]
    InvalidEncoding(#[from] DecodeError),

    /// A caller-supplied output buffer cannot hold the encoded digest.
    #[error("output buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        actual: usize,
    },

    /// A hash string does not have the `$2x$cc$<salt><digest>` shape.
    #[error("malformed hash string: {0}")]
    MalformedHash(String),

    /// A hash string names a version other than 2a, 2b or 2y.
    #[error("unsupported bcrypt version {0:?}")]
    UnsupportedVersion(String),

    /// An internal invariant was broken.
    #[error("internal error: {0}")]
    Internal(String),
}
