//! # bcrypt-core
//!
//! bcrypt password hashing, built from scratch: a Blowfish block cipher, the
//! expensive salted key schedule on top of it, and bcrypt's own base64
//! alphabet. Output is byte-for-byte compatible with reference bcrypt.
//!
//! ```rust
//! // The core primitive: password, cost, encoded salt -> encoded digest.
//! let digest = bcrypt_core::hash("U*U", 5, "CCCCCCCCCCCCCCCCCCCCC.")?;
//! assert_eq!(digest, "E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW");
//!
//! // Complete hash strings with a random salt.
//! let hashed = bcrypt_core::hash_password("hunter2", 4)?;
//! assert!(bcrypt_core::verify("hunter2", &hashed)?);
//! # Ok::<(), bcrypt_core::BcryptError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod base64;
mod bcrypt;
pub mod blowfish;
mod constants;
pub mod eksblowfish;
mod error;
pub mod mcf;
mod types;

// =============================================================================
// EXPORTS
// =============================================================================

pub use bcrypt::{hash, hash_into, hash_raw};
pub use error::{BcryptError, DecodeError, SaltError};
pub use mcf::{hash_password, verify, Bcrypt, HashParts, Version};
pub use types::{Cost, Digest, Salt};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Smallest accepted cost.
pub const MIN_COST: u32 = 4;

/// Largest accepted cost.
pub const MAX_COST: u32 = 31;

/// Cost used when none is given.
pub const DEFAULT_COST: u32 = 10;

/// Password bytes that take part in the hash; the rest are ignored.
pub const MAX_KEY_LEN: usize = 72;

/// Raw salt size.
pub const SALT_LEN: usize = 16;

/// Encoded salt size.
pub const SALT_ENCODED_LEN: usize = base64::encoded_len(SALT_LEN);

/// Raw digest size.
pub const DIGEST_LEN: usize = 23;

/// Encoded digest size.
pub const DIGEST_ENCODED_LEN: usize = base64::encoded_len(DIGEST_LEN);
