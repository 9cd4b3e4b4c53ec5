//! Validated inputs and outputs of a bcrypt computation.

use core::fmt;
use core::str::FromStr;

use rand::RngCore;

use crate::base64;
use crate::error::{BcryptError, SaltError};
use crate::{DEFAULT_COST, DIGEST_LEN, MAX_COST, MIN_COST, SALT_LEN};

// =============================================================================
// COST
// =============================================================================

/// A bcrypt work factor: the base-2 logarithm of the number of key schedule
/// rounds, between 4 and 31 inclusive.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Cost(u32);

impl Cost {
    /// Validates a cost. Out-of-range values are rejected, never clamped.
    pub fn new(cost: u32) -> Result<Self, BcryptError> {
        if (MIN_COST..=MAX_COST).contains(&cost) {
            Ok(Self(cost))
        } else {
            Err(BcryptError::InvalidCost(cost))
        }
    }

    /// The base-2 logarithm of the number of rounds.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The number of rounds, 2**cost.
    pub const fn rounds(self) -> u32 {
        1 << self.0
    }
}

impl Default for Cost {
    fn default() -> Self {
        Self(DEFAULT_COST)
    }
}

impl TryFrom<u32> for Cost {
    type Error = BcryptError;

    fn try_from(cost: u32) -> Result<Self, Self::Error> {
        Self::new(cost)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

// =============================================================================
// SALT
// =============================================================================

/// A 16-byte bcrypt salt.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Creates a salt from any 16 bytes.
    pub const fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Draws a salt from the thread-local CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Decodes a salt from 22 bcrypt base64 characters.
    pub fn decode(encoded: impl AsRef<[u8]>) -> Result<Self, SaltError> {
        let decoded = base64::decode(encoded)?;
        let bytes: [u8; SALT_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| SaltError::Length(decoded.len()))?;
        Ok(Self(bytes))
    }

    /// Encodes the salt as 22 bcrypt base64 characters.
    pub fn encode(&self) -> String {
        base64::encode(&self.0)
    }

    /// The raw salt bytes.
    pub const fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// The salt as four big-endian words.
    pub(crate) fn words(&self) -> [u32; 4] {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        words
    }
}

impl FromStr for Salt {
    type Err = SaltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// =============================================================================
// DIGEST
// =============================================================================

/// The 23-byte output of bcrypt.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub(crate) const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Decodes a digest from 31 bcrypt base64 characters.
    pub fn decode(encoded: impl AsRef<[u8]>) -> Result<Self, BcryptError> {
        let decoded = base64::decode(encoded)?;
        let bytes: [u8; DIGEST_LEN] = decoded.as_slice().try_into().map_err(|_| {
            BcryptError::MalformedHash(format!(
                "digest decodes to {} bytes, expected {DIGEST_LEN}",
                decoded.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Encodes the digest as 31 bcrypt base64 characters.
    pub fn encode(&self) -> String {
        base64::encode(&self.0)
    }

    /// The raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
