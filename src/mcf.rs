//! Full bcrypt hash strings (`$2b$12$<salt><digest>`) and verification.

use core::fmt;
use core::str::FromStr;

use subtle::ConstantTimeEq;
use tracing::{debug, instrument};

use crate::bcrypt::hash_raw;
use crate::error::BcryptError;
use crate::types::{Cost, Digest, Salt};
use crate::{DIGEST_ENCODED_LEN, SALT_ENCODED_LEN};

/// Length of a complete hash string.
pub const HASH_STRING_LEN: usize = 7 + SALT_ENCODED_LEN + DIGEST_ENCODED_LEN;

/// bcrypt version tags. They differ only in how historical implementations
/// treated their inputs; the digest computed here is the same for all three.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Version {
    /// `$2a$`
    TwoA,
    /// `$2b$`
    #[default]
    TwoB,
    /// `$2y$`
    TwoY,
}

impl Version {
    /// The tag as it appears between the first two `$`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TwoA => "2a",
            Self::TwoB => "2b",
            Self::TwoY => "2y",
        }
    }
}

impl FromStr for Version {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2a" => Ok(Self::TwoA),
            "2b" => Ok(Self::TwoB),
            "2y" => Ok(Self::TwoY),
            other => Err(BcryptError::UnsupportedVersion(other.to_string())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed hash string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HashParts {
    /// Version tag.
    pub version: Version,
    /// Work factor.
    pub cost: Cost,
    /// Salt.
    pub salt: Salt,
    /// Digest.
    pub digest: Digest,
}

impl FromStr for HashParts {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.starts_with('$') {
            return Err(BcryptError::MalformedHash("hash string too short".into()));
        }

        let parts: Vec<&str> = s.splitn(4, '$').collect();
        if parts.len() != 4 || !parts[0].is_empty() {
            return Err(BcryptError::MalformedHash("missing '$' separators".into()));
        }

        if parts[1].len() != 2 || !parts[1].starts_with('2') {
            return Err(BcryptError::MalformedHash(format!(
                "invalid prefix {:?}",
                parts[1]
            )));
        }
        let version: Version = parts[1].parse()?;

        // Always two ASCII digits.
        let cost = match parts[2].as_bytes() {
            [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
                u32::from(a - b'0') * 10 + u32::from(b - b'0')
            }
            _ => {
                return Err(BcryptError::MalformedHash(format!(
                    "invalid cost field {:?}",
                    parts[2]
                )))
            }
        };
        let cost = Cost::new(cost)?;

        let rest = parts[3];
        if rest.len() != SALT_ENCODED_LEN + DIGEST_ENCODED_LEN {
            return Err(BcryptError::MalformedHash(format!(
                "salt and digest are {} characters, expected {}",
                rest.len(),
                SALT_ENCODED_LEN + DIGEST_ENCODED_LEN
            )));
        }
        let (salt, digest) = rest.as_bytes().split_at(SALT_ENCODED_LEN);

        Ok(Self {
            version,
            cost,
            salt: Salt::decode(salt)?,
            digest: Digest::decode(digest)?,
        })
    }
}

impl fmt::Display for HashParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${}${}{}",
            self.version, self.cost, self.salt, self.digest
        )
    }
}

/// A hasher bound to one cost and salt.
#[derive(Clone, Debug)]
pub struct Bcrypt {
    cost: Cost,
    salt: Salt,
}

impl Bcrypt {
    /// Validates `cost` and binds it to `salt`.
    pub fn new(cost: u32, salt: Salt) -> Result<Self, BcryptError> {
        Ok(Self {
            cost: Cost::new(cost)?,
            salt,
        })
    }

    /// A hasher with a fresh random salt.
    pub fn with_random_salt(cost: u32) -> Result<Self, BcryptError> {
        Self::new(cost, Salt::random())
    }

    /// Hashes `password` into a complete `$2b$` hash string.
    pub fn hash(&self, password: impl AsRef<[u8]>) -> Result<String, BcryptError> {
        let digest = hash_raw(password, self.cost, &self.salt)?;
        Ok(HashParts {
            version: Version::TwoB,
            cost: self.cost,
            salt: self.salt,
            digest,
        }
        .to_string())
    }

    /// Checks `password` against a hash string made by this hasher.
    ///
    /// A hash string with a different cost or salt never matches.
    pub fn verify(&self, password: impl AsRef<[u8]>, hashed: &str) -> Result<bool, BcryptError> {
        let parts: HashParts = hashed.parse()?;
        if parts.cost != self.cost || parts.salt != self.salt {
            debug!("hash string was not made with this hasher's cost and salt");
            return Ok(false);
        }
        digests_match(password, &parts)
    }
}

/// Hashes `password` with a random salt into a complete hash string.
pub fn hash_password(password: impl AsRef<[u8]>, cost: u32) -> Result<String, BcryptError> {
    Bcrypt::with_random_salt(cost)?.hash(password)
}

/// Checks `password` against a hash string. The digests are compared in
/// constant time.
#[instrument(skip_all)]
pub fn verify(password: impl AsRef<[u8]>, hashed: &str) -> Result<bool, BcryptError> {
    let parts: HashParts = hashed.parse()?;
    let matched = digests_match(password, &parts)?;

    debug!(version = %parts.version, cost = parts.cost.get(), matched, "verified password");
    Ok(matched)
}

/// Recomputes the digest with the parsed cost and salt and compares the raw
/// 23 bytes in constant time. Unused trailing bits of the stored encoding do
/// not take part.
fn digests_match(password: impl AsRef<[u8]>, parts: &HashParts) -> Result<bool, BcryptError> {
    let computed = hash_raw(password, parts.cost, &parts.salt)?;
    Ok(computed.as_bytes()[..]
        .ct_eq(&parts.digest.as_bytes()[..])
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaltError;

    const ABC_HASH: &str = "$2a$06$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i";

    #[test]
    fn test_parse_and_format() -> Result<(), BcryptError> {
        let parts: HashParts = ABC_HASH.parse()?;
        assert_eq!(parts.version, Version::TwoA);
        assert_eq!(parts.cost.get(), 6);
        assert_eq!(parts.salt.encode(), "If6bvum7DFjUnE9p2uDeDu");
        assert_eq!(parts.digest.encode(), "0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i");
        assert_eq!(parts.to_string(), ABC_HASH);
        assert_eq!(ABC_HASH.len(), HASH_STRING_LEN);
        Ok(())
    }

    #[test]
    fn test_basic_hashing() -> Result<(), BcryptError> {
        let bcrypt = Bcrypt::new(4, Salt::random())?;
        let hash = bcrypt.hash("password123")?;
        assert!(hash.starts_with("$2b$04$"));
        assert_eq!(hash.len(), HASH_STRING_LEN);
        Ok(())
    }

    #[test]
    fn test_password_verification() -> Result<(), BcryptError> {
        let bcrypt = Bcrypt::new(4, Salt::random())?;

        let password = "test_password";
        let hash = bcrypt.hash(password)?;

        assert!(bcrypt.verify(password, &hash)?);
        assert!(!bcrypt.verify("wrong_password", &hash)?);

        Ok(())
    }

    #[test]
    fn test_hasher_rejects_foreign_hash_strings() -> Result<(), BcryptError> {
        let salt = Salt::decode("If6bvum7DFjUnE9p2uDeDu")?;

        assert!(Bcrypt::new(6, salt)?.verify("abc", ABC_HASH)?);
        // Right password, but the hash was made with another cost or salt.
        assert!(!Bcrypt::new(7, salt)?.verify("abc", ABC_HASH)?);
        assert!(!Bcrypt::new(6, Salt::from_bytes([0; 16]))?.verify("abc", ABC_HASH)?);
        // The free function takes cost and salt from the string itself.
        assert!(verify("abc", ABC_HASH)?);
        Ok(())
    }

    #[test]
    fn test_verify_ignores_unused_trailing_bits() -> Result<(), BcryptError> {
        // 'i' and 'j' differ only in the two bits past the 23rd byte.
        let noncanonical = format!("{}j", &ABC_HASH[..ABC_HASH.len() - 1]);
        assert!(verify("abc", &noncanonical)?);
        assert!(!verify("abd", &noncanonical)?);
        Ok(())
    }

    #[test]
    fn test_verify_known_hash_all_versions() -> Result<(), BcryptError> {
        for version in ["2a", "2b", "2y"] {
            let hashed = ABC_HASH.replacen("2a", version, 1);
            assert!(verify("abc", &hashed)?);
            assert!(!verify("abd", &hashed)?);
        }
        Ok(())
    }

    #[test]
    fn test_hash_password_uses_fresh_salts() -> Result<(), BcryptError> {
        let a = hash_password("secret", 4)?;
        let b = hash_password("secret", 4)?;
        assert_ne!(a, b);
        assert!(verify("secret", &a)?);
        assert!(verify("secret", &b)?);
        Ok(())
    }

    #[test]
    fn test_invalid_cost_factors() {
        assert!(Bcrypt::new(3, Salt::random()).is_err());
        assert!(Bcrypt::new(32, Salt::random()).is_err());
        assert!(Bcrypt::new(4, Salt::random()).is_ok());
        assert!(Bcrypt::new(31, Salt::random()).is_ok());
    }

    #[test]
    fn test_malformed_hashes() {
        let malformed = [
            "",
            "$2",
            "2a$06$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i",
            "$3a$06$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i",
            "$2a$6$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i",
            "$2a$06$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0",
            "$2a$06If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i",
        ];
        for hashed in malformed {
            assert!(
                matches!(
                    hashed.parse::<HashParts>(),
                    Err(BcryptError::MalformedHash(_))
                ),
                "{hashed:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_field_errors() {
        assert_eq!(
            "$2x$06$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i".parse::<HashParts>(),
            Err(BcryptError::UnsupportedVersion("2x".into()))
        );
        assert_eq!(
            "$2a$03$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i".parse::<HashParts>(),
            Err(BcryptError::InvalidCost(3))
        );
        assert!(matches!(
            "$2a$06$If6bvum7DFjUnE9p2uDe+u0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i".parse::<HashParts>(),
            Err(BcryptError::InvalidSalt(SaltError::Encoding(_)))
        ));
        assert!(matches!(
            "$2a$06$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0*".parse::<HashParts>(),
            Err(BcryptError::InvalidEncoding(_))
        ));
    }
}
