//! The bcrypt function: salt in, digest out.

use tracing::debug;
use zeroize::Zeroizing;

use crate::blowfish::CipherState;
use crate::eksblowfish;
use crate::error::BcryptError;
use crate::types::{Cost, Digest, Salt};
use crate::{DIGEST_ENCODED_LEN, DIGEST_LEN, MAX_KEY_LEN};

/// Plaintext encrypted by the final cipher state.
const MAGIC: [u8; 24] = *b"OrpheanBeholderScryDoubt";

/// Times each plaintext block is encrypted.
const MAGIC_ROUNDS: usize = 64;

/// Hashes a password with an encoded salt and returns the encoded digest.
///
/// `salt_b64` must be 22 bcrypt base64 characters. The result is always
/// [`DIGEST_ENCODED_LEN`] characters. Only the first 72 bytes of the password
/// take part; zero bytes are ordinary bytes.
///
/// ```
/// let digest = bcrypt_core::hash("abc", 6, "If6bvum7DFjUnE9p2uDeDu")?;
/// assert_eq!(digest, "0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i");
/// # Ok::<(), bcrypt_core::BcryptError>(())
/// ```
pub fn hash(
    password: impl AsRef<[u8]>,
    cost: u32,
    salt_b64: impl AsRef<[u8]>,
) -> Result<String, BcryptError> {
    let cost = Cost::new(cost)?;
    let salt = Salt::decode(salt_b64)?;
    Ok(hash_raw(password, cost, &salt)?.encode())
}

/// Like [`hash`], but writes the encoded digest into `out` and returns the
/// number of bytes written.
///
/// `out` must hold at least [`DIGEST_ENCODED_LEN`] bytes.
pub fn hash_into(
    password: impl AsRef<[u8]>,
    cost: u32,
    salt_b64: impl AsRef<[u8]>,
    out: &mut [u8],
) -> Result<usize, BcryptError> {
    let cost = Cost::new(cost)?;
    let salt = Salt::decode(salt_b64)?;

    if out.len() < DIGEST_ENCODED_LEN {
        return Err(BcryptError::BufferTooSmall {
            needed: DIGEST_ENCODED_LEN,
            actual: out.len(),
        });
    }

    let encoded = hash_raw(password, cost, &salt)?.encode();
    out[..encoded.len()].copy_from_slice(encoded.as_bytes());
    Ok(encoded.len())
}

/// Computes the raw 23-byte digest from validated inputs.
pub fn hash_raw(
    password: impl AsRef<[u8]>,
    cost: Cost,
    salt: &Salt,
) -> Result<Digest, BcryptError> {
    let password = password.as_ref();
    if password.len() > MAX_KEY_LEN {
        debug!(
            len = password.len(),
            "password longer than {MAX_KEY_LEN} bytes, trailing bytes ignored"
        );
    }

    // The key is the password (at most 72 bytes) followed by a NUL byte.
    let used = password.len().min(MAX_KEY_LEN);
    let mut key = Zeroizing::new([0u8; MAX_KEY_LEN + 1]);
    key[..used].copy_from_slice(&password[..used]);

    debug!(cost = cost.get(), "deriving bcrypt digest");
    let mut state = CipherState::new();
    eksblowfish::setup(&mut state, cost, salt, &key[..=used]);

    let mut ctext = MAGIC;
    for _ in 0..MAGIC_ROUNDS {
        state.encrypt_stream(&mut ctext)?;
    }

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&ctext[..DIGEST_LEN]);
    Ok(Digest::from_bytes(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, SaltError};

    const SALT: &str = "CCCCCCCCCCCCCCCCCCCCC.";

    fn bit_distance(a: &Digest, b: &Digest) -> u32 {
        a.as_bytes()
            .iter()
            .zip(b.as_bytes())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum()
    }

    #[test]
    fn test_basic_hashing() -> Result<(), BcryptError> {
        let digest = hash("U*U", 5, SALT)?;
        assert_eq!(digest, "E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW");
        assert_eq!(digest.len(), DIGEST_ENCODED_LEN);
        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<(), BcryptError> {
        let first = hash("password123", 4, SALT)?;
        let second = hash("password123", 4, SALT)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_invalid_cost_factors() {
        assert_eq!(hash("pw", 3, SALT), Err(BcryptError::InvalidCost(3)));
        assert_eq!(hash("pw", 32, SALT), Err(BcryptError::InvalidCost(32)));
        // Cost is checked before the salt is looked at.
        assert_eq!(hash("pw", 0, "!"), Err(BcryptError::InvalidCost(0)));
    }

    #[test]
    fn test_invalid_salts() {
        assert_eq!(
            hash("pw", 4, "CCCCCCCCCCCCCCCCCCCC"),
            Err(BcryptError::InvalidSalt(SaltError::Length(15)))
        );
        assert_eq!(
            hash("pw", 4, "CCCCCCCCCCCCCCCCCCCCCCCC"),
            Err(BcryptError::InvalidSalt(SaltError::Length(18)))
        );
        assert_eq!(
            hash("pw", 4, "CCCCCCCCCCCCCCCCCCCC+."),
            Err(BcryptError::InvalidSalt(SaltError::Encoding(
                DecodeError::InvalidByte {
                    offset: 20,
                    byte: b'+'
                }
            )))
        );
        assert!(matches!(
            hash("pw", 4, "CCCCCCCCCCCCCCCCCCCCC"),
            Err(BcryptError::InvalidSalt(SaltError::Encoding(
                DecodeError::InvalidLength(21)
            )))
        ));
    }

    #[test]
    fn test_hash_into() -> Result<(), BcryptError> {
        let mut out = [0u8; 64];
        let written = hash_into("U*U", 5, SALT, &mut out)?;
        assert_eq!(written, DIGEST_ENCODED_LEN);
        assert_eq!(&out[..written], b"E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW");
        assert!(out[written..].iter().all(|&b| b == 0));
        Ok(())
    }

    #[test]
    fn test_hash_into_small_buffer() {
        let mut out = [0u8; 30];
        assert_eq!(
            hash_into("U*U", 5, SALT, &mut out),
            Err(BcryptError::BufferTooSmall {
                needed: 31,
                actual: 30
            })
        );
    }

    #[test]
    fn test_password_truncated_at_72_bytes() -> Result<(), BcryptError> {
        let base = [b'x'; 72];
        let mut longer = base.to_vec();
        longer.extend_from_slice(b"yz");
        assert_eq!(hash(base, 4, SALT)?, hash(&longer, 4, SALT)?);
        assert_eq!(
            hash(base, 4, "If6bvum7DFjUnE9p2uDeDu")?,
            "b2EGDjVtZjqoykJDTnnEiBX3ycUPhDS"
        );
        Ok(())
    }

    #[test]
    fn test_difference_within_72_bytes_matters() -> Result<(), BcryptError> {
        let a = [b'x'; 72];
        let mut b = a;
        b[71] = b'y';
        assert_ne!(hash(a, 4, SALT)?, hash(b, 4, SALT)?);
        Ok(())
    }

    #[test]
    fn test_embedded_zero_bytes() -> Result<(), BcryptError> {
        let with_zero = hash(b"ab\0cd", 4, SALT)?;
        assert_eq!(with_zero, "dxJa8pLUqf6kOlh.2TR39QsOrz1CWvS");
        assert_eq!(hash(b"ab", 4, SALT)?, "ThcCpjPKXmu6XgQqJJEGokAiEUquQVe");
        Ok(())
    }

    #[test]
    fn test_salt_avalanche() -> Result<(), BcryptError> {
        let cost = Cost::new(4)?;
        let mut bytes = [0u8; 16];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let base = hash_raw("avalanche", cost, &Salt::from_bytes(bytes))?;
        assert_eq!(base.encode(), "eqwA3Uqkw2T/xa0rN6AcO8bQ.KeTwdm");

        for i in [0, 5, 10, 15] {
            let mut flipped = bytes;
            flipped[i] ^= 1;
            let other = hash_raw("avalanche", cost, &Salt::from_bytes(flipped))?;
            let distance = bit_distance(&base, &other);
            assert!(distance > 64, "flipping salt byte {i} changed only {distance} bits");
        }
        Ok(())
    }
}
