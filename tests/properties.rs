//! Property-based tests for the codec and the hash function.
//!
//! Hashing runs the full key schedule, so hash properties use the minimum cost
//! and a reduced number of cases.

use bcrypt_core::{
    base64, hash, hash_raw, BcryptError, Cost, Salt, SaltError, MAX_COST, MIN_COST,
};
use proptest::prelude::*;

proptest! {
    /// Encoding then decoding any byte string gives it back.
    #[test]
    fn prop_codec_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let encoded = base64::encode(&bytes);
        prop_assert_eq!(encoded.len(), base64::encoded_len(bytes.len()));
        prop_assert_eq!(base64::decode(&encoded).unwrap(), bytes);
    }

    /// Every salt survives a trip through its 22-character form.
    #[test]
    fn prop_salt_round_trip(bytes in any::<[u8; 16]>()) {
        let salt = Salt::from_bytes(bytes);
        let encoded = salt.encode();
        prop_assert_eq!(encoded.len(), 22);
        prop_assert_eq!(Salt::decode(&encoded).unwrap(), salt);
    }

    /// Any byte outside the alphabet is rejected by salt decoding.
    #[test]
    fn prop_salt_rejects_foreign_bytes(
        position in 0usize..22,
        byte in any::<u8>().prop_filter("outside alphabet", |b| !base64::ALPHABET.contains(b)),
    ) {
        let mut encoded = *b"CCCCCCCCCCCCCCCCCCCCC.";
        encoded[position] = byte;
        prop_assert!(matches!(
            hash("pw", MIN_COST, encoded),
            Err(BcryptError::InvalidSalt(SaltError::Encoding(_)))
        ));
    }

    /// Out-of-range costs are rejected whatever the other inputs are.
    #[test]
    fn prop_invalid_cost_rejected(
        cost in prop_oneof![0u32..MIN_COST, (MAX_COST + 1)..=u32::MAX],
        password in any::<Vec<u8>>(),
    ) {
        prop_assert_eq!(
            hash(&password, cost, "CCCCCCCCCCCCCCCCCCCCC."),
            Err(BcryptError::InvalidCost(cost))
        );
    }

    /// Salts that do not decode to exactly 16 bytes are rejected.
    #[test]
    fn prop_wrong_salt_length_rejected(len in (0usize..40).prop_filter("valid lengths", |l| *l != 22 && l % 4 != 1)) {
        let encoded = "C".repeat(len);
        prop_assert!(matches!(
            hash("pw", MIN_COST, &encoded),
            Err(BcryptError::InvalidSalt(SaltError::Length(_)))
        ));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Identical inputs give identical digests.
    #[test]
    fn prop_deterministic(password in any::<Vec<u8>>(), salt in any::<[u8; 16]>()) {
        let cost = Cost::new(MIN_COST).unwrap();
        let salt = Salt::from_bytes(salt);
        prop_assert_eq!(
            hash_raw(&password, cost, &salt).unwrap(),
            hash_raw(&password, cost, &salt).unwrap()
        );
    }

    /// Bytes past the 72nd never change the digest.
    #[test]
    fn prop_truncated_after_72_bytes(
        prefix in any::<[u8; 72]>(),
        tail_a in proptest::collection::vec(any::<u8>(), 0..32),
        tail_b in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut a = prefix.to_vec();
        a.extend_from_slice(&tail_a);
        let mut b = prefix.to_vec();
        b.extend_from_slice(&tail_b);
        prop_assert_eq!(
            hash(&a, MIN_COST, "CCCCCCCCCCCCCCCCCCCCC.").unwrap(),
            hash(&b, MIN_COST, "CCCCCCCCCCCCCCCCCCCCC.").unwrap()
        );
    }

    /// A change inside the first 72 bytes changes the digest.
    #[test]
    fn prop_prefix_change_alters_digest(
        password in proptest::collection::vec(any::<u8>(), 1..72),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let mut other = password.clone();
        let i = index.index(password.len());
        other[i] ^= flip;
        prop_assert_ne!(
            hash(&password, MIN_COST, "CCCCCCCCCCCCCCCCCCCCC.").unwrap(),
            hash(&other, MIN_COST, "CCCCCCCCCCCCCCCCCCCCC.").unwrap()
        );
    }
}
