//! The expensive key schedule ("EksBlowfish").
//!
//! Plain Blowfish keys its state once. bcrypt keys it with the password and
//! salt together, then alternately re-keys it with the password alone and the
//! salt alone 2**cost times.

use tracing::trace;

use crate::blowfish::CipherState;
use crate::types::{Cost, Salt};

/// Yields the bytes of a key, cycling forever.
struct KeyCycle<'a> {
    key: &'a [u8],
    index: usize,
}

impl<'a> KeyCycle<'a> {
    fn new(key: &'a [u8]) -> Self {
        Self { key, index: 0 }
    }

    fn next_word(&mut self) -> u32 {
        let mut word = 0u32;
        for _ in 0..4 {
            if self.index == self.key.len() {
                self.index = 0;
            }
            word = (word << 8) | u32::from(self.key[self.index]);
            self.index += 1;
        }
        word
    }
}

fn xor_key(state: &mut CipherState, key: &[u8]) {
    if key.is_empty() {
        return;
    }

    let mut cycle = KeyCycle::new(key);
    for subkey in &mut state.p {
        *subkey ^= cycle.next_word();
    }
}

/// Rewrites the P-array and S-boxes by repeatedly encrypting a running block.
///
/// Before each encryption the next two words of `data` are XORed into the
/// block, cycling through `data`.
fn expand_state(state: &mut CipherState, data: &[u32; 4]) {
    let mut left = 0u32;
    let mut right = 0u32;
    let mut j = 0;

    for i in (0..state.p.len()).step_by(2) {
        left ^= data[j];
        right ^= data[j + 1];
        j = (j + 2) % 4;
        (left, right) = state.encrypt_block(left, right);
        state.p[i] = left;
        state.p[i + 1] = right;
    }

    for b in 0..4 {
        for k in (0..256).step_by(2) {
            left ^= data[j];
            right ^= data[j + 1];
            j = (j + 2) % 4;
            (left, right) = state.encrypt_block(left, right);
            state.s[b][k] = left;
            state.s[b][k + 1] = right;
        }
    }
}

/// Standard Blowfish key expansion: XOR the cycled key into the P-array, then
/// re-derive the whole state from an all-zero running block.
pub fn expand_key(state: &mut CipherState, key: &[u8]) {
    xor_key(state, key);
    expand_state(state, &[0; 4]);
}

/// Key expansion that also mixes the salt into the running block before every
/// encryption.
pub fn expand_key_with_salt(state: &mut CipherState, key: &[u8], salt: &Salt) {
    xor_key(state, key);
    expand_state(state, &salt.words());
}

/// Derives the final cipher state for `key` and `salt`.
///
/// The state is reset first, so any previous contents are irrelevant. Inside
/// the cost loop the salt is used only as key material, on every other
/// expansion; this matches reference bcrypt and must not be changed.
pub fn setup(state: &mut CipherState, cost: Cost, salt: &Salt, key: &[u8]) {
    state.reset();
    expand_key_with_salt(state, key, salt);

    let rounds = cost.rounds();
    trace!(rounds, "running expensive key schedule");
    for _ in 0..rounds {
        expand_key(state, key);
        expand_key(state, salt.as_bytes());
    }
}
