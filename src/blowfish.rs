//! The Blowfish block cipher, encryption direction only.
//!
//! Blowfish is a 16-round Feistel network over 64-bit blocks. Its key lives in
//! the cipher state itself: 18 subkeys (the P-array) and four 256-entry
//! substitution tables (the S-boxes), which the key schedule rewrites.

use zeroize::Zeroize;

use crate::constants::{P_INIT, S_INIT};
use crate::error::BcryptError;

/// Number of Feistel rounds.
const ROUNDS: usize = 16;

/// Size of a Blowfish block in bytes.
pub const BLOCK_LEN: usize = 8;

/// Mutable Blowfish key state.
///
/// Each hash computation owns one. The state is wiped when dropped.
#[derive(Clone)]
pub struct CipherState {
    pub(crate) p: [u32; ROUNDS + 2],
    pub(crate) s: [[u32; 256]; 4],
}

impl CipherState {
    /// A state holding the initialization constants.
    pub fn new() -> Self {
        Self {
            p: P_INIT,
            s: S_INIT,
        }
    }

    /// Restores the initialization constants.
    pub fn reset(&mut self) {
        self.p = P_INIT;
        self.s = S_INIT;
    }

    fn f(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();
        let h = self.s[0][usize::from(a)].wrapping_add(self.s[1][usize::from(b)]);
        (h ^ self.s[2][usize::from(c)]).wrapping_add(self.s[3][usize::from(d)])
    }

    /// Encrypts one block given as its big-endian halves.
    pub fn encrypt_block(&self, mut left: u32, mut right: u32) -> (u32, u32) {
        for i in (0..ROUNDS).step_by(2) {
            left ^= self.p[i];
            right ^= self.f(left);
            right ^= self.p[i + 1];
            left ^= self.f(right);
        }

        left ^= self.p[ROUNDS];
        right ^= self.p[ROUNDS + 1];

        (right, left)
    }

    /// Encrypts `buffer` in place as consecutive 8-byte blocks.
    pub fn encrypt_stream(&self, buffer: &mut [u8]) -> Result<(), BcryptError> {
        if buffer.len() % BLOCK_LEN != 0 {
            return Err(BcryptError::Internal(format!(
                "stream of {} bytes is not a whole number of blocks",
                buffer.len()
            )));
        }

        for block in buffer.chunks_exact_mut(BLOCK_LEN) {
            let left = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
            let right = u32::from_be_bytes([block[4], block[5], block[6], block[7]]);
            let (left, right) = self.encrypt_block(left, right);
            block[..4].copy_from_slice(&left.to_be_bytes());
            block[4..].copy_from_slice(&right.to_be_bytes());
        }

        Ok(())
    }

    #[cfg(test)]
    fn decrypt_block(&self, mut left: u32, mut right: u32) -> (u32, u32) {
        for i in (1..=ROUNDS / 2).rev() {
            left ^= self.p[2 * i + 1];
            right ^= self.f(left);
            right ^= self.p[2 * i];
            left ^= self.f(right);
        }

        left ^= self.p[1];
        right ^= self.p[0];

        (right, left)
    }
}

impl Default for CipherState {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        self.p.zeroize();
        self.s.zeroize();
    }
}
