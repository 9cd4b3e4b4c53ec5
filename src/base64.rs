//! bcrypt's base64 variant.
//!
//! ```text
//! ./         [A-Z]      [a-z]     [0-9]
//! 0x2e-0x2f, 0x41-0x5a, 0x61-0x7a, 0x30-0x39
//! ```
//!
//! Groups of 3 bytes become 4 characters. A trailing 1 or 2 bytes become 2 or
//! 3 characters; there is never any `=` padding.

use crate::error::DecodeError;

/// bcrypt's alphabet, in value order.
pub const ALPHABET: &[u8; 64] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const INVALID: u8 = 0xff;

static DECODE_TABLE: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Number of characters `encode` produces for `len` bytes.
pub const fn encoded_len(len: usize) -> usize {
    let rem = len % 3;
    len / 3 * 4 + if rem == 0 { 0 } else { rem + 1 }
}

/// Number of bytes `decode` produces for `len` characters, or `None` if no
/// encoding has that length.
pub const fn decoded_len(len: usize) -> Option<usize> {
    match len % 4 {
        1 => None,
        0 => Some(len / 4 * 3),
        rem => Some(len / 4 * 3 + rem - 1),
    }
}

/// Encodes bytes with the bcrypt alphabet.
pub fn encode(input: &[u8]) -> String {
    let mut output = String::with_capacity(encoded_len(input.len()));

    for chunk in input.chunks(3) {
        let b1 = u32::from(chunk[0]);
        let b2 = chunk.get(1).copied().map_or(0, u32::from);
        let b3 = chunk.get(2).copied().map_or(0, u32::from);

        let triple = (b1 << 16) | (b2 << 8) | b3;

        output.push(symbol(triple >> 18));
        output.push(symbol(triple >> 12));

        if chunk.len() > 1 {
            output.push(symbol(triple >> 6));
        }
        if chunk.len() > 2 {
            output.push(symbol(triple));
        }
    }

    output
}

fn symbol(sextet: u32) -> char {
    char::from(ALPHABET[(sextet & 0x3f) as usize])
}

/// Decodes bcrypt base64.
///
/// Low bits of a trailing partial group that do not complete a byte are
/// ignored, so several encodings can map to the same bytes.
pub fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    let input = input.as_ref();
    let len = decoded_len(input.len()).ok_or(DecodeError::InvalidLength(input.len()))?;
    let mut output = Vec::with_capacity(len);

    for (group, chunk) in input.chunks(4).enumerate() {
        let mut acc = 0_u32;

        for (i, &byte) in chunk.iter().enumerate() {
            let value = DECODE_TABLE[usize::from(byte)];
            if value == INVALID {
                return Err(DecodeError::InvalidByte {
                    offset: group * 4 + i,
                    byte,
                });
            }
            acc |= u32::from(value) << (18 - 6 * i);
        }

        let bytes = acc.to_be_bytes();
        output.extend_from_slice(&bytes[1..chunk.len()]);
    }

    Ok(output)
}
