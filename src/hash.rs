//! Murmur3 32-bit hash, the default hasher for byte-sequence keys.
//!
//! Non-cryptographic: deterministic for the same bytes and seed, with no
//! guarantee against adversarial inputs. Words are assembled little-endian
//! from individual bytes so the result does not depend on platform
//! endianness or buffer alignment.

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u32 = 0x0d00_0721;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const C3: u32 = 0xe654_6b64;
const C4: u32 = 0x85eb_ca6b;
const C5: u32 = 0xc2b2_ae35;

/// Mix one 4-byte word (or the zero-padded tail) into the running state.
#[inline]
fn mix_word(word: u32) -> u32 {
    word.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

/// Murmur3 32-bit hash of `bytes` with an explicit `seed`.
pub fn murmur3_32_with_seed(bytes: &[u8], seed: u32) -> u32 {
    let mut state = seed;

    let mut words = bytes.chunks_exact(4);
    for word in words.by_ref() {
        // chunks_exact(4) guarantees the 4-byte conversion succeeds.
        state ^= mix_word(u32::from_le_bytes(word.try_into().unwrap()));
        state = state.rotate_left(13).wrapping_mul(5).wrapping_add(C3);
    }

    // Trailing 1-3 bytes go through the same word mix once, with the
    // missing high bytes left zero.
    let tail = words.remainder();
    if !tail.is_empty() {
        let mut word: u32 = 0;
        for (i, &b) in tail.iter().enumerate() {
            word |= u32::from(b) << (8 * i);
        }
        state ^= mix_word(word);
    }

    // Finalize: fold in the length, then avalanche.
    state ^= bytes.len() as u32;
    state ^= state >> 16;
    state = state.wrapping_mul(C4);
    state ^= state >> 13;
    state = state.wrapping_mul(C5);
    state ^= state >> 16;
    state
}

/// Murmur3 32-bit hash of `bytes` with [`DEFAULT_SEED`].
#[inline]
pub fn murmur3_32(bytes: &[u8]) -> u32 {
    murmur3_32_with_seed(bytes, DEFAULT_SEED)
}

/// Convenience overload for string data.
#[inline]
pub fn murmur3_32_str(s: &str) -> u32 {
    murmur3_32(s.as_bytes())
}
