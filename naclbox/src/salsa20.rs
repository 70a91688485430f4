//! The Salsa20/20 core, its HSalsa20 variant, and the Salsa20 stream cipher.

use zeroize::Zeroize;

/// The length of a Salsa20 block, in bytes.
pub const BLOCK_LEN: usize = 64;

/// The length of the core's input (nonce and counter), in bytes.
pub const INPUT_LEN: usize = 16;

/// The length of a Salsa20 key, in bytes.
pub const KEY_LEN: usize = 32;

/// The length of a Salsa20 nonce, in bytes.
pub const NONCE_LEN: usize = 8;

/// The constant used with 256-bit keys.
pub const SIGMA: &[u8; 16] = b"expand 32-byte k";

const ROUNDS: usize = 20;

/// Computes one 64-byte Salsa20/20 block from a 16-byte input, a 32-byte key, and a 16-byte
/// constant.
///
/// The output is the permuted state added word-wise to the initial state.
#[must_use]
pub fn core(input: &[u8; INPUT_LEN], key: &[u8; KEY_LEN], constant: &[u8; 16]) -> [u8; BLOCK_LEN] {
    let j = load(input, key, constant);
    let mut x = j;
    permute(&mut x);

    let mut out = [0u8; BLOCK_LEN];
    for ((o, x), j) in out.chunks_exact_mut(4).zip(x).zip(j) {
        o.copy_from_slice(&x.wrapping_add(j).to_le_bytes());
    }
    x.zeroize();
    out
}

/// Computes the 32-byte HSalsa20 output used to derive sub-keys.
///
/// Runs the same 20 rounds as [`core`] but skips the final addition and returns words 0, 5, 10,
/// 15, 6, 7, 8, 9 of the permuted state.
#[must_use]
pub fn hsalsa20(input: &[u8; INPUT_LEN], key: &[u8; KEY_LEN], constant: &[u8; 16]) -> [u8; 32] {
    let mut x = load(input, key, constant);
    permute(&mut x);

    let mut out = [0u8; 32];
    for (o, i) in out.chunks_exact_mut(4).zip([0, 5, 10, 15, 6, 7, 8, 9]) {
        o.copy_from_slice(&x[i].to_le_bytes());
    }
    x.zeroize();
    out
}

/// Fills `out` with the Salsa20 keystream for `nonce` and `key`, starting at block 0.
pub fn stream(out: &mut [u8], nonce: &[u8; NONCE_LEN], key: &[u8; KEY_LEN]) {
    out.fill(0);
    xor_ic(out, nonce, 0, key);
}

/// XORs `in_out` with the Salsa20 keystream for `nonce` and `key`, starting at block `ic`.
///
/// The block counter is a little-endian 64-bit integer and wraps modulo 2^64.
pub fn xor_ic(in_out: &mut [u8], nonce: &[u8; NONCE_LEN], ic: u64, key: &[u8; KEY_LEN]) {
    let mut input = [0u8; INPUT_LEN];
    input[..NONCE_LEN].copy_from_slice(nonce);

    let mut counter = ic;
    for chunk in in_out.chunks_mut(BLOCK_LEN) {
        input[NONCE_LEN..].copy_from_slice(&counter.to_le_bytes());
        let mut block = core(&input, key, SIGMA);
        for (b, k) in chunk.iter_mut().zip(block.iter()) {
            *b ^= k;
        }
        block.zeroize();
        counter = counter.wrapping_add(1);
    }
}

fn load(input: &[u8; INPUT_LEN], key: &[u8; KEY_LEN], constant: &[u8; 16]) -> [u32; 16] {
    let word = |b: &[u8], i: usize| u32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]]);
    [
        word(constant, 0),
        word(key, 0),
        word(key, 4),
        word(key, 8),
        word(key, 12),
        word(constant, 4),
        word(input, 0),
        word(input, 4),
        word(input, 8),
        word(input, 12),
        word(constant, 8),
        word(key, 16),
        word(key, 20),
        word(key, 24),
        word(key, 28),
        word(constant, 12),
    ]
}

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

fn permute(x: &mut [u32; 16]) {
    for _ in 0..ROUNDS / 2 {
        // columns
        quarter_round(x, 0, 4, 8, 12);
        quarter_round(x, 5, 9, 13, 1);
        quarter_round(x, 10, 14, 2, 6);
        quarter_round(x, 15, 3, 7, 11);

        // rows
        quarter_round(x, 0, 1, 2, 3);
        quarter_round(x, 5, 6, 7, 4);
        quarter_round(x, 10, 11, 8, 9);
        quarter_round(x, 15, 12, 13, 14);
    }
}
