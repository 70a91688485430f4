//! The Poly1305 one-time authenticator.
//!
//! The accumulator and `r` are 17 little-endian limbs of radix 2^8. Reduction uses
//! 2^130 ≡ 5 (mod 2^130-5), which at limb 16 of a product becomes a factor of 5·2^6 = 320.

use zeroize::Zeroize;

use crate::verify::verify_16;
use crate::{Error, TAG_LEN};

/// The length of a one-time Poly1305 key, in bytes.
pub const KEY_LEN: usize = 32;

const LIMBS: usize = 17;

/// 2^136 - (2^130 - 5). Adding it subtracts the modulus modulo 2^136.
const MINUS_P: [u32; LIMBS] = [5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 252];

/// Returns the 16-byte Poly1305 tag of `message` under the one-time `key`.
///
/// The first half of the key is `r`, clamped before use; the second half is `s`, added to the
/// final accumulator. A key must never authenticate two different messages.
#[must_use]
pub fn authenticate(message: &[u8], key: &[u8; KEY_LEN]) -> [u8; TAG_LEN] {
    let mut r = [0u32; LIMBS];
    for (r, &k) in r.iter_mut().zip(&key[..16]) {
        *r = u32::from(k);
    }
    r[3] &= 15;
    r[4] &= 252;
    r[7] &= 15;
    r[8] &= 252;
    r[11] &= 15;
    r[12] &= 252;
    r[15] &= 15;

    let mut h = [0u32; LIMBS];
    for block in message.chunks(16) {
        // Each block is read as a little-endian integer with a 1 byte appended.
        let mut c = [0u32; LIMBS];
        for (c, &b) in c.iter_mut().zip(block) {
            *c = u32::from(b);
        }
        c[block.len()] = 1;
        add(&mut h, &c);
        mul_mod(&mut h, &r);
    }

    freeze(&mut h);

    let mut s = [0u32; LIMBS];
    for (s, &k) in s.iter_mut().zip(&key[16..]) {
        *s = u32::from(k);
    }
    add(&mut h, &s);

    let mut tag = [0u8; TAG_LEN];
    for (t, &h) in tag.iter_mut().zip(&h) {
        *t = h as u8;
    }

    r.zeroize();
    h.zeroize();
    s.zeroize();

    tag
}

/// Checks `tag` against the Poly1305 tag of `message` under `key` in constant time.
///
/// # Errors
///
/// Returns [`Error::AuthenticationFailure`] if the tags differ in any byte.
pub fn verify(tag: &[u8; TAG_LEN], message: &[u8], key: &[u8; KEY_LEN]) -> Result<(), Error> {
    let expected = authenticate(message, key);
    if verify_16(tag, &expected) {
        Ok(())
    } else {
        Err(Error::AuthenticationFailure)
    }
}

fn add(h: &mut [u32; LIMBS], c: &[u32; LIMBS]) {
    let mut u = 0u32;
    for (h, &c) in h.iter_mut().zip(c) {
        u += *h + c;
        *h = u & 255;
        u >>= 8;
    }
}

fn squeeze(h: &mut [u32; LIMBS]) {
    let mut u = 0u32;
    for h in &mut h[..16] {
        u += *h;
        *h = u & 255;
        u >>= 8;
    }
    u += h[16];
    h[16] = u & 3;
    u = 5 * (u >> 2);
    for h in &mut h[..16] {
        u += *h;
        *h = u & 255;
        u >>= 8;
    }
    h[16] += u;
}

/// Reduces `h` to `[0, 2^130-5)` without branching on its value.
fn freeze(h: &mut [u32; LIMBS]) {
    let orig = *h;
    add(h, &MINUS_P);
    let negative = (h[16] >> 7).wrapping_neg();
    for (h, &orig) in h.iter_mut().zip(&orig) {
        *h ^= negative & (orig ^ *h);
    }
}

fn mul_mod(h: &mut [u32; LIMBS], r: &[u32; LIMBS]) {
    let mut hr = [0u32; LIMBS];
    for (i, o) in hr.iter_mut().enumerate() {
        let mut u = 0u32;
        for j in 0..=i {
            u += h[j] * r[i - j];
        }
        for j in i + 1..LIMBS {
            u += 320 * h[j] * r[i + LIMBS - j];
        }
        *o = u;
    }
    *h = hr;
    squeeze(h);
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use expect_test::expect;

    use super::*;

    fn setup() -> ([u8; KEY_LEN], Vec<u8>) {
        let key = *b"this is 32-byte key for Poly1305";
        let message = b"Cryptographic Forum Research Group".to_vec();
        (key, message)
    }

    #[test]
    fn rfc8439_vector() {
        let key = hex::decode("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b")
            .expect("should be valid hex");
        let key: [u8; KEY_LEN] = key.try_into().expect("should be 32 bytes");
        let tag = authenticate(b"Cryptographic Forum Research Group", &key);
        expect!["a8061dc1305136c6c22b8baf0c0127a9"].assert_eq(&hex::encode(tag));
    }

    #[test]
    fn empty_message_is_s() {
        let (key, _) = setup();
        assert_eq!(key[16..], authenticate(b"", &key));
    }

    /// Builds a key from hex-encoded `r` and `s` halves.
    fn key(r: &str, s: &str) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        hex::decode_to_slice(r, &mut key[..16]).expect("should be valid hex");
        hex::decode_to_slice(s, &mut key[16..]).expect("should be valid hex");
        key
    }

    fn tag_hex(message: &str, key: &[u8; KEY_LEN]) -> String {
        hex::encode(authenticate(&hex::decode(message).expect("should be valid hex"), key))
    }

    const ZERO: &str = "00000000000000000000000000000000";
    const R1: &str = "01000000000000000000000000000000";
    const R2: &str = "02000000000000000000000000000000";

    #[test]
    fn accumulator_wraps_past_modulus() {
        // (2^129 - 1) · 2 = 2^130 - 2, which lies in [p, 2^130).
        let tag = tag_hex("ffffffffffffffffffffffffffffffff", &key(R2, ZERO));
        expect!["03000000000000000000000000000000"].assert_eq(&tag);
    }

    #[test]
    fn tag_addition_wraps_mod_2_128() {
        let tag = tag_hex(
            "02000000000000000000000000000000",
            &key(R2, "ffffffffffffffffffffffffffffffff"),
        );
        expect!["03000000000000000000000000000000"].assert_eq(&tag);
    }

    #[test]
    fn final_reduction_to_small_value() {
        let tag = tag_hex(
            "ffffffffffffffffffffffffffffffff\
             f0ffffffffffffffffffffffffffffff\
             11000000000000000000000000000000",
            &key(R1, ZERO),
        );
        expect!["05000000000000000000000000000000"].assert_eq(&tag);
    }

    #[test]
    fn final_reduction_to_zero() {
        let tag = tag_hex(
            "ffffffffffffffffffffffffffffffff\
             fbfefefefefefefefefefefefefefefe\
             01010101010101010101010101010101",
            &key(R1, ZERO),
        );
        expect!["00000000000000000000000000000000"].assert_eq(&tag);
    }

    #[test]
    fn h_just_below_modulus() {
        let tag = tag_hex("fdffffffffffffffffffffffffffffff", &key(R2, ZERO));
        expect!["faffffffffffffffffffffffffffffff"].assert_eq(&tag);
    }

    #[test]
    fn large_r_carries() {
        let r = "01000000000000000400000000000000";
        let message = "e33594d7505e43b90000000000000000\
                       3394d7505e4379cd0100000000000000\
                       00000000000000000000000000000000";
        expect!["13000000000000000000000000000000"].assert_eq(&tag_hex(message, &key(r, ZERO)));

        let message = format!("{message}01000000000000000000000000000000");
        expect!["14000000000000005500000000000000"].assert_eq(&tag_hex(&message, &key(r, ZERO)));
    }

    #[test]
    fn round_trip() {
        let (key, message) = setup();
        let tag = authenticate(&message, &key);
        assert_matches!(verify(&tag, &message, &key), Ok(()));
    }

    #[test]
    fn wrong_message() {
        let (key, mut message) = setup();
        let tag = authenticate(&message, &key);
        message[0] ^= 1;
        assert_matches!(verify(&tag, &message, &key), Err(Error::AuthenticationFailure));
    }

    #[test]
    fn flip_every_bit() {
        let (key, message) = setup();
        let tag = authenticate(&message, &key);

        for i in 0..tag.len() {
            for j in 0u8..8 {
                let mut tag = tag;
                tag[i] ^= 1 << j;
                assert!(
                    verify(&tag, &message, &key).is_err(),
                    "bit flip at byte {i}, bit {j} produced a valid tag"
                );
            }
        }
    }
}
