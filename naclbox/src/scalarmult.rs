//! X25519 scalar multiplication over the Montgomery form of Curve25519.

use zeroize::Zeroize;

use crate::field::FieldElement;

/// The length of a scalar, in bytes.
pub const SCALAR_LEN: usize = 32;

/// The length of an encoded point (its u-coordinate), in bytes.
pub const POINT_LEN: usize = 32;

/// The u-coordinate of the standard base point.
pub const BASE_POINT: [u8; POINT_LEN] = {
    let mut b = [0u8; POINT_LEN];
    b[0] = 9;
    b
};

/// Multiplies the point with u-coordinate `point` by the clamped `scalar`.
///
/// The scalar is clamped (low three bits cleared, bit 255 cleared, bit 254 set) before use. The
/// point is used as-is: all 256 bits are loaded and low-order points are not rejected, so a
/// low-order input yields a low-order (often all-zero) output. Runs in time independent of both
/// inputs.
#[must_use]
pub fn scalarmult(scalar: &[u8; SCALAR_LEN], point: &[u8; POINT_LEN]) -> [u8; POINT_LEN] {
    let mut k = clamp(scalar);
    let u = FieldElement::from_bytes(point);

    let (mut x2, mut z2) = (FieldElement::ONE, FieldElement::ZERO);
    let (mut x3, mut z3) = (u, FieldElement::ONE);

    for pos in (0..255).rev() {
        let bit = u32::from((k[pos / 8] >> (pos & 7)) & 1);

        FieldElement::conditional_swap(&mut x2, &mut x3, bit);
        FieldElement::conditional_swap(&mut z2, &mut z3, bit);

        let a = x2 + z2;
        let b = x2 - z2;
        let c = x3 + z3;
        let d = x3 - z3;

        let aa = a.square();
        let bb = b.square();
        let da = c * b;
        let cb = d * a;

        let sum = da + cb;
        let diff = da - cb;
        let e = aa - bb;

        x2 = aa * bb;
        z2 = e * (e.mul121665() + aa);
        x3 = sum.square();
        z3 = diff.square() * u;

        FieldElement::conditional_swap(&mut x2, &mut x3, bit);
        FieldElement::conditional_swap(&mut z2, &mut z3, bit);
    }

    k.zeroize();

    (x2 * z2.reciprocal()).to_bytes()
}

/// Multiplies the standard base point by the clamped `scalar`.
#[must_use]
pub fn scalarmult_base(scalar: &[u8; SCALAR_LEN]) -> [u8; POINT_LEN] {
    scalarmult(scalar, &BASE_POINT)
}

fn clamp(scalar: &[u8; SCALAR_LEN]) -> [u8; SCALAR_LEN] {
    let mut e = *scalar;
    e[0] &= 248;
    e[31] &= 127;
    e[31] |= 64;
    e
}
