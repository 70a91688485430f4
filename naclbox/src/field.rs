//! Arithmetic modulo 2^255-19.
//!
//! Elements are 32 little-endian limbs of radix 2^8 held in `u32`s. Limbs 0..31 are kept below
//! 2^8 and the top limb is allowed to grow slightly past 2^7; every multiplication reduces
//! 2^256 ≡ 38 while accumulating and then squeezes the carries back into bounded limbs, so any
//! sequence of ladder operations stays well inside `u32` accumulators.
//!
//! Nothing in here branches on limb values.

use std::ops::{Add, Mul, Sub};

const LIMBS: usize = 32;

/// 2^256 - p, i.e. 2^255 + 19. Adding it subtracts the modulus modulo 2^256.
const MINUS_P: [u32; LIMBS] = {
    let mut m = [0u32; LIMBS];
    m[0] = 19;
    m[LIMBS - 1] = 128;
    m
};

/// An element of GF(2^255-19).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FieldElement([u32; LIMBS]);

impl FieldElement {
    pub(crate) const ZERO: FieldElement = FieldElement([0; LIMBS]);

    pub(crate) const ONE: FieldElement = {
        let mut one = [0u32; LIMBS];
        one[0] = 1;
        FieldElement(one)
    };

    /// Loads 32 little-endian bytes, one per limb. All 256 bits are kept.
    pub(crate) fn from_bytes(b: &[u8; 32]) -> FieldElement {
        let mut limbs = [0u32; LIMBS];
        for (l, &b) in limbs.iter_mut().zip(b) {
            *l = u32::from(b);
        }
        FieldElement(limbs)
    }

    /// Returns the canonical little-endian encoding of the element.
    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let frozen = self.freeze();
        let mut out = [0u8; 32];
        for (o, &l) in out.iter_mut().zip(&frozen.0) {
            // The top limb may carry a 2^256 bit out of `freeze`; it is dropped here.
            *o = l as u8;
        }
        out
    }

    /// Propagates carries so limbs 0..31 are below 2^8 and the top limb is below 2^7 plus a
    /// small carry, folding 2^255 back in as 19.
    fn squeeze(mut a: [u32; LIMBS]) -> FieldElement {
        let mut u = 0u32;
        for l in &mut a[..LIMBS - 1] {
            u += *l;
            *l = u & 255;
            u >>= 8;
        }
        u += a[LIMBS - 1];
        a[LIMBS - 1] = u & 127;
        u = 19 * (u >> 7);
        for l in &mut a[..LIMBS - 1] {
            u += *l;
            *l = u & 255;
            u >>= 8;
        }
        a[LIMBS - 1] += u;
        FieldElement(a)
    }

    /// Reduces the element to its unique representative in `[0, p)`.
    ///
    /// Squeezes the limbs below 2^255 plus a small carry, then adds 2^255+19. If bit 255 of the
    /// sum is set the input was below p and is kept; otherwise the sum, with its 2^256 bit
    /// dropped, is the reduced value. The choice is made with a mask, not a branch.
    pub(crate) fn freeze(&self) -> FieldElement {
        let squeezed = FieldElement::squeeze(self.0);
        let mut sum = (squeezed + FieldElement(MINUS_P)).0;
        let negative = ((sum[LIMBS - 1] >> 7) & 1).wrapping_neg();
        for (s, &orig) in sum.iter_mut().zip(&squeezed.0) {
            *s ^= negative & (orig ^ *s);
        }
        FieldElement(sum)
    }

    /// Returns `self²`, computing each cross product once.
    pub(crate) fn square(&self) -> FieldElement {
        let a = &self.0;
        let mut out = [0u32; LIMBS];
        for (i, o) in out.iter_mut().enumerate() {
            let mut u = 0u32;
            for j in 0..(i + 1) / 2 {
                u += a[j] * a[i - j];
            }
            for j in i + 1..(i + LIMBS + 1) / 2 {
                u += 38 * a[j] * a[i + LIMBS - j];
            }
            u *= 2;
            if i & 1 == 0 {
                u += a[i / 2] * a[i / 2];
                u += 38 * a[i / 2 + 16] * a[i / 2 + 16];
            }
            *o = u;
        }
        FieldElement::squeeze(out)
    }

    /// Returns `self² ⁿ`.
    fn square_times(&self, n: usize) -> FieldElement {
        (0..n).fold(*self, |acc, _| acc.square())
    }

    /// Returns `121665 · self`, the `(A - 2) / 4` constant of the Montgomery ladder.
    pub(crate) fn mul121665(&self) -> FieldElement {
        let a = &self.0;
        let mut out = [0u32; LIMBS];
        let mut u = 0u32;
        for j in 0..LIMBS - 1 {
            u += 121_665 * a[j];
            out[j] = u & 255;
            u >>= 8;
        }
        u += 121_665 * a[LIMBS - 1];
        out[LIMBS - 1] = u & 127;
        u = 19 * (u >> 7);
        for o in &mut out[..LIMBS - 1] {
            u += *o;
            *o = u & 255;
            u >>= 8;
        }
        out[LIMBS - 1] += u;
        FieldElement(out)
    }

    /// Returns `self⁻¹ = self^(p-2) = self^(2^255-21)` via a fixed addition chain.
    ///
    /// Zero maps to zero.
    pub(crate) fn reciprocal(&self) -> FieldElement {
        let z = *self;

        let z2 = z.square();
        let z9 = z2.square_times(2) * z;
        let z11 = z9 * z2;
        let z2_5_0 = z11.square() * z9;
        let z2_10_0 = z2_5_0.square_times(5) * z2_5_0;
        let z2_20_0 = z2_10_0.square_times(10) * z2_10_0;
        let z2_40_0 = z2_20_0.square_times(20) * z2_20_0;
        let z2_50_0 = z2_40_0.square_times(10) * z2_10_0;
        let z2_100_0 = z2_50_0.square_times(50) * z2_50_0;
        let z2_200_0 = z2_100_0.square_times(100) * z2_100_0;
        let z2_250_0 = z2_200_0.square_times(50) * z2_50_0;

        // 2^255 - 2^5 + 11 = 2^255 - 21
        z2_250_0.square_times(5) * z11
    }

    /// Swaps `a` and `b` iff `bit` is 1. `bit` must be 0 or 1.
    pub(crate) fn conditional_swap(a: &mut FieldElement, b: &mut FieldElement, bit: u32) {
        let mask = bit.wrapping_neg();
        for (x, y) in a.0.iter_mut().zip(b.0.iter_mut()) {
            let t = mask & (*x ^ *y);
            *x ^= t;
            *y ^= t;
        }
    }
}

impl Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        let mut out = [0u32; LIMBS];
        let mut u = 0u32;
        for j in 0..LIMBS - 1 {
            u += self.0[j] + rhs.0[j];
            out[j] = u & 255;
            u >>= 8;
        }
        out[LIMBS - 1] = u + self.0[LIMBS - 1] + rhs.0[LIMBS - 1];
        FieldElement(out)
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: FieldElement) -> FieldElement {
        // Add 2p (218 + 65280·Σ256^j + the carry into the top limb) so no limb goes negative.
        let mut out = [0u32; LIMBS];
        let mut u = 218u32;
        for j in 0..LIMBS - 1 {
            u += self.0[j] + 65_280 - rhs.0[j];
            out[j] = u & 255;
            u >>= 8;
        }
        out[LIMBS - 1] = u + self.0[LIMBS - 1] - rhs.0[LIMBS - 1];
        FieldElement(out)
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: FieldElement) -> FieldElement {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [0u32; LIMBS];
        for (i, o) in out.iter_mut().enumerate() {
            let mut u = 0u32;
            for j in 0..=i {
                u += a[j] * b[i - j];
            }
            for j in i + 1..LIMBS {
                u += 38 * a[j] * b[i + LIMBS - j];
            }
            *o = u;
        }
        FieldElement::squeeze(out)
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    use super::*;

    /// p = 2^255 - 19, little-endian.
    const P: [u8; 32] = {
        let mut p = [0xffu8; 32];
        p[0] = 0xed;
        p[31] = 0x7f;
        p
    };

    fn random_element(rng: &mut ChaChaRng) -> FieldElement {
        let mut b = rng.gen::<[u8; 32]>();
        b[31] &= 0x7f;
        FieldElement::from_bytes(&b)
    }

    #[test]
    fn freeze_modulus_is_zero() {
        assert_eq!([0u8; 32], FieldElement::from_bytes(&P).to_bytes());
    }

    #[test]
    fn freeze_above_modulus() {
        let mut p_plus_one = P;
        p_plus_one[0] += 1;
        assert_eq!(FieldElement::ONE.to_bytes(), FieldElement::from_bytes(&p_plus_one).to_bytes());
    }

    #[test]
    fn freeze_below_modulus_is_identity() {
        let mut p_minus_one = P;
        p_minus_one[0] -= 1;
        assert_eq!(p_minus_one, FieldElement::from_bytes(&p_minus_one).to_bytes());
    }

    #[test]
    fn freeze_unsqueezed_difference() {
        let one = FieldElement::ONE;
        assert_eq!([0u8; 32], (one - one).to_bytes());
        assert_eq!(one.to_bytes(), (one - FieldElement::ZERO).to_bytes());
    }

    #[test]
    fn freeze_unsqueezed_sum() {
        // (p - 1) + (p - 1) ≡ p - 2
        let mut p_minus_one = P;
        p_minus_one[0] -= 1;
        let mut p_minus_two = P;
        p_minus_two[0] -= 2;

        let a = FieldElement::from_bytes(&p_minus_one);
        assert_eq!(p_minus_two, (a + a).to_bytes());
        assert_eq!(p_minus_two, (a + a).freeze().to_bytes());
    }

    #[test]
    fn square_matches_mul() {
        let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
        for _ in 0..64 {
            let a = random_element(&mut rng);
            assert_eq!((a * a).to_bytes(), a.square().to_bytes());
        }
    }

    #[test]
    fn mul_is_commutative() {
        let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
        for _ in 0..64 {
            let a = random_element(&mut rng);
            let b = random_element(&mut rng);
            assert_eq!((a * b).to_bytes(), (b * a).to_bytes());
        }
    }

    #[test]
    fn sub_then_add() {
        let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
        for _ in 0..64 {
            let a = random_element(&mut rng);
            let b = random_element(&mut rng);
            assert_eq!(a.to_bytes(), ((a - b) + b).to_bytes());
        }
    }

    #[test]
    fn sub_self_is_zero() {
        let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
        let a = random_element(&mut rng);
        assert_eq!([0u8; 32], (a - a).to_bytes());
    }

    #[test]
    fn mul121665_matches_mul() {
        let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
        let mut c = [0u8; 32];
        c[..3].copy_from_slice(&121_665u32.to_le_bytes()[..3]);
        let c = FieldElement::from_bytes(&c);
        for _ in 0..64 {
            let a = random_element(&mut rng);
            assert_eq!((a * c).to_bytes(), a.mul121665().to_bytes());
        }
    }

    #[test]
    fn reciprocal() {
        let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
        for _ in 0..16 {
            let a = random_element(&mut rng);
            assert_eq!(FieldElement::ONE.to_bytes(), (a * a.reciprocal()).to_bytes());
        }
    }

    #[test]
    fn reciprocal_of_zero() {
        assert_eq!([0u8; 32], FieldElement::ZERO.reciprocal().to_bytes());
    }

    #[test]
    fn conditional_swap() {
        let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
        let (a, b) = (random_element(&mut rng), random_element(&mut rng));

        let (mut x, mut y) = (a, b);
        FieldElement::conditional_swap(&mut x, &mut y, 0);
        assert_eq!((a, b), (x, y));

        FieldElement::conditional_swap(&mut x, &mut y, 1);
        assert_eq!((b, a), (x, y));
    }
}
