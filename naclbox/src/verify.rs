//! Constant-time comparison of fixed-length byte strings.

/// Returns `true` iff `x` and `y` are equal in all 16 bytes.
///
/// Every byte is examined and the running time is independent of where, or whether, the inputs
/// differ.
#[must_use]
pub fn verify_16(x: &[u8; 16], y: &[u8; 16]) -> bool {
    verify_n(x, y)
}

/// Returns `true` iff `x` and `y` are equal in all 32 bytes, in constant time.
#[must_use]
pub fn verify_32(x: &[u8; 32], y: &[u8; 32]) -> bool {
    verify_n(x, y)
}

fn verify_n<const N: usize>(x: &[u8; N], y: &[u8; N]) -> bool {
    let d = x.iter().zip(y).fold(0u32, |d, (a, b)| d | u32::from(a ^ b));
    // (d - 1) >> 8 has its low bit set iff d was zero.
    (1 & (d.wrapping_sub(1) >> 8)) == 1
}
