//! Reduction of a 64bit hash to a slot index in `[0, d)`.
//!
//! Both implementations return exactly `h % d`, so the slot layout of a table
//! does not depend on which one is used.

pub trait Reduce: Copy + Send + Sync + std::fmt::Debug {
    fn new(d: usize) -> Self;
    fn reduce(self, h: u64) -> usize;
}

/// Plain modulo, using a hardware division.
impl Reduce for u64 {
    fn new(d: usize) -> Self {
        assert!(d > 0);
        d as u64
    }
    #[inline(always)]
    fn reduce(self, h: u64) -> usize {
        (h % self) as usize
    }
}

// Multiply a u128 by u64 and return the upper 64 bits of the result.
// ((lowbits * d as u128) >> 128) as u64
fn mul128_u64(lowbits: u128, d: u64) -> u64 {
    let bot_half = ((lowbits & u64::MAX as u128) * d as u128) >> 64; // Won't overflow
    let top_half = (lowbits >> 64) * d as u128;
    let both_halves = bot_half + top_half; // Both halves are already shifted down by 64
    (both_halves >> 64) as u64
}

/// FastMod64: exact `h % d` for all 64bit `h` without a division.
/// Taken from https://github.com/lemire/fastmod/blob/master/include/fastmod.h
#[derive(Copy, Clone, Debug)]
pub struct FastMod64 {
    d: u64,
    m: u128,
}

impl Reduce for FastMod64 {
    fn new(d: usize) -> Self {
        // d=1 would overflow m.
        assert!(d > 1, "FastMod64 needs a divisor of at least 2, got {d}");
        Self {
            d: d as u64,
            m: u128::MAX / d as u128 + 1,
        }
    }
    #[inline(always)]
    fn reduce(self, h: u64) -> usize {
        let lowbits = self.m.wrapping_mul(h as u128);
        mul128_u64(lowbits, self.d) as usize
    }
}
