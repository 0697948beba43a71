use crate::{reduce::Reduce, Key};
use murmur2::murmur64a;

/// Strong type for 64bit hashes.
///
/// The only thing we ever do with a hash is reduce it to a slot in `[0, capacity)`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Default, Ord)]
pub struct Hash {
    hash: u64,
}

impl Hash {
    pub fn new(v: u64) -> Self {
        Hash { hash: v }
    }
    pub fn get(&self) -> u64 {
        self.hash
    }
    pub fn reduce<R: Reduce>(self, d: R) -> usize {
        d.reduce(self.hash)
    }
}

/// Maps a key to a 64bit hash. Implementations must be pure: no seed, no state.
pub trait Hasher: Copy + Send + Sync {
    fn hash(x: &Key) -> Hash;
}

/// Cheap non-cryptographic mixing hash.
///
/// Every byte of the key is added to its mirror byte, folded into the
/// accumulator using two odd constants, and the accumulator is rotated by an
/// amount in `[1, 32]` taken from its own low bits.
///
/// Bytes are read in little-endian order and sign-extended before the addition,
/// which reproduces the reference output bit for bit.
#[derive(Clone, Copy, Debug, Default)]
pub struct MixHash;

impl MixHash {
    pub const A: u64 = 0x34c1e258e25845d1;
    pub const B: u64 = 0x146634c134c1e258;
}

impl Hasher for MixHash {
    #[inline(always)]
    fn hash(x: &Key) -> Hash {
        let key = x.to_le_bytes();
        let mut e: u64 = 0;
        for i in 0..8 {
            let k = (key[i] as i8 as u64).wrapping_add(key[7 - i] as i8 as u64);
            e = e
                .wrapping_add(Self::A.wrapping_mul(k))
                .wrapping_add(Self::B ^ k)
                .wrapping_add(Self::B);
            let t = 1 + (e & 0x1f) as u32;
            e = e.rotate_right(t);
        }
        Hash { hash: e }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FxHash;

impl Hasher for FxHash {
    fn hash(x: &Key) -> Hash {
        Hash {
            hash: fxhash::hash64(x),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur;

impl Hasher for Murmur {
    fn hash(x: &Key) -> Hash {
        // Pass the key as a byte slice.
        Hash {
            hash: murmur64a(&x.to_le_bytes(), 0),
        }
    }
}
