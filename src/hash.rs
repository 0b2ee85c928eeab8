//! Default hasher family (spec.md §4.8): FNV-1a 64-bit, with fixed-length
//! specializations and string/byte-slice variants.
//!
//! The teacher pulls in `ahash` as its default-hasher crate for exactly
//! this role (a fast non-cryptographic default for a table's keys); the
//! algorithm here is pinned by spec.md to FNV-1a's exact constants, so it
//! is hand-written rather than delegated to `ahash`, but it plays the same
//! "swappable default" role — see `DefaultHashBuilder` in `typed.rs`.

use std::hash::{BuildHasher, Hasher};

pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Mask off the top bit (reserved for the tombstone tag) and coerce a zero
/// result to 1 (reserved for the empty tag). Every hasher composed into a
/// `MapInfo` must apply this postprocessing step.
#[inline]
pub const fn postprocess(h: u64) -> u64 {
    let masked = h & !(1u64 << 63);
    if masked == 0 {
        1
    } else {
        masked
    }
}

#[inline]
const fn mix(mut state: u64, byte: u8) -> u64 {
    state ^= byte as u64;
    state.wrapping_mul(FNV_PRIME)
}

/// Variable-length byte-slice variant.
#[inline]
pub fn hash_bytes(seed: u64, bytes: &[u8]) -> u64 {
    let mut state = FNV_OFFSET_BASIS.wrapping_add(seed);
    let mut i = 0;
    while i < bytes.len() {
        state = mix(state, bytes[i]);
        i += 1;
    }
    postprocess(state)
}

/// Fixed-length variant for exactly `N` bytes read from `ptr`, unrolled by
/// the compiler since `N` is a const generic. Specializations for
/// `N in 1..=16` are the named aliases below.
///
/// # Safety
/// `ptr` must point to at least `N` readable bytes.
#[inline]
pub unsafe fn hash_fixed<const N: usize>(seed: u64, ptr: *const u8) -> u64 {
    let mut state = FNV_OFFSET_BASIS.wrapping_add(seed);
    let mut i = 0;
    while i < N {
        state = mix(state, *ptr.add(i));
        i += 1;
    }
    postprocess(state)
}

macro_rules! fixed_hash_alias {
    ($name:ident, $n:literal) => {
        /// # Safety
        /// `ptr` must point to at least
        #[doc = concat!($n, " readable bytes.")]
        #[inline]
        pub unsafe fn $name(seed: u64, ptr: *const u8) -> u64 {
            hash_fixed::<$n>(seed, ptr)
        }
    };
}

fixed_hash_alias!(hash_fixed_1, 1);
fixed_hash_alias!(hash_fixed_2, 2);
fixed_hash_alias!(hash_fixed_3, 3);
fixed_hash_alias!(hash_fixed_4, 4);
fixed_hash_alias!(hash_fixed_5, 5);
fixed_hash_alias!(hash_fixed_6, 6);
fixed_hash_alias!(hash_fixed_7, 7);
fixed_hash_alias!(hash_fixed_8, 8);
fixed_hash_alias!(hash_fixed_9, 9);
fixed_hash_alias!(hash_fixed_10, 10);
fixed_hash_alias!(hash_fixed_11, 11);
fixed_hash_alias!(hash_fixed_12, 12);
fixed_hash_alias!(hash_fixed_13, 13);
fixed_hash_alias!(hash_fixed_14, 14);
fixed_hash_alias!(hash_fixed_15, 15);
fixed_hash_alias!(hash_fixed_16, 16);

/// Length-prefixed string variant. A Rust `&str` already carries its
/// length, so this is `hash_bytes` over its UTF-8 representation.
#[inline]
pub fn hash_str(seed: u64, s: &str) -> u64 {
    hash_bytes(seed, s.as_bytes())
}

/// NUL-terminated string variant: walks bytes from `ptr` until a `0`
/// terminator, mixing each one in turn.
///
/// # Safety
/// `ptr` must point to a valid NUL-terminated byte string.
pub unsafe fn hash_cstr(seed: u64, ptr: *const u8) -> u64 {
    let mut state = FNV_OFFSET_BASIS.wrapping_add(seed);
    let mut i = 0isize;
    loop {
        let b = *ptr.offset(i);
        if b == 0 {
            break;
        }
        state = mix(state, b);
        i += 1;
    }
    postprocess(state)
}

/// FNV-1a `std::hash::Hasher` used by [`DefaultHashBuilder`].
#[derive(Clone)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    pub const fn new() -> Self {
        FnvHasher {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = mix(self.state, b);
        }
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

/// The crate's default `BuildHasher`: deterministic (no per-instance
/// random seed), so it can be used by the type-erased path's monomorphized
/// hasher shim, which needs a plain function pointer rather than a
/// closure capturing per-instance state.
#[derive(Clone, Copy, Default, Debug)]
pub struct DefaultHashBuilder;

impl BuildHasher for DefaultHashBuilder {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> FnvHasher {
        FnvHasher::new()
    }
}
