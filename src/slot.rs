//! Hash slot protocol (spec.md §4.3).
//!
//! Interpretation of the per-slot hash word: zero means empty, the top bit
//! set means tombstone (low bits still carry the original hash), otherwise
//! the slot holds a valid entry. This is the Robin-Hood-aware generalization
//! of the teacher's `BUCKET_EMPTY` sentinel in `shm::layout`/`shm::hashtable`,
//! which used a dedicated out-of-band `slot_index` sentinel instead of
//! reserving a bit of the hash word itself.

/// Word-sized hash value stored per slot.
pub type Hash = u64;

const TOMBSTONE_BIT: u64 = 1 << (u64::BITS - 1);

#[inline]
pub const fn empty(h: Hash) -> bool {
    h == 0
}

#[inline]
pub const fn tombstone(h: Hash) -> bool {
    h & TOMBSTONE_BIT != 0
}

#[inline]
pub const fn valid(h: Hash) -> bool {
    h != 0 && h & TOMBSTONE_BIT == 0
}

/// Mark a valid hash word as a tombstone, preserving its low bits so that
/// `probe_distance` keeps working for entries probing past it.
#[inline]
pub const fn mark_tombstone(h: Hash) -> Hash {
    h | TOMBSTONE_BIT
}

#[inline]
pub const fn desired(h: Hash, cap: usize) -> usize {
    (h as usize) & (cap - 1)
}

#[inline]
pub const fn probe_distance(h: Hash, slot: usize, cap: usize) -> usize {
    (slot + cap - desired(h, cap)) & (cap - 1)
}
