//! Cell layout calculator and indexer.
//!
//! A "cell" is a cache-line-aligned packet holding one or more consecutively
//! stored elements of a single type. Packing elements into cells guarantees
//! that no element (and for the hash-word array, no slot) ever straddles a
//! cache line, the way the teacher's `shm::layout` module packs `Bucket`s
//! and `SlotHeader`s into fixed, cache-friendly strides.

use std::mem;

/// Hardware cache-line size assumed for packing. A power of two, >= 64.
pub const CACHE_LINE_SIZE: usize = 64;

/// Round `x` up to the next multiple of `to` (`to` must be a power of two).
#[inline]
pub const fn round_up(x: usize, to: usize) -> usize {
    (x + to - 1) & !(to - 1)
}

#[inline]
const fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Immutable description of how a single type `T` is packed into cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellInfo {
    pub size_of_type: usize,
    pub align_of_type: usize,
    pub size_of_cell: usize,
    pub elements_per_cell: usize,
}

impl CellInfo {
    /// Build a `CellInfo` for a statically-known type.
    pub const fn of<T>() -> Self {
        Self::new(mem::size_of::<T>(), mem::align_of::<T>())
    }

    /// Build a `CellInfo` from raw size/alignment, e.g. for a type known
    /// only at runtime via a type-erased descriptor.
    pub const fn new(size_of_type: usize, align_of_type: usize) -> Self {
        let align_of_type = if align_of_type == 0 { 1 } else { align_of_type };
        // A zero-sized type still needs a nonzero stride to index distinct
        // logical slots (the spec's `0 < s < L` branch assumes s > 0); treat
        // it like the "s >= L" branch with a minimal one-byte footprint.
        if size_of_type > 0 && size_of_type < CACHE_LINE_SIZE {
            let elements_per_cell = CACHE_LINE_SIZE / size_of_type;
            CellInfo {
                size_of_type,
                align_of_type,
                size_of_cell: CACHE_LINE_SIZE,
                elements_per_cell,
            }
        } else {
            let s = if size_of_type == 0 { 1 } else { size_of_type };
            CellInfo {
                size_of_type,
                align_of_type,
                size_of_cell: round_up(s, CACHE_LINE_SIZE),
                elements_per_cell: 1,
            }
        }
    }

    /// Byte offset of logical slot `i` from the start of this cell-packed
    /// array. Specializes on `elements_per_cell` per spec.md §4.1.
    #[inline]
    pub const fn offset_of(&self, i: usize) -> usize {
        match self.elements_per_cell {
            1 => i * self.size_of_cell,
            2 => (i >> 1) * self.size_of_cell + (i & 1) * self.size_of_type,
            epc => (i / epc) * self.size_of_cell + (i % epc) * self.size_of_type,
        }
    }

    /// Total bytes needed to hold `n` fully packed elements (i.e. the byte
    /// span covering cells `0..=ceil(n/epc)-1`).
    #[inline]
    pub const fn bytes_for(&self, n: usize) -> usize {
        if n == 0 {
            0
        } else {
            ceil_div(n, self.elements_per_cell) * self.size_of_cell
        }
    }
}
