//! `RawMap`: the tagged-base-pointer container header (spec.md §3, §4.2,
//! §4.6).
//!
//! Grounded in the teacher's `ShmRegion`, which owns one allocation laid
//! out as header + hash table + slab arena (`layout::region_size`,
//! `layout::ht_offset`, `layout::slab_offset`). Here the layout grows to
//! five cache-line-rounded segments (keys, values, hashes, scratch keys,
//! scratch values) and the "region handle" collapses to a single tagged
//! machine word per spec.md §9.

use std::ptr::NonNull;

use crate::alloc::Allocator;
use crate::cell::{round_up, CellInfo, CACHE_LINE_SIZE};
use crate::descriptor::MapInfo;
use crate::error::MapError;
use crate::slot::Hash;

/// Smallest representable capacity: 64 slots (`1 << MIN_LOG2`).
pub const MIN_LOG2: u32 = 6;

/// Maximum representable `log2_capacity` — the tagged base pointer reserves
/// its low 6 bits for this field.
pub const MAX_LOG2: u32 = 63;

const CAP_MASK: usize = 0b11_1111;

const LOAD_FACTOR_NUM: u64 = 75;
const LOAD_FACTOR_DEN: u64 = 100;

/// `floor(cap * 75 / 100)`: the maximum number of live entries before a
/// grow is required.
#[inline]
pub fn load_factor_threshold(cap: usize) -> usize {
    ((cap as u64) * LOAD_FACTOR_NUM / LOAD_FACTOR_DEN) as usize
}

/// `ceil(log2(max(n, 1)))`.
#[inline]
pub fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        (usize::BITS) - (n - 1).leading_zeros()
    }
}

/// Byte layout of one allocation for a given capacity: five
/// cache-line-rounded segments, in order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Segments {
    pub keys_off: usize,
    pub values_off: usize,
    pub hashes_off: usize,
    pub scratch_keys_off: usize,
    pub scratch_values_off: usize,
    pub total: usize,
}

#[inline]
fn hash_cell() -> CellInfo {
    CellInfo::of::<Hash>()
}

pub(crate) fn segments_for(info: &MapInfo, cap: usize) -> Segments {
    let keys_size = round_up(info.key_cell.bytes_for(cap), CACHE_LINE_SIZE);
    let values_size = round_up(info.value_cell.bytes_for(cap), CACHE_LINE_SIZE);
    let hashes_size = round_up(hash_cell().bytes_for(cap), CACHE_LINE_SIZE);
    let scratch_keys_size = round_up(info.key_cell.bytes_for(2), CACHE_LINE_SIZE);
    let scratch_values_size = round_up(info.value_cell.bytes_for(2), CACHE_LINE_SIZE);

    let keys_off = 0;
    let values_off = keys_off + keys_size;
    let hashes_off = values_off + values_size;
    let scratch_keys_off = hashes_off + hashes_size;
    let scratch_values_off = scratch_keys_off + scratch_keys_size;
    let total = scratch_values_off + scratch_values_size;

    Segments {
        keys_off,
        values_off,
        hashes_off,
        scratch_keys_off,
        scratch_values_off,
        total,
    }
}

/// Total bytes a region of capacity `cap` occupies for the given
/// descriptor (spec.md §4.6).
pub fn total_size(info: &MapInfo, cap: usize) -> usize {
    segments_for(info, cap).total
}

/// The raw container header (spec.md §3): a tagged base pointer, a length,
/// and an allocator handle. `RawMap` carries no key/value type information
/// of its own — every operation on it takes a `&MapInfo` descriptor, which
/// is what makes the type-erased API possible.
pub struct RawMap<A: Allocator> {
    /// `0` (empty, unallocated) or `base | log2_capacity`.
    data: usize,
    len: usize,
    allocator: A,
}

impl<A: Allocator> RawMap<A> {
    /// A zero-initialized, unallocated container. The first allocation
    /// happens lazily on the first insert or reserve.
    pub fn new(allocator: A) -> Self {
        RawMap {
            data: 0,
            len: 0,
            allocator,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn cap(&self) -> usize {
        if self.data == 0 {
            0
        } else {
            1usize << self.log2_cap()
        }
    }

    #[inline]
    pub(crate) fn log2_cap(&self) -> u32 {
        (self.data & CAP_MASK) as u32
    }

    #[inline]
    pub(crate) fn base_ptr(&self) -> *mut u8 {
        (self.data & !CAP_MASK) as *mut u8
    }

    #[inline]
    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Allocate a fresh region of `1 << log2_capacity` slots, installing it
    /// as this container's current region. The caller must ensure the
    /// container is currently empty (`data == 0`) or has already freed its
    /// prior region — this never migrates existing entries.
    pub(crate) fn allocate_fresh(
        &mut self,
        info: &MapInfo,
        log2_capacity: u32,
    ) -> Result<(), MapError> {
        if log2_capacity > MAX_LOG2 {
            return Err(MapError::CapacityOverflow);
        }
        let cap = 1usize << log2_capacity;
        let segs = segments_for(info, cap);
        let ptr = self
            .allocator
            .alloc(segs.total, CACHE_LINE_SIZE)
            .ok_or(MapError::OutOfMemory)?;
        assert_eq!(
            ptr.as_ptr() as usize % CACHE_LINE_SIZE,
            0,
            "allocator returned a misaligned region"
        );

        // SAFETY: the hash-word segment is `cap` cache-line-packed u64s;
        // zeroing every byte makes every slot `empty` per spec.md §4.3.
        unsafe {
            std::ptr::write_bytes(ptr.as_ptr(), 0, segs.total);
        }

        self.data = (ptr.as_ptr() as usize) | (log2_capacity as usize);
        Ok(())
    }

    /// Free the current region, if any, leaving the container
    /// zero-initialized. Requires the descriptor the region was allocated
    /// with, since `RawMap` itself carries no size information.
    pub(crate) fn free_current(&mut self, info: &MapInfo) {
        if self.data == 0 {
            return;
        }
        let cap = self.cap();
        let segs = segments_for(info, cap);
        let base = self.base_ptr();
        // SAFETY: `base` was returned by this same allocator with this same
        // size on the matching `allocate_fresh` call.
        unsafe {
            if let Some(ptr) = NonNull::new(base) {
                self.allocator.dealloc(ptr, segs.total, CACHE_LINE_SIZE);
            }
        }
        self.data = 0;
        self.len = 0;
    }

    #[inline]
    pub(crate) fn key_ptr(&self, info: &MapInfo, i: usize) -> *mut u8 {
        unsafe { self.base_ptr().add(info.key_cell.offset_of(i)) }
    }

    #[inline]
    pub(crate) fn value_ptr(&self, info: &MapInfo, i: usize) -> *mut u8 {
        let segs = segments_for(info, self.cap());
        unsafe {
            self.base_ptr()
                .add(segs.values_off + info.value_cell.offset_of(i))
        }
    }

    #[inline]
    pub(crate) fn hash_ptr(&self, info: &MapInfo, i: usize) -> *mut Hash {
        let segs = segments_for(info, self.cap());
        unsafe {
            self.base_ptr()
                .add(segs.hashes_off + hash_cell().offset_of(i)) as *mut Hash
        }
    }

    #[inline]
    pub(crate) fn scratch_key_ptr(&self, info: &MapInfo, which: usize) -> *mut u8 {
        debug_assert!(which < 2);
        let segs = segments_for(info, self.cap());
        unsafe {
            self.base_ptr()
                .add(segs.scratch_keys_off + info.key_cell.offset_of(which))
        }
    }

    #[inline]
    pub(crate) fn scratch_value_ptr(&self, info: &MapInfo, which: usize) -> *mut u8 {
        debug_assert!(which < 2);
        let segs = segments_for(info, self.cap());
        unsafe {
            self.base_ptr()
                .add(segs.scratch_values_off + info.value_cell.offset_of(which))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_log2_matches_expected_values() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(64), 6);
        assert_eq!(ceil_log2(65), 7);
        assert_eq!(ceil_log2(10_000), 14);
        assert_eq!(1usize << ceil_log2(10_000), 16_384);
    }

    #[test]
    fn load_factor_threshold_matches_spec_example() {
        assert_eq!(load_factor_threshold(64), 48);
        assert_eq!(load_factor_threshold(128), 96);
    }

    #[test]
    fn fresh_container_is_empty_and_unallocated() {
        let map: RawMap<crate::alloc::SystemAllocator> =
            RawMap::new(crate::alloc::SystemAllocator);
        assert_eq!(map.cap(), 0);
        assert_eq!(map.len(), 0);
    }
}
