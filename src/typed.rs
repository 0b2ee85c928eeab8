//! The monomorphic typed API (`RobinMap<K, V, S>`), built directly on
//! `RawMap` and the same probing/capacity engine the erased path uses
//! (spec.md §4.7).
//!
//! Grounded in the teacher's `ShmCache` as the single public entry point a
//! caller actually touches (`get`/`insert`/`clear`), generalized from "one
//! concrete `Bucket`/`SlotHeader` shape" to "any `K: Copy, V: Copy` pair",
//! with the hasher/equals functions monomorphized per `K` instead of fixed
//! to the teacher's own key representation.

use std::hash::{BuildHasher, Hash, Hasher};
use std::marker::PhantomData;

use crate::alloc::{Allocator, SystemAllocator};
use crate::cell::CellInfo;
use crate::descriptor::MapInfo;
use crate::erased;
use crate::error::MapError;
use crate::hash::DefaultHashBuilder;
use crate::raw::{RawMap, MIN_LOG2};
use crate::slot::Hash as SlotHash;

/// Monomorphized hasher shim: builds a fresh `S::Hasher`, feeds it `*key`
/// via `std::hash::Hash`, and applies the slot contract (top bit masked,
/// zero coerced to 1). A distinct instantiation of this function exists per
/// `(K, S)` pair, so it can be passed around as a plain `unsafe fn` pointer
/// in a `MapInfo` the same way the erased path's runtime-supplied hashers
/// are.
unsafe fn hasher_shim<K: Hash, S: BuildHasher + Default>(key_ptr: *const u8, seed: u64) -> SlotHash {
    let key = &*(key_ptr as *const K);
    let mut hasher = S::default().build_hasher();
    seed.hash(&mut hasher);
    key.hash(&mut hasher);
    crate::hash::postprocess(hasher.finish())
}

/// Monomorphized equality shim: reads both pointers as `&K` and compares
/// with `PartialEq`.
unsafe fn equals_shim<K: PartialEq>(a: *const u8, b: *const u8) -> bool {
    *(a as *const K) == *(b as *const K)
}

/// A monomorphic Robin Hood hash map from `K` to `V`, sharing its in-memory
/// layout with the type-erased API (spec.md §4.7, §9 "Shared layout, dual
/// API").
///
/// `K` and `V` are bound to `Copy` because the raw storage layer moves
/// entries with a bytewise copy and has no notion of a destructor to run on
/// overwrite, eviction during migration, or tombstone reclamation — the
/// same constraint the teacher's shared-memory `Bucket`/`SlotHeader`
/// storage has, generalized from "must be `memcpy`-safe across a process
/// boundary" to "must be `memcpy`-safe, full stop".
pub struct RobinMap<K, V, S = DefaultHashBuilder, A = SystemAllocator>
where
    K: Copy + Hash + PartialEq,
    V: Copy,
    S: BuildHasher + Default,
    A: Allocator,
{
    raw: RawMap<A>,
    info: MapInfo,
    _marker: PhantomData<(K, V, S)>,
}

impl<K, V> RobinMap<K, V, DefaultHashBuilder, SystemAllocator>
where
    K: Copy + Hash + PartialEq,
    V: Copy,
{
    /// A fresh, unallocated map using the default hasher and the system
    /// allocator.
    pub fn new() -> Self {
        Self::with_allocator(SystemAllocator)
    }

    /// A fresh map with its first region pre-allocated for at least `n`
    /// entries, grounded in the teacher's `create_or_open(... capacity
    /// ...)` entry point rather than always lazily allocating on first
    /// insert.
    pub fn with_capacity(n: usize) -> Result<Self, MapError> {
        let mut map = Self::new();
        map.reserve(n)?;
        Ok(map)
    }
}

impl<K, V, S, A> RobinMap<K, V, S, A>
where
    K: Copy + Hash + PartialEq,
    V: Copy,
    S: BuildHasher + Default,
    A: Allocator + Clone,
{
    /// The `MapInfo` this wrapper's typed operations use internally —
    /// exposed so callers can build a matching `RawMap` directly through
    /// the erased API and later wrap it with [`Self::from_raw_parts`].
    pub fn descriptor_for() -> MapInfo {
        MapInfo::new(
            CellInfo::of::<K>(),
            CellInfo::of::<V>(),
            hasher_shim::<K, S>,
            equals_shim::<K>,
        )
    }

    /// A fresh, unallocated map using the given allocator capability.
    pub fn with_allocator(allocator: A) -> Self {
        RobinMap {
            raw: RawMap::new(allocator),
            info: Self::descriptor_for(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.raw.cap()
    }

    /// Insert `(key, value)`, returning the previous value if `key` was
    /// already present. Uses a single probe (`erased::insert_prev`) rather
    /// than a separate lookup followed by the insert's own probe.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        let mut previous = std::mem::MaybeUninit::<V>::uninit();
        let was_present = unsafe {
            erased::insert_prev(
                &mut self.raw,
                &self.info,
                &key as *const K as *const u8,
                &value as *const V as *const u8,
                previous.as_mut_ptr() as *mut u8,
            )?
        };
        Ok(was_present.then(|| unsafe { previous.assume_init() }))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        unsafe {
            erased::lookup(&self.raw, &self.info, key as *const K as *const u8)
                .map(|p| &*(p as *const V))
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        unsafe { erased::exists(&self.raw, &self.info, key as *const K as *const u8) }
    }

    /// Erase `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.get(key).copied();
        let erased = unsafe { erased::erase(&mut self.raw, &self.info, key as *const K as *const u8) };
        debug_assert_eq!(erased, value.is_some());
        value
    }

    pub fn clear(&mut self) {
        unsafe { erased::clear(&mut self.raw, &self.info) }
    }

    pub fn reserve(&mut self, n: usize) -> Result<(), MapError> {
        unsafe { erased::reserve(&mut self.raw, &self.info, n) }
    }

    pub fn grow(&mut self) -> Result<(), MapError> {
        unsafe { erased::grow(&mut self.raw, &self.info) }
    }

    pub fn shrink(&mut self) -> Result<(), MapError> {
        unsafe { erased::shrink(&mut self.raw, &self.info) }
    }

    /// Access the underlying raw container and its descriptor, for
    /// interoperating with the type-erased API on the same allocation
    /// (spec.md §9 "Shared layout, dual API").
    pub fn as_raw(&mut self) -> (&mut RawMap<A>, &MapInfo) {
        (&mut self.raw, &self.info)
    }

    pub fn descriptor(&self) -> &MapInfo {
        &self.info
    }

    /// Wrap a `RawMap` previously built (e.g. via [`crate::erased::allocate`])
    /// under a descriptor matching `K`/`V`/`S`'s layout into a typed handle.
    ///
    /// # Safety
    /// `raw` must be unallocated, or allocated under a `MapInfo` with the
    /// same key/value cell layout `Self::descriptor_for()` produces.
    pub unsafe fn from_raw_parts(raw: RawMap<A>) -> Self {
        RobinMap {
            raw,
            info: Self::descriptor_for(),
            _marker: PhantomData,
        }
    }

    /// Disassemble into the raw container and its descriptor, without
    /// running `Drop` (the caller takes over ownership of the region).
    pub fn into_raw_parts(self) -> (RawMap<A>, MapInfo) {
        let mut this = std::mem::ManuallyDrop::new(self);
        // SAFETY: `this.raw`/`this.info` are read out once and `this` is
        // never used again, so no double-free or use-after-move occurs.
        let raw = unsafe { std::ptr::read(&this.raw) };
        let info = unsafe { std::ptr::read(&this.info) };
        let _ = &mut this;
        (raw, info)
    }
}

impl<K, V> Default for RobinMap<K, V, DefaultHashBuilder, SystemAllocator>
where
    K: Copy + Hash + PartialEq,
    V: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, A> Drop for RobinMap<K, V, S, A>
where
    K: Copy + Hash + PartialEq,
    V: Copy,
    S: BuildHasher + Default,
    A: Allocator,
{
    fn drop(&mut self) {
        self.raw.free_current(&self.info);
    }
}

#[allow(dead_code)]
const _MIN_LOG2_IS_USED: u32 = MIN_LOG2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove_roundtrip() {
        let mut map: RobinMap<u64, u64> = RobinMap::new();
        assert_eq!(map.insert(1, 100).unwrap(), None);
        assert_eq!(map.get(&1), Some(&100));
        assert_eq!(map.insert(1, 200).unwrap(), Some(100));
        assert_eq!(map.get(&1), Some(&200));
        assert_eq!(map.remove(&1), Some(200));
        assert_eq!(map.get(&1), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn with_capacity_preallocates() {
        let map: RobinMap<u64, u64> = RobinMap::with_capacity(10_000).unwrap();
        // Bug-compatible: the first allocation on an empty container always
        // lands at MIN_LOG2 regardless of the requested size (spec.md §9).
        assert_eq!(map.cap(), 1usize << MIN_LOG2);
    }

    #[test]
    fn string_key_roundtrip() {
        let mut map: RobinMap<&'static str, u64> = RobinMap::new();
        map.insert("abc", 7).unwrap();
        assert_eq!(map.get(&"abc"), Some(&7));
    }

    #[test]
    fn thousand_entries_evens_erased_then_reinserted() {
        let mut map: RobinMap<u64, u64> = RobinMap::new();
        for k in 0u64..1000 {
            map.insert(k, k).unwrap();
        }
        assert_eq!(map.len(), 1000);

        for k in (0u64..1000).step_by(2) {
            assert_eq!(map.remove(&k), Some(k));
        }
        assert_eq!(map.len(), 500);

        for k in 0u64..1000 {
            if k % 2 == 0 {
                assert!(map.get(&k).is_none());
            } else {
                assert_eq!(map.get(&k), Some(&k));
            }
        }

        for k in (0u64..1000).step_by(2) {
            map.insert(k, k).unwrap();
        }
        assert_eq!(map.len(), 1000);
        for k in 0u64..1000 {
            assert_eq!(map.get(&k), Some(&k));
        }
    }

    #[test]
    fn clear_then_insert_same_key_twice() {
        let mut map: RobinMap<u64, u64> = RobinMap::new();
        map.insert(5, 1).unwrap();
        map.clear();
        assert_eq!(map.len(), 0);
        map.insert(5, 10).unwrap();
        map.insert(5, 20).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&5), Some(&20));
    }

    #[test]
    fn swapped_descriptor_regression_differing_key_value_sizes() {
        // sizeof(K) != sizeof(V): pins spec.md §9's swapped-descriptor open
        // question. Force enough displacement (many inserts at MIN_LOG2
        // capacity, near the grow threshold) that the Robin Hood swap path
        // in probe::insert_new actually runs before a grow kicks in.
        let mut map: RobinMap<u8, u64> = RobinMap::new();
        for k in 0u8..47 {
            map.insert(k, k as u64 * 1000 + 7).unwrap();
        }
        for k in 0u8..47 {
            assert_eq!(map.get(&k), Some(&(k as u64 * 1000 + 7)));
        }
    }
}
