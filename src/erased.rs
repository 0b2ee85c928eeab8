//! The type-erased public operations table (spec.md §6).
//!
//! Every function here takes a `&MapInfo` descriptor and dispatches through
//! its function pointers and cell layouts, rather than assuming any
//! statically-known `K`/`V`. This is the surface a caller reaches for when
//! the key/value types aren't known until runtime — the typed wrapper in
//! `typed.rs` is built on top of exactly these same functions, monomorphized
//! away, so the two paths can interoperate on one `RawMap` instance per
//! spec.md §4.7/§9.
//!
//! Grounded in the teacher's `ShmCache` public methods (`get`/`insert`/
//! `clear`/`info`), which are themselves thin dispatch over `shm::hashtable`
//! free functions plus a `ShmRegion` handle — generalized here from "one
//! fixed cache shape" to "any shape describable by a `MapInfo`".

use crate::alloc::Allocator;
use crate::capacity;
use crate::descriptor::MapInfo;
use crate::error::MapError;
use crate::probe;
use crate::raw::RawMap;

/// Allocate a fresh container with an initial region sized for
/// `1 << log2_capacity` slots.
pub fn allocate<A: Allocator>(
    info: &MapInfo,
    log2_capacity: u32,
    allocator: A,
) -> Result<RawMap<A>, MapError> {
    let mut map = RawMap::new(allocator);
    unsafe {
        map.allocate_fresh(info, log2_capacity)?;
    }
    Ok(map)
}

/// Shared insert path for `insert`/`insert_prev`: one probe locates the
/// slot (or its absence), optionally saves the overwritten value's old
/// bytes, then writes. Returns the stored value's address and whether
/// `key` was already present.
unsafe fn insert_impl<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
    value_ptr: *const u8,
    previous_out: Option<*mut u8>,
) -> Result<(*mut u8, bool), MapError> {
    let h = (info.hasher)(key_ptr, 0);

    if map.cap() > 0 {
        if let Some(s) = probe::lookup(map, info, key_ptr, h) {
            let dst = map.value_ptr(info, s);
            if let Some(out) = previous_out {
                std::ptr::copy_nonoverlapping(dst as *const u8, out, info.value_cell.size_of_type);
            }
            std::ptr::copy_nonoverlapping(value_ptr, dst, info.value_cell.size_of_type);
            return Ok((dst, true));
        }
    }

    capacity::ensure_capacity_for_insert(map, info)?;
    let dst = probe::insert_new(map, info, key_ptr, value_ptr, h);
    map.set_len(map.len() + 1);
    Ok((dst, false))
}

/// Insert `(key, value)`, growing first if the load factor would be
/// exceeded. If `key` is already present its value is overwritten in place
/// and `len` is unchanged. Returns the address of the stored value.
///
/// # Safety
/// `key_ptr`/`value_ptr` must point to valid, initialized values of
/// `info`'s key/value types, each exactly `size_of_type` bytes; both must
/// remain valid for the duration of the call (spec.md §6).
pub unsafe fn insert<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
    value_ptr: *const u8,
) -> Result<*mut u8, MapError> {
    insert_impl(map, info, key_ptr, value_ptr, None).map(|(dst, _)| dst)
}

/// As `insert`, but in one probe instead of two: if `key` is already
/// present, its old value is copied into `previous_out` before being
/// overwritten, and the call reports whether it was present. Lets a typed
/// `insert` that wants to return the previous value avoid a separate
/// lookup pass ahead of its own probe.
///
/// # Safety
/// As `insert`, plus `previous_out` must point to
/// `info.value_cell.size_of_type` writable bytes, non-overlapping with
/// `value_ptr`.
pub unsafe fn insert_prev<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
    value_ptr: *const u8,
    previous_out: *mut u8,
) -> Result<bool, MapError> {
    insert_impl(map, info, key_ptr, value_ptr, Some(previous_out)).map(|(_, was_present)| was_present)
}

/// Insert without returning the stored address (spec.md §6 "add
/// (no-return)"), used during migration and whenever the caller does not
/// need the value's address.
///
/// # Safety
/// Same as `insert`.
pub unsafe fn add<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
    value_ptr: *const u8,
) -> Result<(), MapError> {
    insert(map, info, key_ptr, value_ptr).map(|_| ())
}

/// Find `key`, returning the address of its stored value.
///
/// # Safety
/// `key_ptr` must point to a valid, initialized key.
pub unsafe fn lookup<A: Allocator>(
    map: &RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
) -> Option<*mut u8> {
    let h = (info.hasher)(key_ptr, 0);
    probe::lookup(map, info, key_ptr, h).map(|s| map.value_ptr(info, s))
}

/// # Safety
/// `key_ptr` must point to a valid, initialized key.
pub unsafe fn exists<A: Allocator>(map: &RawMap<A>, info: &MapInfo, key_ptr: *const u8) -> bool {
    lookup(map, info, key_ptr).is_some()
}

/// # Safety
/// `key_ptr` must point to a valid, initialized key.
pub unsafe fn erase<A: Allocator>(map: &mut RawMap<A>, info: &MapInfo, key_ptr: *const u8) -> bool {
    let h = (info.hasher)(key_ptr, 0);
    let was_present = probe::erase(map, info, key_ptr, h);
    if was_present {
        map.set_len(map.len() - 1);
    }
    was_present
}

/// # Safety
/// `map` must be a container previously allocated under `info`'s layout, or
/// unallocated.
pub unsafe fn clear<A: Allocator>(map: &mut RawMap<A>, info: &MapInfo) {
    if map.cap() > 0 {
        probe::clear(map, info);
    }
}

/// # Safety
/// `map` must be allocated under `info`'s layout, or unallocated.
pub unsafe fn reserve<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    n: usize,
) -> Result<(), MapError> {
    capacity::reserve(map, info, n)
}

/// # Safety
/// `map` must be allocated under `info`'s layout.
pub unsafe fn grow<A: Allocator + Clone>(map: &mut RawMap<A>, info: &MapInfo) -> Result<(), MapError> {
    capacity::grow(map, info)
}

/// # Safety
/// `map` must be allocated under `info`'s layout, or unallocated.
pub unsafe fn shrink<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
) -> Result<(), MapError> {
    capacity::shrink(map, info)
}

/// Free the container's current region, if any, leaving it unallocated.
pub fn free<A: Allocator>(map: &mut RawMap<A>, info: &MapInfo) {
    map.free_current(info);
}

pub fn len<A: Allocator>(map: &RawMap<A>) -> usize {
    map.len()
}

pub fn cap<A: Allocator>(map: &RawMap<A>) -> usize {
    map.cap()
}
