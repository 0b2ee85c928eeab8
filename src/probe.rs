//! The Robin Hood probing engine (spec.md §4.4).
//!
//! Grounded in the teacher's `shm::hashtable` control flow — a linear scan
//! from the desired slot, wrapping via `& mask`, returning on the first
//! empty bucket, comparing stored hash then bytewise key equality
//! (`ht_lookup`) — generalized from linear probing + backward-shift
//! deletion to Robin-Hood-with-swap displacement and tombstone marking.

use std::ptr;

use crate::alloc::Allocator;
use crate::descriptor::MapInfo;
use crate::raw::RawMap;
use crate::slot::{self, Hash};

#[inline]
unsafe fn copy_bytes(src: *const u8, dst: *mut u8, len: usize) {
    ptr::copy_nonoverlapping(src, dst, len);
}

/// Find the slot holding `key`, if present.
///
/// # Safety
/// `key_ptr` must point to a valid key of the descriptor's key type, and
/// `map` must be a container previously allocated with `info`'s cell
/// layout (or unallocated).
pub unsafe fn lookup<A: Allocator>(
    map: &RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
    h: Hash,
) -> Option<usize> {
    let cap = map.cap();
    if cap == 0 {
        return None;
    }
    let mask = cap - 1;
    let mut s = slot::desired(h, cap);
    let mut d = 0usize;

    loop {
        let e = *map.hash_ptr(info, s);
        if slot::empty(e) {
            return None;
        }
        if d > slot::probe_distance(e, s, cap) {
            return None;
        }
        if e == h && (info.equals)(key_ptr, map.key_ptr(info, s)) {
            return Some(s);
        }
        s = (s + 1) & mask;
        d += 1;
    }
}

/// Which buffer currently holds the triple being carried through a Robin
/// Hood displacement chain: the caller's original input, or one of the
/// two scratch slots reserved at the end of the allocation.
#[derive(Clone, Copy)]
enum Carry {
    Original,
    Scratch(usize),
}

/// Insert a *new* key known not to already be present, using Robin Hood
/// displacement. Does not touch `map`'s `len` — callers increment it
/// themselves, since this function is also used (with a stored hash, no
/// rehashing) during grow/shrink/reserve migration where `len` must not
/// change per migrated entry.
///
/// Returns the address of the value slot at which the *originally supplied*
/// triple ultimately (or first, if displaced) lands — per spec.md §4.4,
/// this is the address of the first slot the original triple ever occupies,
/// not the final resting place of the whole displacement chain.
///
/// # Safety
/// `map` must have nonzero capacity under `info`'s layout. `key_ptr` and
/// `value_ptr` must point to valid, initialized values of the descriptor's
/// key/value types, each exactly `info.key_cell.size_of_type` /
/// `info.value_cell.size_of_type` bytes.
pub unsafe fn insert_new<A: Allocator>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
    value_ptr: *const u8,
    h: Hash,
) -> *mut u8 {
    let cap = map.cap();
    debug_assert!(cap > 0);
    let mask = cap - 1;
    let mut s = slot::desired(h, cap);
    let mut d = 0usize;

    let mut carry = Carry::Original;
    let mut carry_hash = h;
    let mut result_ptr: Option<*mut u8> = None;

    loop {
        let hp = map.hash_ptr(info, s);
        let e = *hp;

        if slot::empty(e) {
            write_entry(map, info, s, carry, key_ptr, value_ptr, carry_hash);
            return result_ptr.unwrap_or_else(|| map.value_ptr(info, s));
        }

        let pd = slot::probe_distance(e, s, cap);
        if pd < d {
            if slot::tombstone(e) {
                write_entry(map, info, s, carry, key_ptr, value_ptr, carry_hash);
                return result_ptr.unwrap_or_else(|| map.value_ptr(info, s));
            }

            if result_ptr.is_none() {
                result_ptr = Some(map.value_ptr(info, s));
            }

            // Preserve the entry about to be overwritten into the scratch
            // buffer *not* currently holding the carry, then write the
            // carry into this slot and pick up the preserved entry.
            let next_scratch = match carry {
                Carry::Original => 0,
                Carry::Scratch(0) => 1,
                Carry::Scratch(_) => 0,
            };
            let displaced_key_size = info.key_cell.size_of_type;
            let displaced_value_size = info.value_cell.size_of_type;
            copy_bytes(
                map.key_ptr(info, s),
                map.scratch_key_ptr(info, next_scratch),
                displaced_key_size,
            );
            copy_bytes(
                map.value_ptr(info, s),
                map.scratch_value_ptr(info, next_scratch),
                displaced_value_size,
            );
            let displaced_hash = e;

            write_entry(map, info, s, carry, key_ptr, value_ptr, carry_hash);

            carry = Carry::Scratch(next_scratch);
            carry_hash = displaced_hash;
            d = pd;
        }

        s = (s + 1) & mask;
        d += 1;
    }
}

#[inline]
unsafe fn write_entry<A: Allocator>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    slot_idx: usize,
    carry: Carry,
    orig_key_ptr: *const u8,
    orig_value_ptr: *const u8,
    hash: Hash,
) {
    let (src_key, src_value) = match carry {
        Carry::Original => (orig_key_ptr, orig_value_ptr),
        Carry::Scratch(which) => (
            map.scratch_key_ptr(info, which) as *const u8,
            map.scratch_value_ptr(info, which) as *const u8,
        ),
    };
    copy_bytes(src_key, map.key_ptr(info, slot_idx), info.key_cell.size_of_type);
    copy_bytes(
        src_value,
        map.value_ptr(info, slot_idx),
        info.value_cell.size_of_type,
    );
    *map.hash_ptr(info, slot_idx) = hash;
}

/// Mark the slot holding `key` as a tombstone. Returns `true` if the key
/// was present. Does not touch `len` — callers decrement it.
///
/// # Safety
/// Same requirements as `lookup`.
pub unsafe fn erase<A: Allocator>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    key_ptr: *const u8,
    h: Hash,
) -> bool {
    match lookup(map, info, key_ptr, h) {
        Some(s) => {
            let hp = map.hash_ptr(info, s);
            *hp = slot::mark_tombstone(*hp);
            true
        }
        None => false,
    }
}

/// Zero every hash word, turning all slots empty. Keys/values are left in
/// place as dead data (spec.md §4.4 "Clear").
///
/// # Safety
/// `map` must be a container previously allocated under `info`'s layout.
pub unsafe fn clear<A: Allocator>(map: &mut RawMap<A>, info: &MapInfo) {
    let cap = map.cap();
    for i in 0..cap {
        *map.hash_ptr(info, i) = 0;
    }
    map.set_len(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::SystemAllocator;
    use crate::cell::CellInfo;

    unsafe fn equals_u64(a: *const u8, b: *const u8) -> bool {
        *(a as *const u64) == *(b as *const u64)
    }
    unsafe fn hash_u64(p: *const u8, _seed: u64) -> Hash {
        let v = *(p as *const u64);
        let h = v.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let masked = h & !(1u64 << 63);
        if masked == 0 {
            1
        } else {
            masked
        }
    }

    fn info_u64_u64() -> MapInfo {
        MapInfo::new(
            CellInfo::of::<u64>(),
            CellInfo::of::<u64>(),
            hash_u64,
            equals_u64,
        )
    }

    #[test]
    fn insert_then_lookup_roundtrip() {
        unsafe {
            let info = info_u64_u64();
            let mut map: RawMap<SystemAllocator> = RawMap::new(SystemAllocator);
            map.allocate_fresh(&info, crate::raw::MIN_LOG2).unwrap();

            for k in 0u64..40 {
                let v = k * 10;
                let h = hash_u64(&k as *const u64 as *const u8, 0);
                insert_new(&mut map, &info, &k as *const u64 as *const u8, &v as *const u64 as *const u8, h);
                map.set_len(map.len() + 1);
            }

            for k in 0u64..40 {
                let h = hash_u64(&k as *const u64 as *const u8, 0);
                let s = lookup(&map, &info, &k as *const u64 as *const u8, h).expect("present");
                let stored = *(map.value_ptr(&info, s) as *const u64);
                assert_eq!(stored, k * 10);
            }

            map.free_current(&info);
        }
    }

    #[test]
    fn erase_then_lookup_misses() {
        unsafe {
            let info = info_u64_u64();
            let mut map: RawMap<SystemAllocator> = RawMap::new(SystemAllocator);
            map.allocate_fresh(&info, crate::raw::MIN_LOG2).unwrap();

            let k = 7u64;
            let v = 77u64;
            let h = hash_u64(&k as *const u64 as *const u8, 0);
            insert_new(&mut map, &info, &k as *const u64 as *const u8, &v as *const u64 as *const u8, h);
            map.set_len(1);

            assert!(erase(&mut map, &info, &k as *const u64 as *const u8, h));
            assert!(lookup(&map, &info, &k as *const u64 as *const u8, h).is_none());
            assert!(!erase(&mut map, &info, &k as *const u64 as *const u8, h));

            map.free_current(&info);
        }
    }
}
