//! Growth, shrink, and reserve (spec.md §4.5).
//!
//! Grounded in the teacher's `ShmRegion::create_or_open` (allocate-or-reuse
//! decision) and `shm::mod::clear_inner`'s full-table rebuild loop —
//! generalized from "recreate the whole mmap file" to "allocate a new
//! region at a different `log2_capacity` and migrate live entries using
//! their already-stored hash, no rehashing".

use crate::alloc::Allocator;
use crate::descriptor::MapInfo;
use crate::error::MapError;
use crate::probe;
use crate::raw::{ceil_log2, load_factor_threshold, RawMap, MAX_LOG2, MIN_LOG2};
use crate::slot;

/// Allocate the very first region for a container, always at `MIN_LOG2`
/// regardless of any hinted size (spec.md §4.5 "Initial allocation").
///
/// # Safety
/// `map` must currently be unallocated (`cap() == 0`).
pub unsafe fn allocate_initial<A: Allocator>(
    map: &mut RawMap<A>,
    info: &MapInfo,
) -> Result<(), MapError> {
    map.allocate_fresh(info, MIN_LOG2)
}

/// Migrate every live (non-empty, non-tombstone) entry from `old` into a
/// freshly allocated region of `1 << new_log2` slots under `new`, using
/// each entry's already-stored hash (no rehashing), then free `old`.
///
/// # Safety
/// `old` must be allocated under `info`'s layout.
unsafe fn migrate<A: Allocator + Clone>(
    old: &mut RawMap<A>,
    info: &MapInfo,
    new_log2: u32,
) -> Result<(), MapError> {
    let old_cap = old.cap();
    let mut fresh: RawMap<A> = RawMap::new(old.allocator().clone());
    fresh.allocate_fresh(info, new_log2)?;

    for i in 0..old_cap {
        let h = *old.hash_ptr(info, i);
        if slot::valid(h) {
            probe::insert_new(&mut fresh, info, old.key_ptr(info, i), old.value_ptr(info, i), h);
        }
    }
    fresh.set_len(old.len());

    old.free_current(info);
    *old = fresh;
    Ok(())
}

/// Grow when `len + 1` would meet or exceed the load-factor threshold
/// (spec.md §4.5). Allocates the very first region at `MIN_LOG2` if the
/// container is currently empty.
///
/// # Safety
/// None beyond the usual descriptor-matches-allocation requirement.
pub unsafe fn ensure_capacity_for_insert<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
) -> Result<(), MapError> {
    if map.cap() == 0 {
        return allocate_initial(map, info);
    }
    if map.len() + 1 >= load_factor_threshold(map.cap()) {
        grow(map, info)?;
    }
    Ok(())
}

/// Unconditionally grow to the next power-of-two capacity and migrate all
/// live entries (spec.md §4.5 "Grow").
///
/// # Safety
/// `map` must be allocated under `info`'s layout.
pub unsafe fn grow<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
) -> Result<(), MapError> {
    let new_log2 = map.log2_cap() + 1;
    if new_log2 > MAX_LOG2 {
        return Err(MapError::CapacityOverflow);
    }
    migrate(map, info, new_log2)
}

/// Shrink to half capacity if the load factor at the smaller capacity
/// would not be exceeded; otherwise a no-op (spec.md §4.5 "Shrink").
/// Never shrinks below `MIN_LOG2` (64 slots), preserving the `cap >= 64`
/// invariant of spec.md §3.
///
/// # Safety
/// `map` must be allocated under `info`'s layout, or unallocated.
pub unsafe fn shrink<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
) -> Result<(), MapError> {
    if map.cap() == 0 || map.log2_cap() <= MIN_LOG2 {
        return Ok(());
    }
    let half_cap = map.cap() / 2;
    if map.len() >= load_factor_threshold(half_cap) {
        return Ok(());
    }
    migrate(map, info, map.log2_cap() - 1)
}

/// Reserve capacity for at least `n` total entries (spec.md §4.5
/// "Reserve").
///
/// Preserves a documented quirk of the source this spec was distilled
/// from: when the container is currently unallocated, the first
/// allocation always lands at `MIN_LOG2` regardless of the requested `n` —
/// see spec.md §9's open question on this exact behavior, and the literal
/// scenario in spec.md §8 (#4) that pins it. Reserving on a container that
/// already has an allocation uses the requested size as normal.
///
/// # Safety
/// `map` must be allocated under `info`'s layout, or unallocated.
pub unsafe fn reserve<A: Allocator + Clone>(
    map: &mut RawMap<A>,
    info: &MapInfo,
    n: usize,
) -> Result<(), MapError> {
    let log2_new = ceil_log2(n.max(1 << MIN_LOG2));
    if map.cap() >= 1usize << log2_new {
        return Ok(());
    }
    if map.cap() == 0 {
        allocate_initial(map, info)
    } else {
        migrate(map, info, log2_new)
    }
}
