//! `MapInfo`: the type-erased descriptor that lets the probing engine
//! operate on a table whose concrete key/value types are not known at the
//! call site.
//!
//! Grounded in the teacher's `layout::Header` (a fixed record of table
//! parameters read by every `shm::hashtable`/`shm::ordering` function) —
//! generalized here from "cache parameters" (capacity, slot size, strategy)
//! to "type parameters" (key/value cell layout, hash and equality
//! functions), dispatched through function pointers per spec.md §9.

use crate::cell::CellInfo;
use crate::slot::Hash;

/// `hasher(key_ptr, seed) -> word`. Implementations MUST mask off the top
/// bit and coerce a zero result to 1 (spec.md §4.3's slot contract).
///
/// # Safety
/// `key_ptr` must point to a valid, initialized value of the descriptor's
/// key type.
pub type HasherFn = unsafe fn(key_ptr: *const u8, seed: u64) -> Hash;

/// `equals(a, b) -> bool`.
///
/// # Safety
/// Both pointers must point to valid, initialized values of the
/// descriptor's key type.
pub type EqualsFn = unsafe fn(a: *const u8, b: *const u8) -> bool;

/// Immutable record describing one map's key type, value type, hasher, and
/// equality function. A single `RawMap` can be driven by any `MapInfo`
/// whose key/value cell layout matches the memory it was allocated with —
/// this is what lets the typed and type-erased APIs interoperate on one
/// container instance.
#[derive(Clone, Copy)]
pub struct MapInfo {
    pub key_cell: CellInfo,
    pub value_cell: CellInfo,
    pub hasher: HasherFn,
    pub equals: EqualsFn,
}

impl MapInfo {
    pub const fn new(
        key_cell: CellInfo,
        value_cell: CellInfo,
        hasher: HasherFn,
        equals: EqualsFn,
    ) -> Self {
        MapInfo {
            key_cell,
            value_cell,
            hasher,
            equals,
        }
    }
}
