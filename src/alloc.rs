//! The allocator capability (spec.md §3, §4.6, §5).
//!
//! Grounded in the teacher's `ShmRegion`, which owns exactly one memory
//! region for the table's whole lifetime, sizes it once via
//! `layout::region_size`, and is handed that same size back at teardown.
//! Here the "region" is generalized from a named mmap'd file to a plain
//! heap allocation, and the owner is a caller-supplied capability rather
//! than a fixed `memmap2`/`libc` backend — a target-agnostic reading of
//! spec.md §9's note that a caller-supplied allocator is assumed.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// An allocator capability: given a size and alignment, returns a pointer
/// to that much memory or `None` on failure. Deallocation receives the
/// exact same size and alignment it was allocated with (a typed-free
/// contract, matching spec.md §4.6: "freeing supplies the same size to the
/// allocator so size-tracking allocators can reuse their bookkeeping").
pub trait Allocator {
    fn alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>>;

    /// # Safety
    /// `ptr` must have been returned by a prior `alloc` call on this same
    /// allocator with the identical `size` and `align`.
    unsafe fn dealloc(&self, ptr: NonNull<u8>, size: usize, align: usize);
}

/// Default allocator: the process's global allocator via `std::alloc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size, align).ok()?;
        // SAFETY: layout has nonzero size whenever this crate calls alloc
        // (the smallest region is 5 cache-line-aligned segments for a
        // minimum 64-slot table, never zero).
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr)
    }

    unsafe fn dealloc(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        let layout = Layout::from_size_align_unchecked(size, align);
        dealloc(ptr.as_ptr(), layout);
    }
}
