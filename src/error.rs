//! Ambient error handling (spec.md §7).
//!
//! The teacher surfaces `std::io::Error` at its own (file/mmap) resource
//! boundary. This crate's only failure surface is allocation, so it gets a
//! small `thiserror`-derived enum, the same convention this retrieval pack
//! uses elsewhere for leaf-crate errors (e.g. `forest_auth`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// The allocator refused to provide memory for a requested region.
    #[error("allocator refused to provide memory for the requested region")]
    OutOfMemory,

    /// The requested `log2_capacity` exceeds the maximum representable
    /// value (63 — the tagged base pointer reserves 6 low bits).
    #[error("requested capacity exceeds the maximum representable log2 capacity (63)")]
    CapacityOverflow,
}
