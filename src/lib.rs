//! A cache-line-packed, Robin Hood open-addressed hash table with a dual
//! typed/type-erased API sharing one in-memory layout.
//!
//! The typed entry point is [`RobinMap`]; the type-erased operations table
//! lives in [`erased`] and operates directly on a [`RawMap`] plus a
//! [`MapInfo`] descriptor. Both paths read and write the identical bytes,
//! so a container built with one can be driven by the other.
//!
//! ```
//! use robin_map::RobinMap;
//!
//! let mut map: RobinMap<u64, u64> = RobinMap::new();
//! map.insert(1, 100).unwrap();
//! assert_eq!(map.get(&1), Some(&100));
//! ```

pub mod alloc;
pub mod capacity;
pub mod cell;
pub mod descriptor;
pub mod erased;
pub mod error;
pub mod hash;
pub mod probe;
pub mod raw;
pub mod slot;
pub mod typed;

pub use alloc::{Allocator, SystemAllocator};
pub use cell::CellInfo;
pub use descriptor::{EqualsFn, HasherFn, MapInfo};
pub use error::MapError;
pub use hash::DefaultHashBuilder;
pub use raw::RawMap;
pub use slot::Hash;
pub use typed::RobinMap;
