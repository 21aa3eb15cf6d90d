#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The raw extendible hash table.
///
/// `HashTable` stores values in fixed-capacity buckets reached through a
/// directory indexed by the low-order bits of a caller-supplied hash.
pub mod hash_table;

/// A hash set implementation using extendible hashing.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

#[cfg(all(test, feature = "std"))]
mod proptests;

pub use hash_set::HashSet;
pub use hash_table::DEFAULT_BUCKET_CAPACITY;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`HashSet`] when none is named.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`HashSet`] when none is named.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder used when neither `foldhash` nor `std` is enabled. It
        /// cannot be constructed, so a hasher must be passed to
        /// [`HashSet::with_hasher`].
        pub enum DefaultHashBuilder {}
    }
}
