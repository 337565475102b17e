#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod callbacks;

pub mod capacity;

pub mod config;

mod error;

/// A HashMap implementation using Robin Hood hashing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a key-value map interface with configurable hashers.
pub mod hash_map;

/// A hash multiset implementation using Robin Hood hashing.
///
/// Each distinct value is stored once together with its multiplicity.
pub mod hash_multiset;

/// A hash set implementation using Robin Hood hashing.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

/// The open-addressing engine shared by every container.
pub mod hash_table;

#[cfg(test)]
pub(crate) mod tests;

pub use callbacks::Callbacks;
pub use config::DeletionMode;
pub use config::TableConfig;
pub use error::Result;
pub use error::Status;
pub use error::TableError;
pub use hash_map::HashMap;
pub use hash_multiset::HashMultiset;
pub use hash_set::HashSet;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is given.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// Placeholder hasher builder for builds without `std` or `foldhash`.
        ///
        /// It cannot be constructed; pass a hasher builder explicitly.
        pub enum DefaultHashBuilder {}
    }
}
