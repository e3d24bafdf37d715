#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Table configuration: insertion strategy and cellar size.
pub mod config;

/// Error type shared by every table operation.
pub mod error;

pub mod hash_table;

/// A hash set backed by a coalesced table.
///
/// This module provides a `CoalescedSet` that wraps the `CoalescedTable` and
/// hashes values with a configurable hasher builder.
pub mod hash_set;

/// Hashers for coalesced tables.
pub mod hasher;

/// The result type returned by lookups.
pub mod lookup;

#[cfg(feature = "stats")]
pub mod stats;

pub use config::Config;
pub use config::DEFAULT_ADDRESS_FACTOR;
pub use config::Insertion;
pub use config::ParseVariantError;
pub use config::Variant;
pub use error::Error;
pub use hash_set::CoalescedSet;
pub use hash_table::CoalescedTable;
pub use hasher::DefaultHashBuilder;
pub use hasher::IdentityHasher;
pub use hasher::IdentityState;
pub use lookup::Lookup;
#[cfg(feature = "stats")]
pub use stats::ChainStats;
