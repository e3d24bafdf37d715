use thiserror::Error;

/// Errors reported by [`CoalescedTable`](crate::CoalescedTable),
/// [`CoalescedSet`](crate::CoalescedSet) and [`Lookup`](crate::Lookup).
///
/// Every error is local and recoverable: the table is left exactly as it was
/// before the failing call and remains usable afterwards.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The value being inserted is already stored in the table.
    #[error("value is already present in the table")]
    DuplicateKey,
    /// The free-slot scan ran off the bottom of the table.
    #[error("table is full ({capacity} slots)")]
    TableFull {
        /// Number of slots in the table.
        capacity: usize,
    },
    /// An absent [`Lookup`](crate::Lookup) was dereferenced.
    #[error("lookup result does not reference a value")]
    AbsentValue,
    /// The requested capacity was zero or its next prime does not fit in
    /// `usize`.
    #[error("invalid table capacity requested: {requested}")]
    InvalidCapacity {
        /// The capacity that was asked for.
        requested: usize,
    },
    /// The operation is not implemented by coalesced tables.
    #[error("operation is not supported by coalesced hash tables")]
    Unsupported,
}
