//! Support for fast select queries.

/// Interface for types that can locate set bits by rank.
pub trait Select1Support {
    /// The position of the `index`th 1 bit, where `index` counts from 1.
    ///
    /// Returns `None` when `index` is 0 or exceeds the number of 1 bits.
    fn select1(&self, index: u64) -> Option<u64>;
}
