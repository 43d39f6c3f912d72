//! Support for fast rank queries.

/// Interface for types that can count set bits preceding a position.
pub trait BitRankSupport {
    /// The size of the vector being ranked.
    ///
    /// Rank queries beyond this point keep returning the same totals, so
    /// `limit` is one past the last place the rank changes.
    fn limit(&self) -> u64;

    /// The number of 1 bits strictly before `position`.
    ///
    /// Saturates at the total 1 count for `position >= limit()`.
    fn rank1(&self, position: u64) -> u64;

    /// The number of 0 bits strictly before `position`.
    ///
    /// Saturates at the total 0 count for `position >= limit()`.
    fn rank0(&self, position: u64) -> u64 {
        position.min(self.limit()) - self.rank1(position)
    }
}
