//! Index generation stamps.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing identifier tagging a built search-index
/// directory (`search_index/<generation>/`), enabling the atomic
/// directory-swap rebuild protocol described in the design's §5/§6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// The first generation ever produced.
    pub const FIRST: Self = Self(1);

    /// Construct a generation from a raw stamp (used when reading a
    /// previously-written directory name back from disk).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric stamp, used as the directory name.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The next generation after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:020}", self.0)
    }
}

/// Allocates strictly increasing [`Generation`] stamps for one server
/// process. Persisted state (the highest generation directory already on
/// disk) seeds the counter at startup; see `swagger-mcp-storage`.
#[derive(Debug)]
pub struct GenerationCounter(AtomicU64);

impl GenerationCounter {
    /// Start counting from `seed` (exclusive — the first call to
    /// [`Self::next`] returns `seed + 1`).
    #[must_use]
    pub fn seeded_at(seed: Generation) -> Self {
        Self(AtomicU64::new(seed.as_u64()))
    }

    /// Allocate the next generation stamp.
    pub fn next(&self) -> Generation {
        Generation(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_increase_monotonically() {
        let counter = GenerationCounter::seeded_at(Generation::from_raw(0));
        let a = counter.next();
        let b = counter.next();
        assert!(b > a);
        assert_eq!(a, Generation::FIRST);
    }

    #[test]
    fn display_is_zero_padded_for_lexicographic_sort() {
        let g = Generation::from_raw(7);
        assert_eq!(g.to_string(), "00000000000000000007");
    }
}
