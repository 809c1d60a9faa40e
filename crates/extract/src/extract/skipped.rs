use std::ops::AddAssign;

/// Counters for markup that was silently skipped during extraction.
///
/// Skipping is not an error (captured pages are heterogeneous), but some of
/// these are worth comparing against expectations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skipped {
    /// Table-of-contents anchors whose `href` didn't canonicalize.
    pub unresolved_links: usize,
    /// Reference anchors whose target lacked the numeric identifier prefix.
    pub malformed_identifiers: usize,
    /// Stat-block titles without any recognizable reference anchor.
    pub unreferenced_stat_blocks: usize,
}
impl Skipped {
    pub fn total(&self) -> usize {
        self.unresolved_links + self.malformed_identifiers + self.unreferenced_stat_blocks
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
impl AddAssign for Skipped {
    fn add_assign(&mut self, other: Self) {
        self.unresolved_links += other.unresolved_links;
        self.malformed_identifiers += other.malformed_identifiers;
        self.unreferenced_stat_blocks += other.unreferenced_stat_blocks;
    }
}
