use folio_extract::Skipped;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counters for everything that was skipped, dropped or guessed while
/// assembling books and merging their content.
///
/// None of these are errors, but a non-zero count usually means the captured
/// pages don't look like the rest of the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagnostics {
    #[serde(flatten)]
    pub skipped: Skipped,
    /// Pages discarded because the table of contents didn't list them.
    pub dropped_pages: usize,
    /// Table-of-contents entries without a captured page.
    pub placeholder_pages: usize,
    /// Pages the navigation chain couldn't place, moved ahead of the chain.
    pub unchained_pages: usize,
    /// Captured files that couldn't be read and were left out of their book.
    pub unreadable_pages: usize,
    /// Persisted references whose fragment could no longer be re-extracted.
    pub missing_fragments: usize,
    /// Content references folded into an earlier one with the same identifier.
    pub merged_duplicates: usize,
    /// Merges that replaced a fragment with a different one.
    pub conflicting_fragments: usize,
    /// Books that couldn't be loaded.
    pub failed_books: Vec<String>,
}
impl Diagnostics {
    /// Returns `true` when nothing was skipped or guessed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
            && self.dropped_pages == 0
            && self.placeholder_pages == 0
            && self.unchained_pages == 0
            && self.unreadable_pages == 0
            && self.missing_fragments == 0
            && self.conflicting_fragments == 0
            && self.failed_books.is_empty()
    }
}
impl AddAssign for Diagnostics {
    fn add_assign(&mut self, other: Self) {
        self.skipped += other.skipped;
        self.dropped_pages += other.dropped_pages;
        self.placeholder_pages += other.placeholder_pages;
        self.unchained_pages += other.unchained_pages;
        self.unreadable_pages += other.unreadable_pages;
        self.missing_fragments += other.missing_fragments;
        self.merged_duplicates += other.merged_duplicates;
        self.conflicting_fragments += other.conflicting_fragments;
        self.failed_books.extend(other.failed_books);
    }
}
impl From<Skipped> for Diagnostics {
    fn from(skipped: Skipped) -> Self {
        Self { skipped, ..Default::default() }
    }
}
