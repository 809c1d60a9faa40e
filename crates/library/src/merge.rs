use folio_extract::models::ContentReference;
use std::collections::HashMap;

/// Folds content references from every book into one reference per
/// identifier.
///
/// The first occurrence of an identifier is kept as-is. Every later occurrence
/// appends its provenance and replaces the fragment, its hash, its path and
/// its modification time: the last occurrence in iteration order wins, whether
/// or not it is the most recently modified.
#[derive(Debug, Default)]
pub struct Merger {
    references: Vec<ContentReference>,
    index: HashMap<String, usize>,
    merged_duplicates: usize,
    conflicting_fragments: usize,
}

/// The library-wide content set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Merged {
    /// One reference per identifier, in first-seen order.
    pub references: Vec<ContentReference>,
    pub merged_duplicates: usize,
    /// Merges where the replaced fragment differed from the new one.
    pub conflicting_fragments: usize,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reference: ContentReference) {
        let Some(&position) = self.index.get(&reference.id) else {
            self.index.insert(reference.id.clone(), self.references.len());
            self.references.push(reference);
            return;
        };
        let existing = &mut self.references[position];
        self.merged_duplicates += 1;
        if existing.hash != reference.hash {
            self.conflicting_fragments += 1;
            tracing::debug!(id = %reference.id, "merged content reference with a different fragment");
        }
        existing.sources.extend(reference.sources);
        existing.modified = reference.modified;
        existing.path = reference.path;
        existing.html = reference.html;
        existing.hash = reference.hash;
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn finish(self) -> Merged {
        Merged {
            references: self.references,
            merged_duplicates: self.merged_duplicates,
            conflicting_fragments: self.conflicting_fragments,
        }
    }
}
impl Extend<ContentReference> for Merger {
    fn extend<I: IntoIterator<Item = ContentReference>>(&mut self, iter: I) {
        for reference in iter {
            self.push(reference);
        }
    }
}
impl FromIterator<ContentReference> for Merger {
    fn from_iter<I: IntoIterator<Item = ContentReference>>(iter: I) -> Self {
        let mut merger = Self::new();
        merger.extend(iter);
        merger
    }
}
