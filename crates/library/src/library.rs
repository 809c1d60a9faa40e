use crate::book::{Book, BookChanges};
use crate::diagnostics::Diagnostics;
use crate::error::{ErrorKind, Result};
use crate::fs;
use crate::merge::{Merged, Merger};
use crate::sources::{DEFAULT_SOURCES_FILE, Sources};
use exn::ResultExt;
use folio_extract::Normalize;
use folio_extract::models::{ContentKind, ContentReference};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const DEFAULT_STATE_FILE: &str = "library.json";

/// Where a library lives and what it is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryOptions {
    pub name: String,
    /// Folder holding the sources listing and the `sources/` book folders
    pub root: PathBuf,
    /// Sources listing document, relative to `root`
    pub sources_file: PathBuf,
    /// Persisted library, relative to `root`
    pub state_file: PathBuf,
}
impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            name: "library".to_string(),
            root: PathBuf::from("."),
            sources_file: PathBuf::from(DEFAULT_SOURCES_FILE),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}
impl LibraryOptions {
    pub fn state_path(&self) -> PathBuf {
        self.root.join(&self.state_file)
    }
}

/// Which books [`Library::book_names`] lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookFilter {
    #[default]
    All,
    UpdateAvailable(bool),
    Valid(bool),
}

/// Which books content is extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Acronyms(Vec<String>),
    Names(Vec<String>),
}

/// Library-wide content set, one reference per identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub references: Vec<ContentReference>,
    pub diagnostics: Diagnostics,
}

/// A captured library: the sources listing plus every book it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    pub path: PathBuf,
    pub sources: Sources,
    /// Books in listing order, unique by name
    #[serde(default)]
    pub books: Vec<Book>,
}

impl Library {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, sources_file: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            sources: Sources::new(&path, sources_file),
            path,
            books: Vec::new(),
        }
    }

    /// Reloads the persisted library if there is one, or starts an empty one.
    pub fn open(options: &LibraryOptions) -> Result<Self> {
        let state = options.state_path();
        if state.is_file() {
            return Self::from_json_file(&state);
        }
        Ok(Self::new(&options.name, &options.root, &options.sources_file))
    }

    /// Adds a book, unique by name. Returns `false` when a book with the same
    /// name already existed and `replace` wasn't set.
    pub fn add_book(&mut self, book: Book, replace: bool) -> bool {
        match self.books.iter().position(|b| b.name == book.name) {
            None => self.books.push(book),
            Some(index) if replace => self.books[index] = book,
            Some(_) => return false,
        }
        true
    }

    pub fn book(&self, name: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.name == name)
    }

    pub fn book_mut(&mut self, name: &str) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.name == name)
    }

    pub fn book_by_acronym(&self, acronym: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.acronym == acronym)
    }

    pub fn book_names(&self, filter: BookFilter) -> Vec<&str> {
        self.books
            .iter()
            .filter(|book| match filter {
                BookFilter::All => true,
                BookFilter::UpdateAvailable(expected) => book.update_available() == expected,
                BookFilter::Valid(expected) => book.validate() == expected,
            })
            .map(|book| book.name.as_str())
            .collect()
    }

    /// Number of books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Adds every book of the sources listing. Returns how many were added.
    #[instrument(skip(self), fields(library = %self.name))]
    pub fn load_sources(&mut self, replace: bool) -> Result<usize> {
        self.sources.refresh()?;
        let mut added = 0;
        for listing in self.sources.listings()? {
            if self.add_book(Book::from_listing(&listing, &self.path), replace) {
                added += 1;
            }
        }
        let owned = self.books.iter().filter(|book| book.is_owned()).count();
        tracing::info!(books = self.books.len(), owned, added, "loaded sources listing");
        Ok(added)
    }

    /// Loads the folder of every owned book not named in `skip`. A book that
    /// fails to load is logged and recorded, never aborting the others.
    #[instrument(skip(self, skip), fields(library = %self.name))]
    pub fn load_books(&mut self, skip: &[String]) -> Diagnostics {
        let mut diagnostics = Diagnostics::default();
        for book in self.books.iter_mut().filter(|book| book.is_owned() && !skip.contains(&book.name)) {
            match book.load_folder() {
                Ok(loaded) => diagnostics += loaded,
                Err(err) => {
                    tracing::warn!(book = %book.name, error = %err, "failed to load book");
                    diagnostics.failed_books.push(book.name.clone());
                },
            }
        }
        diagnostics
    }

    fn selected(&self, selection: &Selection) -> Vec<&Book> {
        match selection {
            Selection::All => self.books.iter().collect(),
            Selection::Acronyms(acronyms) => acronyms.iter().filter_map(|a| self.book_by_acronym(a)).collect(),
            Selection::Names(names) => names.iter().filter_map(|n| self.book(n)).collect(),
        }
    }

    /// Extracts content references from the selected books and merges them
    /// into one reference per identifier. Only owned, valid books not named in
    /// `skip` are read.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Extract`] if `normalize` names an invalid selector.
    #[instrument(skip(self, normalize, skip), fields(library = %self.name, references))]
    pub fn content(
        &self,
        selection: &Selection,
        kinds: &[ContentKind],
        normalize: &Normalize,
        skip: &[String],
    ) -> Result<Content> {
        let normalizer = normalize.compile().or_raise(|| ErrorKind::Extract)?;
        let mut diagnostics = Diagnostics::default();
        let mut merger = Merger::new();
        for book in self.selected(selection) {
            if !book.is_owned() || !book.validate() || skip.contains(&book.name) {
                continue;
            }
            match book.content(kinds, &normalizer) {
                Ok(extraction) => {
                    tracing::info!(book = %book.name, references = extraction.references.len(), "extracted content");
                    diagnostics.skipped += extraction.skipped;
                    merger.extend(extraction.references.into_iter().map(|mut reference| {
                        for provenance in &mut reference.sources {
                            provenance.library = Some(self.name.clone());
                        }
                        reference
                    }));
                },
                Err(err) => {
                    tracing::warn!(book = %book.name, error = %err, "failed to extract content");
                    diagnostics.failed_books.push(book.name.clone());
                },
            }
        }
        let Merged {
            references,
            merged_duplicates,
            conflicting_fragments,
        } = merger.finish();
        diagnostics.merged_duplicates = merged_duplicates;
        diagnostics.conflicting_fragments = conflicting_fragments;
        tracing::Span::current().record("references", references.len());
        Ok(Content { references, diagnostics })
    }

    pub fn magic_items(&self, selection: &Selection, normalize: &Normalize, skip: &[String]) -> Result<Content> {
        self.content(selection, &[ContentKind::MagicItem], normalize, skip)
    }

    pub fn monsters(&self, selection: &Selection, normalize: &Normalize, skip: &[String]) -> Result<Content> {
        self.content(selection, &[ContentKind::Monster], normalize, skip)
    }

    pub fn spells(&self, selection: &Selection, normalize: &Normalize, skip: &[String]) -> Result<Content> {
        self.content(selection, &[ContentKind::Spell], normalize, skip)
    }

    /// Re-reads a stale sources listing (keeping known books as they are) and
    /// updates every book with changes on disk.
    #[instrument(skip(self), fields(library = %self.name))]
    pub fn update(&mut self) -> Result<Diagnostics> {
        if self.sources.update_available() {
            self.load_sources(false)?;
        }
        let mut diagnostics = Diagnostics::default();
        for book in self.books.iter_mut().filter(|book| book.update_available()) {
            match book.update(BookChanges::default()) {
                Ok(updated) => diagnostics += updated,
                Err(err) => {
                    tracing::warn!(book = %book.name, error = %err, "failed to update book");
                    diagnostics.failed_books.push(book.name.clone());
                },
            }
        }
        Ok(diagnostics)
    }

    /// Returns `true` if the sources listing or any book changed on disk.
    pub fn update_available(&self) -> bool {
        self.sources.update_available() || self.books.iter().any(Book::update_available)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).or_raise(|| ErrorKind::InvalidData)?;
        fs::write(path, &json)?;
        tracing::info!(path = %path.display(), books = self.books.len(), "saved library");
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json).or_raise(|| ErrorKind::InvalidData)?)
    }
}
