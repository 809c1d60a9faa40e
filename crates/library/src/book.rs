use crate::diagnostics::Diagnostics;
use crate::error::{ErrorKind, Result};
use crate::fs;
use crate::order::{self, Ordered};
use crate::page::{Page, Toc};
use folio_extract::models::{BookOrigin, ContentKind, Listing, PageKind, Provenance};
use folio_extract::{Extraction, Normalizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::instrument;

/// One source book: an ordered sequence of pages plus an optional table of
/// contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub acronym: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Folder holding the captured pages
    pub path: PathBuf,
    /// Whether the content is accessible (owned) on the site
    #[serde(default)]
    pub owned: bool,
    #[serde(default)]
    pub toc: Option<Toc>,
    /// Pages in reading order
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// Looks a page up by one of its identifying fields.
#[derive(Debug, Clone, Copy)]
pub enum PageKey<'a> {
    Name(&'a str),
    File(&'a Path),
    Path(&'a Path),
    /// Suffix match, so a canonical identifier finds the captured page.
    Url(&'a str),
}

/// Field edits applied by [`Book::update`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub url: Option<String>,
    pub path: Option<PathBuf>,
    pub owned: Option<bool>,
}

impl Book {
    pub fn new(name: impl Into<String>, acronym: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            acronym: acronym.into(),
            url: None,
            path: path.into(),
            owned: false,
            toc: None,
            pages: Vec::new(),
        }
    }

    /// A book entry of the sources listing, located under the library `root`.
    pub fn from_listing(listing: &Listing, root: &Path) -> Self {
        Self {
            url: Some(listing.url.clone()),
            owned: listing.owned,
            ..Self::new(&listing.name, &listing.acronym, root.join(&listing.local_path))
        }
    }

    /// Adds a page, unique by path. Returns `false` when a page with the same
    /// path already existed and `replace` wasn't set.
    pub fn add_page(&mut self, page: Page, replace: bool) -> bool {
        let existing = page
            .path
            .as_deref()
            .and_then(|path| self.pages.iter().position(|p| p.path.as_deref() == Some(path)));
        match existing {
            None => self.pages.push(page),
            Some(index) if replace => self.pages[index] = page,
            Some(_) => return false,
        }
        true
    }

    /// Sets the table of contents unless one is already present.
    pub fn set_toc(&mut self, toc: Toc, replace: bool) -> bool {
        if self.toc.is_some() && !replace {
            return false;
        }
        self.toc = Some(toc);
        true
    }

    pub fn page(&self, key: PageKey<'_>) -> Option<&Page> {
        self.pages.iter().find(|page| match key {
            PageKey::Name(name) => page.name.as_deref() == Some(name),
            PageKey::File(file) => page.file.as_deref() == Some(file),
            PageKey::Path(path) => page.path.as_deref() == Some(path),
            PageKey::Url(url) => page.url.as_deref().is_some_and(|own| folio_extract::matches_canonical(own, url)),
        })
    }

    /// Number of pages, placeholders included.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn folder_exists(&self) -> bool {
        self.path.is_dir()
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Latest modification time over the table of contents and every page.
    pub fn last_modified(&self) -> Option<OffsetDateTime> {
        self.toc.iter().map(|toc| &toc.page).chain(&self.pages).filter_map(|page| page.modified).max()
    }

    /// Reads every `.html` file of the book folder and puts the pages in
    /// reading order. The first table-of-contents page found becomes the
    /// book's table of contents.
    #[instrument(skip(self), fields(book = %self.name))]
    pub fn load_folder(&mut self) -> Result<Diagnostics> {
        if !self.folder_exists() {
            exn::bail!(ErrorKind::NotFound(self.path.clone()));
        }
        let mut diagnostics = Diagnostics::default();
        for file in fs::html_files(&self.path)? {
            let page = match Page::from_file(&file, &self.path) {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(file = %file.display(), error = %err, "skipping unreadable page");
                    diagnostics.unreadable_pages += 1;
                    continue;
                },
            };
            match page.kind {
                PageKind::Toc if self.toc.is_none() => {
                    let (toc, order) = Toc::from_page(page)?;
                    diagnostics.skipped += order.skipped;
                    self.toc = Some(toc);
                },
                PageKind::Toc => {
                    tracing::debug!(file = ?page.file, "ignoring additional table of contents");
                },
                _ => {
                    self.add_page(page, false);
                },
            }
        }
        diagnostics += self.reorder();
        tracing::info!(pages = self.pages.len(), toc = self.toc.is_some(), "loaded book");
        Ok(diagnostics)
    }

    /// Re-reads the table of contents and rebinds the pages to it.
    #[instrument(skip(self), fields(book = %self.name))]
    pub fn load_toc(&mut self) -> Result<Diagnostics> {
        let Some(toc) = self.toc.as_mut() else {
            return Ok(Diagnostics::default());
        };
        let mut diagnostics = Diagnostics::from(toc.refresh()?.skipped);
        diagnostics += self.reorder();
        Ok(diagnostics)
    }

    /// Puts the captured pages back in reading order. Placeholders are
    /// rebuilt from the table of contents.
    fn reorder(&mut self) -> Diagnostics {
        let pages: Vec<Page> = std::mem::take(&mut self.pages).into_iter().filter(|p| !p.is_placeholder()).collect();
        let urls = self.toc.as_ref().map(|toc| toc.urls.as_slice()).unwrap_or_default();
        let Ordered {
            pages,
            dropped,
            placeholders,
            unchained,
        } = order::order(urls, pages);
        if dropped > 0 {
            tracing::warn!(book = %self.name, dropped, "pages not listed in the table of contents were dropped");
        }
        if unchained > 0 {
            tracing::warn!(book = %self.name, unchained, "navigation chain is broken; unplaced pages moved ahead of it");
        }
        self.pages = pages;
        Diagnostics {
            dropped_pages: dropped,
            placeholder_pages: placeholders,
            unchained_pages: unchained,
            ..Default::default()
        }
    }

    /// Applies `changes`, then brings the book up to date with its folder:
    /// a stale table of contents is re-read, stale pages are refreshed, and a
    /// book that was never loaded is loaded if its folder has anything in it.
    #[instrument(skip(self, changes), fields(book = %self.name))]
    pub fn update(&mut self, changes: BookChanges) -> Result<Diagnostics> {
        let BookChanges {
            name,
            acronym,
            url,
            path,
            owned,
        } = changes;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(acronym) = acronym {
            self.acronym = acronym;
        }
        if let Some(path) = path {
            self.path = path;
        }
        self.url = url.or(self.url.take());
        self.owned = owned.unwrap_or(self.owned);

        let mut diagnostics = Diagnostics::default();
        let mut changed = false;
        if let Some(toc) = self.toc.as_mut()
            && toc.update_available()
        {
            diagnostics.skipped += toc.refresh()?.skipped;
            changed = true;
        }
        if !self.pages.is_empty() {
            for page in self.pages.iter_mut().filter(|page| page.update_available()) {
                tracing::debug!(file = ?page.file, "refreshing page");
                if let Err(err) = page.refresh() {
                    tracing::warn!(file = ?page.file, error = %err, "failed to refresh page");
                    diagnostics.unreadable_pages += 1;
                }
                changed = true;
            }
        } else if fs::has_entries(&self.path) {
            diagnostics += self.load_folder()?;
            return Ok(diagnostics);
        }
        if changed {
            diagnostics += self.reorder();
        }
        Ok(diagnostics)
    }

    /// Returns `true` if any file of the book changed since it was last read,
    /// or if the book was never loaded but its folder has content.
    pub fn update_available(&self) -> bool {
        if self.toc.as_ref().is_some_and(Toc::update_available) {
            return true;
        }
        match self.pages.is_empty() {
            false => self.pages.iter().any(Page::update_available),
            true => fs::has_entries(&self.path),
        }
    }

    /// The book folder, its table of contents and every captured page exist.
    /// Placeholders don't count: they never had a file.
    pub fn validate(&self) -> bool {
        self.folder_exists()
            && self.toc.as_ref().is_none_or(Toc::validate)
            && self.pages.iter().filter(|page| !page.is_placeholder()).all(Page::validate)
    }

    pub(crate) fn origin(&self) -> BookOrigin {
        BookOrigin {
            name: Some(self.name.clone()),
            acronym: Some(self.acronym.clone()),
            url: self.url.clone(),
            path: Some(self.path.clone()),
        }
    }

    /// Content references of every captured page, in reading order, each
    /// carrying this book and its page as provenance.
    #[instrument(skip(self, normalizer), fields(book = %self.name, references))]
    pub fn content(&self, kinds: &[ContentKind], normalizer: &Normalizer) -> Result<Extraction> {
        let mut content = Extraction::default();
        for page in self.pages.iter().filter(|page| !page.is_placeholder()) {
            let extraction = page.content(kinds, normalizer)?;
            content.skipped += extraction.skipped;
            content.references.extend(extraction.references.into_iter().map(|reference| {
                reference.with_provenance(Provenance {
                    library: None,
                    book: self.origin(),
                    page: page.origin(),
                })
            }));
        }
        tracing::Span::current().record("references", content.references.len());
        Ok(content)
    }

    pub fn magic_items(&self, normalizer: &Normalizer) -> Result<Extraction> {
        self.content(&[ContentKind::MagicItem], normalizer)
    }

    pub fn monsters(&self, normalizer: &Normalizer) -> Result<Extraction> {
        self.content(&[ContentKind::Monster], normalizer)
    }

    pub fn spells(&self, normalizer: &Normalizer) -> Result<Extraction> {
        self.content(&[ContentKind::Spell], normalizer)
    }
}
