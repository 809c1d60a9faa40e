use crate::diagnostics::Diagnostics;
use crate::error::{ErrorKind, Result};
use crate::fs;
use crate::order::Orderable;
use exn::{OptionExt, ResultExt};
use folio_extract::models::{ContentKind, ContentReference, PageKind, PageOrigin};
use folio_extract::{Extraction, Normalize, Normalizer, TocOrder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::instrument;

/// One captured page of a book, or a URL-only placeholder for a page the
/// book's table of contents lists but that wasn't captured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Declared title (`og:title`)
    pub name: Option<String>,
    /// Path relative to the book folder
    pub file: Option<PathBuf>,
    /// Full path of the captured file; `None` for placeholders
    pub path: Option<PathBuf>,
    #[serde(rename = "type")]
    pub kind: PageKind,
    /// Page URL (`og:url`), or the canonical identifier for placeholders
    pub url: Option<String>,
    /// Navigation link to the previous page, empty on the first page
    pub previous_link: Option<String>,
    pub next_link: Option<String>,
    /// Modification time observed at the last refresh
    #[serde(with = "time::serde::rfc3339::option")]
    pub modified: Option<OffsetDateTime>,
}
impl Page {
    /// Reads a captured file. `root` is the book folder the file lives in.
    pub fn from_file(path: impl Into<PathBuf>, root: &Path) -> Result<Self> {
        let path = path.into();
        let mut page = Self {
            file: Some(path.strip_prefix(root).unwrap_or(&path).to_path_buf()),
            path: Some(path),
            ..Default::default()
        };
        page.refresh()?;
        Ok(page)
    }

    pub fn placeholder(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.path.is_none()
    }

    /// Re-reads the page metadata and records the file's modification time.
    /// Title, URL and navigation links missing from the file keep their
    /// previous values.
    pub fn refresh(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or_raise(|| ErrorKind::NotFound(self.url.clone().unwrap_or_default().into()))?;
        let modified = fs::modified(&path)?;
        let meta = folio_extract::page_meta(&fs::read_html(&path)?);
        self.name = meta.title.or(self.name.take());
        self.url = meta.url.or(self.url.take());
        self.kind = meta.kind;
        self.previous_link = meta.previous_link.or(self.previous_link.take());
        self.next_link = meta.next_link.or(self.next_link.take());
        self.modified = Some(modified);
        Ok(())
    }

    /// Returns `true` if the file was modified since it was last refreshed.
    pub fn update_available(&self) -> bool {
        fs::is_stale(self.path.as_deref(), self.modified)
    }

    pub fn file_exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::is_file)
    }

    /// A page is valid when its captured file exists.
    pub fn validate(&self) -> bool {
        self.file_exists()
    }

    pub fn read_html(&self) -> Result<String> {
        let path = self.path.as_deref().ok_or_raise(|| ErrorKind::NotFound(PathBuf::new()))?;
        fs::read_html(path)
    }

    /// Extracts content references, recording this file as their origin.
    pub fn content(&self, kinds: &[ContentKind], normalizer: &Normalizer) -> Result<Extraction> {
        let mut extraction = folio_extract::content(&self.read_html()?, kinds, normalizer);
        if let Some(path) = &self.path {
            extraction.references =
                extraction.references.into_iter().map(|r| r.observed_in(path.clone(), self.modified)).collect();
        }
        Ok(extraction)
    }

    pub(crate) fn origin(&self) -> PageOrigin {
        PageOrigin {
            name: self.name.clone(),
            url: self.url.clone(),
            path: self.path.clone(),
        }
    }
}
impl Orderable for Page {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// A captured page without a navigation marker has an empty previous
    /// link, so it can head the chain or follow any page.
    fn previous_link(&self) -> Option<&str> {
        match self.is_placeholder() {
            true => None,
            false => Some(self.previous_link.as_deref().unwrap_or_default()),
        }
    }

    fn placeholder(url: &str) -> Self {
        Page::placeholder(url)
    }
}

/// Re-extracts the fragment of a reference persisted without its HTML from
/// the page it was observed in, restoring `html` and `hash`. Returns `false`
/// when that page no longer holds a fragment with the reference's identifier.
pub fn load_html(reference: &mut ContentReference, normalizer: &Normalizer) -> Result<bool> {
    let path = reference.path.as_deref().ok_or_raise(|| ErrorKind::NotFound(PathBuf::new()))?;
    let extraction = folio_extract::content(&fs::read_html(path)?, &[reference.kind], normalizer);
    let Some(found) = extraction.references.into_iter().find(|found| found.id == reference.id) else {
        return Ok(false);
    };
    reference.hash = found.hash;
    reference.html = found.html;
    Ok(true)
}

/// Restores the fragment of every reference persisted without its HTML.
/// References whose page is gone or no longer holds them stay empty and are
/// counted in [`Diagnostics::missing_fragments`].
///
/// # Errors
///
/// Returns [`ErrorKind::Extract`] if `normalize` names an invalid selector.
#[instrument(skip_all, fields(references = references.len()))]
pub fn hydrate(references: &mut [ContentReference], normalize: &Normalize) -> Result<Diagnostics> {
    let normalizer = normalize.compile().or_raise(|| ErrorKind::Extract)?;
    let mut diagnostics = Diagnostics::default();
    for reference in references.iter_mut().filter(|reference| reference.html.is_empty()) {
        match load_html(reference, &normalizer) {
            Ok(true) => {},
            Ok(false) => {
                tracing::warn!(id = %reference.id, path = ?reference.path, "fragment no longer in its page");
                diagnostics.missing_fragments += 1;
            },
            Err(err) => {
                tracing::warn!(id = %reference.id, error = %err, "failed to re-extract fragment");
                diagnostics.missing_fragments += 1;
            },
        }
    }
    Ok(diagnostics)
}

/// A book's table-of-contents page and the page order it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    #[serde(flatten)]
    pub page: Page,
    /// Canonical page URLs in reading order
    #[serde(default)]
    pub urls: Vec<String>,
}
impl Toc {
    /// Wraps an already-read table-of-contents page and resolves its order.
    pub fn from_page(page: Page) -> Result<(Self, TocOrder)> {
        let mut toc = Self { page, urls: Vec::new() };
        let order = toc.resolve()?;
        Ok((toc, order))
    }

    /// Re-reads the page and its declared order.
    pub fn refresh(&mut self) -> Result<TocOrder> {
        self.page.refresh()?;
        self.resolve()
    }

    fn resolve(&mut self) -> Result<TocOrder> {
        let order = folio_extract::toc(&self.page.read_html()?);
        self.urls = order.urls.clone();
        Ok(order)
    }

    pub fn update_available(&self) -> bool {
        self.page.update_available()
    }

    pub fn validate(&self) -> bool {
        self.page.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOC_HTML: &str = r#"<html><head>
        <meta property="og:type" content="article"/>
        <meta property="og:title" content="Xanathar's Guide to Everything"/>
        <meta property="og:url" content="https://www.dndbeyond.com/sources/dnd/xge"/>
        </head><body><div class="compendium-toc-full">
            <a href="/sources/dnd/xge/introduction">Introduction</a>
            <a href="/sources/dnd/xge/spells">Spells</a>
        </div></body></html>"#;

    const PAGE_HTML: &str = r#"<html><head>
        <meta property="og:type" content="website"/>
        <meta property="og:title" content="Spells"/>
        <meta property="og:url" content="https://www.dndbeyond.com/sources/dnd/xge/spells"/>
        </head><body>
        <div id="comp-next-nav" data-prev-link="/sources/dnd/xge/introduction" data-next-link=""></div>
        <h3><a class="spell-tooltip" href="/spells/2056-fireball">Fireball</a></h3>
        <p>A bright streak flashes.</p>
        </body></html>"#;

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chapters/spells.html");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, PAGE_HTML).unwrap();

        let page = Page::from_file(&path, dir.path()).unwrap();
        assert_eq!(page.file.as_deref(), Some(Path::new("chapters/spells.html")));
        assert_eq!(page.path.as_deref(), Some(path.as_path()));
        assert_eq!(page.name.as_deref(), Some("Spells"));
        assert_eq!(page.kind, PageKind::Article);
        assert_eq!(page.previous_link.as_deref(), Some("/sources/dnd/xge/introduction"));
        assert_eq!(page.next_link.as_deref(), Some(""));
        assert!(page.modified.is_some());
        assert!(page.validate());
        assert!(!page.update_available());
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Page::from_file(dir.path().join("missing.html"), dir.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_placeholder() {
        let mut page = Page::placeholder("/xge/missing");
        assert!(page.is_placeholder());
        assert!(!page.validate());
        assert!(!page.update_available());
        assert!(matches!(&*page.refresh().unwrap_err(), ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_update_available_after_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spells.html");
        std::fs::write(&path, PAGE_HTML).unwrap();
        let mut page = Page::from_file(&path, dir.path()).unwrap();
        page.modified = page.modified.map(|m| m - time::Duration::seconds(10));
        assert!(page.update_available());
        page.refresh().unwrap();
        assert!(!page.update_available());
    }

    #[test]
    fn test_refresh_keeps_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spells.html");
        std::fs::write(&path, PAGE_HTML).unwrap();
        let mut page = Page::from_file(&path, dir.path()).unwrap();

        std::fs::write(&path, "<html><body><p>Rewritten without metadata.</p></body></html>").unwrap();
        page.refresh().unwrap();
        assert_eq!(page.name.as_deref(), Some("Spells"));
        assert_eq!(page.url.as_deref(), Some("https://www.dndbeyond.com/sources/dnd/xge/spells"));
        assert_eq!(page.previous_link.as_deref(), Some("/sources/dnd/xge/introduction"));
        assert_eq!(page.next_link.as_deref(), Some(""));
    }

    #[test]
    fn test_page_without_navigation_has_empty_previous_link() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credits.html");
        std::fs::write(&path, r#"<meta property="og:url" content="https://www.dndbeyond.com/sources/dnd/xge/credits"/>"#)
            .unwrap();
        let page = Page::from_file(&path, dir.path()).unwrap();
        assert_eq!(page.previous_link, None);
        assert_eq!(Orderable::previous_link(&page), Some(""));
        assert_eq!(Orderable::previous_link(&Page::placeholder("/xge/credits")), None);
    }

    #[test]
    fn test_read_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spells.html");
        let mut bytes = PAGE_HTML.as_bytes().to_vec();
        bytes.extend_from_slice(b"<p>caf\xe9</p>");
        std::fs::write(&path, bytes).unwrap();
        let page = Page::from_file(&path, dir.path()).unwrap();
        assert_eq!(page.name.as_deref(), Some("Spells"));
        assert!(page.read_html().unwrap().contains("caf\u{fffd}"));
    }

    #[test]
    fn test_load_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spells.html");
        std::fs::write(&path, PAGE_HTML).unwrap();
        let page = Page::from_file(&path, dir.path()).unwrap();
        let extracted = page.content(&ContentKind::ALL, &Normalizer::default()).unwrap().references.remove(0);

        let mut persisted = ContentReference {
            html: String::new(),
            hash: String::new(),
            ..extracted.clone()
        };
        assert!(load_html(&mut persisted, &Normalizer::default()).unwrap());
        assert_eq!(persisted, extracted);

        std::fs::write(&path, "<p>Fireball was moved elsewhere.</p>").unwrap();
        assert!(!load_html(&mut persisted, &Normalizer::default()).unwrap());
        persisted.path = None;
        assert!(matches!(&*load_html(&mut persisted, &Normalizer::default()).unwrap_err(), ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_content_records_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spells.html");
        std::fs::write(&path, PAGE_HTML).unwrap();
        let page = Page::from_file(&path, dir.path()).unwrap();

        let extraction = page.content(&ContentKind::ALL, &Normalizer::default()).unwrap();
        assert_eq!(extraction.references.len(), 1);
        let fireball = &extraction.references[0];
        assert_eq!(fireball.id, "2056-fireball");
        assert_eq!(fireball.path.as_deref(), Some(path.as_path()));
        assert_eq!(fireball.modified, page.modified);
    }

    #[test]
    fn test_toc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xge.html");
        std::fs::write(&path, TOC_HTML).unwrap();
        let page = Page::from_file(&path, dir.path()).unwrap();
        assert_eq!(page.kind, PageKind::Toc);

        let (toc, order) = Toc::from_page(page).unwrap();
        assert_eq!(toc.urls, ["/xge/introduction", "/xge/spells"]);
        assert!(order.skipped.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spells.html");
        std::fs::write(&path, PAGE_HTML).unwrap();
        let page = Page::from_file(&path, dir.path()).unwrap();

        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains(r#""type":"article""#));
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
    }
}
