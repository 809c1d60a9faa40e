//! Main extraction logic for captured rules pages.

mod content;
mod listing;
mod page;
mod skipped;
mod toc;

use std::convert::Infallible;
use std::str::FromStr;

pub use self::content::Extraction;
pub use self::listing::book_acronym;
pub use self::skipped::Skipped;
pub use self::toc::TocOrder;
use crate::models::{ContentKind, Listing, PageMeta};
use crate::normalize::Normalizer;
use scraper::Html;
use tracing::instrument;

/// A parsed page, ready for any of the extraction passes.
#[derive(Debug)]
pub struct Extractor {
    document: Html,
}
impl Extractor {
    pub fn from_document(document: Html) -> Self {
        Self { document }
    }

    /// Parses the page as captured.
    pub fn from_html(html: &str) -> Self {
        Self::from_document(Html::parse_document(html))
    }

    /// Parses the page and applies the configured clean-up first.
    pub fn from_normalized_html(html: &str, normalizer: &Normalizer) -> Self {
        Self::from_document(normalizer.parse(html))
    }

    /// Title, canonical URL, kind and navigation links of the page.
    pub fn page_meta(&self) -> PageMeta {
        page::meta(&self.document)
    }

    /// The reading order declared by a table-of-contents page.
    pub fn toc(&self) -> TocOrder {
        toc::resolve(&self.document)
    }

    /// Typed content references introduced by the page's headings.
    ///
    /// Consumes the extractor: layout-only containers are removed from the
    /// document before scanning.
    pub fn content(self, kinds: &[ContentKind]) -> Extraction {
        content::extract(self.document, kinds)
    }

    /// Book entries of a sources listing document.
    pub fn listings(&self) -> Vec<Listing> {
        listing::listings(&self.document)
    }
}
impl FromStr for Extractor {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_html(s))
    }
}
impl From<String> for Extractor {
    fn from(value: String) -> Self {
        Self::from_html(&value)
    }
}
impl From<Html> for Extractor {
    fn from(document: Html) -> Self {
        Self::from_document(document)
    }
}

/// Extracts the canonical page order declared by a table-of-contents page.
///
/// # Examples
///
/// ```rust
/// use folio_extract::toc;
/// let html = r#"
///     <div class="compendium-toc-full">
///         <a href="/sources/dnd/xge/introduction">Introduction</a>
///         <a href="/sources/dnd/xge/spells#Fireball">Fireball</a>
///         <a href="/sources/dnd/xge/spells">Spells</a>
///         <a href="https://example.com/forums">Forums</a>
///     </div>
/// "#;
///
/// let order = toc(html);
/// assert_eq!(order.urls, ["/xge/introduction", "/xge/spells"]);
/// assert_eq!(order.skipped.unresolved_links, 1);
/// ```
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn toc(html: &str) -> TocOrder {
    Extractor::from_html(html).toc()
}

/// Extracts the metadata embedded in a captured page.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn page_meta(html: &str) -> PageMeta {
    Extractor::from_html(html).page_meta()
}

/// Extracts typed content references from a captured page.
#[instrument(skip(html, normalizer), fields(html_size = html.len(), references))]
pub fn content(html: &str, kinds: &[ContentKind], normalizer: &Normalizer) -> Extraction {
    let extraction = Extractor::from_normalized_html(html, normalizer).content(kinds);
    tracing::Span::current().record("references", extraction.references.len());
    extraction
}

/// Extracts the book entries of a sources listing document.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn listings(html: &str) -> Vec<Listing> {
    Extractor::from_html(html).listings()
}
