use super::ContentKind;
use std::path::PathBuf;
use time::OffsetDateTime;

/// One named game-content entry (item, monster, spell) found in a page.
///
/// The `id` is the identity: within a single library-wide extraction there is
/// at most one reference per identifier, every other occurrence is merged into
/// it and recorded in `sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentReference {
    /// Numeric-prefixed identifier taken from the anchor target, e.g. `1234-ring-of-protection`
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ContentKind,
    /// Heading text
    pub name: String,
    /// Modification time of the page the fragment was taken from
    #[cfg_attr(feature = "serde", serde(default, with = "time::serde::rfc3339::option"))]
    pub modified: Option<OffsetDateTime>,
    /// File the fragment was taken from
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: Option<PathBuf>,
    /// BLAKE3 hash of `html`
    pub hash: String,
    /// Heading plus following content, up to the next heading. Can be
    /// re-extracted from `path`, so it may be absent from persisted data.
    #[cfg_attr(feature = "serde", serde(default))]
    pub html: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sources: Vec<Provenance>,
}
impl ContentReference {
    pub fn new(id: impl Into<String>, kind: ContentKind, name: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            modified: None,
            path: None,
            hash: blake3::hash(html.as_bytes()).to_string(),
            html,
            sources: Vec::new(),
        }
    }

    /// Records which file (and its modification time) the fragment came from.
    pub fn observed_in(mut self, path: impl Into<PathBuf>, modified: Option<OffsetDateTime>) -> Self {
        self.path = Some(path.into());
        self.modified = modified;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.sources.push(provenance);
        self
    }

    /// The numeric part of the identifier.
    pub fn number(&self) -> Option<u64> {
        self.id.split('-').next().and_then(|n| n.parse().ok())
    }

    /// The HTML fragment converted to Markdown.
    #[cfg(feature = "markdown")]
    pub fn markdown(&self) -> String {
        html2md::rewrite_html(&self.html, true)
    }
}

/// Snapshot of where a [`ContentReference`] was observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Provenance {
    #[cfg_attr(feature = "serde", serde(default))]
    pub library: Option<String>,
    pub book: BookOrigin,
    pub page: PageOrigin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookOrigin {
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub url: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageOrigin {
    pub name: Option<String>,
    pub url: Option<String>,
    pub path: Option<PathBuf>,
}
