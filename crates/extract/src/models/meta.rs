use super::PageKind;

/// Lightweight metadata embedded in a captured page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    /// `og:title`
    pub title: Option<String>,
    /// `og:url`, the page's own absolute URL
    pub url: Option<String>,
    /// Derived from `og:type`
    pub kind: PageKind,
    /// `data-prev-link` of the navigation marker (`None` if there's no marker)
    pub previous_link: Option<String>,
    /// `data-next-link` of the navigation marker (`None` if there's no marker)
    pub next_link: Option<String>,
}
