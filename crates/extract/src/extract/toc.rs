use super::Skipped;
use crate::consts;
use crate::url::canonicalize;
use scraper::Html;
use std::collections::HashSet;

/// Reading order declared by a table-of-contents page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocOrder {
    /// Canonical page URLs, first-seen order, without duplicates. Empty means
    /// the page puts no constraint on the order.
    pub urls: Vec<String>,
    pub skipped: Skipped,
}
impl TocOrder {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

pub(crate) fn resolve(document: &Html) -> TocOrder {
    let mut order = TocOrder::default();
    let mut seen = HashSet::new();
    let containers = document.select(&consts::TOC_BLOCKQUOTE_SELECTOR).chain(document.select(&consts::TOC_FULL_SELECTOR));
    for container in containers {
        for anchor in container.select(&consts::ANCHOR_SELECTOR) {
            let href = anchor.value().attr("href").unwrap_or_default();
            let Some(url) = canonicalize(href) else {
                tracing::debug!(href, "skipping unresolvable table-of-contents link");
                order.skipped.unresolved_links += 1;
                continue;
            };
            if seen.insert(url.clone()) {
                order.urls.push(url);
            }
        }
    }
    order
}
