//! Pre-extraction clean-up of captured pages.
//!
//! [`Normalize`] is the user-facing (serializable) set of options, compiled
//! once into a [`Normalizer`] that is applied to every page before scanning.

use std::borrow::Cow;

use scraper::{ElementRef, Html, Selector};

use crate::consts;
use crate::error::{ErrorKind, Result};

const OG_PROPERTIES: [&str; 3] = ["og:title", "og:type", "og:url"];

/// Clean-up applied to a page before content is extracted.
///
/// Everything is off by default, meaning pages are scanned as captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Normalize {
    /// Keep only `div.main.content-container` (and the `og:title`, `og:type`
    /// and `og:url` meta tags), dropping site navigation and footers.
    pub main_body_only: bool,
    /// CSS selectors of elements removed along with their contents.
    pub remove: Vec<String>,
    /// CSS selectors of elements removed only when they contain no text.
    pub remove_empty: Vec<String>,
    /// Remove HTML comments.
    pub remove_comments: bool,
    /// Replace non-breaking spaces (U+00A0) with spaces and drop soft
    /// hyphens (U+00AD).
    pub replace_invisibles: bool,
}
impl Normalize {
    /// Compiles the configured selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidSelector`] for the first selector that
    /// fails to parse.
    pub fn compile(&self) -> Result<Normalizer> {
        Ok(Normalizer {
            main_body_only: self.main_body_only,
            remove: compile_all(&self.remove)?,
            remove_empty: compile_all(&self.remove_empty)?,
            remove_comments: self.remove_comments,
            replace_invisibles: self.replace_invisibles,
        })
    }
}

fn compile_all(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors
        .iter()
        .map(|css| Selector::parse(css).map_err(|_| exn::Exn::from(ErrorKind::InvalidSelector(css.clone()))))
        .collect()
}

/// Compiled form of [`Normalize`].
#[derive(Debug, Default)]
pub struct Normalizer {
    main_body_only: bool,
    remove: Vec<Selector>,
    remove_empty: Vec<Selector>,
    remove_comments: bool,
    replace_invisibles: bool,
}
impl Normalizer {
    /// Parses `html` and applies every enabled clean-up step.
    pub fn parse(&self, html: &str) -> Html {
        let html = match self.replace_invisibles {
            true => Cow::Owned(html.replace('\u{a0}', " ").replace('\u{ad}', "")),
            false => Cow::Borrowed(html),
        };
        let mut document = Html::parse_document(&html);
        if self.main_body_only {
            document = main_body(&document);
        }
        for selector in &self.remove {
            detach(&mut document, selector, |_| true);
        }
        for selector in &self.remove_empty {
            detach(&mut document, selector, |element| element.text().all(|t| t.trim().is_empty()));
        }
        if self.remove_comments {
            let comments: Vec<_> =
                document.tree.root().descendants().filter(|node| node.value().is_comment()).map(|node| node.id()).collect();
            for id in comments {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }
        }
        document
    }
}

/// Rebuilds the document from its main content container.
fn main_body(document: &Html) -> Html {
    let mut parts = vec![r#"<!DOCTYPE html><html lang="en-us"><meta charset="utf-8"/>"#.to_string()];
    for meta in document.select(&consts::META_PROPERTY_SELECTOR) {
        if meta.value().attr("property").is_some_and(|p| OG_PROPERTIES.contains(&p)) {
            parts.push(meta.html());
        }
    }
    if let Some(main) = document.select(&consts::MAIN_BODY_SELECTOR).next() {
        parts.push(main.html());
    }
    parts.push("</html>".to_string());
    Html::parse_document(&parts.join("\n"))
}

/// Detaches every element matching `selector` (and accepted by `filter`)
/// from the document, returning how many were removed.
pub(crate) fn detach(document: &mut Html, selector: &Selector, filter: impl Fn(&ElementRef<'_>) -> bool) -> usize {
    let ids: Vec<_> = document.select(selector).filter(|element| filter(element)).map(|element| element.id()).collect();
    for id in &ids {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }
    ids.len()
}
