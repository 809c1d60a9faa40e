use crate::consts;
use crate::models::{PageKind, PageMeta};
use scraper::Html;
use std::collections::HashMap;

/// Reads the `og:*` meta tags and the navigation marker of a page.
pub(crate) fn meta(document: &Html) -> PageMeta {
    // Later tags override earlier ones, a tag without content clears the value.
    let mut properties: HashMap<&str, Option<&str>> = HashMap::new();
    for meta in document.select(&consts::META_PROPERTY_SELECTOR) {
        if let Some(property) = meta.value().attr("property") {
            properties.insert(property, meta.value().attr("content"));
        }
    }
    let property = |name: &str| properties.get(name).copied().flatten().map(str::to_string);
    let navigation = document.select(&consts::NAVIGATION_SELECTOR).next();
    let link = |name: &str| navigation.map(|nav| nav.value().attr(name).unwrap_or_default().to_string());
    PageMeta {
        title: property("og:title"),
        url: property("og:url"),
        kind: PageKind::from_og_type(property("og:type").as_deref()),
        previous_link: link("data-prev-link"),
        next_link: link("data-next-link"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <meta property="og:type" content="website"/>
        <meta property="og:title" content="Chapter 1: Step-by-Step Characters"/>
        <meta property="og:url" content="https://www.dndbeyond.com/sources/dnd/phb-2014/step-by-step-characters"/>
        <meta name="description" content="ignored"/>
        </head><body>
        <div id="comp-next-nav"
             data-prev-link="/sources/dnd/phb-2014/introduction"
             data-next-link="/sources/dnd/phb-2014/races"></div>
        </body></html>"#;

    #[test]
    fn test_meta() {
        let meta = meta(&Html::parse_document(PAGE));
        assert_eq!(meta.title.as_deref(), Some("Chapter 1: Step-by-Step Characters"));
        assert_eq!(
            meta.url.as_deref(),
            Some("https://www.dndbeyond.com/sources/dnd/phb-2014/step-by-step-characters")
        );
        assert_eq!(meta.kind, PageKind::Article);
        assert_eq!(meta.previous_link.as_deref(), Some("/sources/dnd/phb-2014/introduction"));
        assert_eq!(meta.next_link.as_deref(), Some("/sources/dnd/phb-2014/races"));
    }

    #[test]
    fn test_landing_page_is_toc() {
        let meta = meta(&Html::parse_document(r#"<meta property="og:type" content="article"/>"#));
        assert_eq!(meta.kind, PageKind::Toc);
        assert_eq!(meta.previous_link, None);
    }

    #[test]
    fn test_first_page_has_empty_previous_link() {
        let html = r#"<div id="comp-next-nav" data-prev-link="" data-next-link="/sources/dnd/xge/spells"></div>"#;
        let meta = meta(&Html::parse_document(html));
        assert_eq!(meta.previous_link.as_deref(), Some(""));
        assert_eq!(meta.kind, PageKind::Unknown);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(meta(&Html::parse_document("")), PageMeta::default());
    }
}
