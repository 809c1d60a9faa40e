use crate::consts;
use crate::models::Listing;
use scraper::{ElementRef, Html};

pub(crate) fn listings(document: &Html) -> Vec<Listing> {
    document.select(&consts::LISTING_ITEM_SELECTOR).map(listing).collect()
}

fn listing(anchor: ElementRef<'_>) -> Listing {
    let href = anchor.value().attr("href").unwrap_or_default();
    let url = match consts::SCHEME_HOST_REGEX.is_match(href) {
        true => href.to_string(),
        false => format!("{}{}", consts::SITE_ROOT, href.trim_start_matches('/')),
    };
    let name = display_name(anchor);
    Listing {
        acronym: book_acronym(&name),
        local_path: local_path(&url),
        owned: anchor.descendants().filter_map(ElementRef::wrap).any(is_owned_marker),
        name,
        url,
    }
}

fn is_owned_marker(element: ElementRef<'_>) -> bool {
    element.value().name() == "span" && element.value().classes().any(|c| c == consts::OWNED_CONTENT_CLASS)
}

/// Anchor text without the ownership badge, each text node trimmed.
fn display_name(anchor: ElementRef<'_>) -> String {
    anchor
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != anchor.id())
                .filter_map(ElementRef::wrap)
                .any(is_owned_marker)
        })
        .map(|(_, text)| text.trim())
        .collect()
}

/// Book folder relative to the library root, e.g. `sources/phb-2014`.
fn local_path(url: &str) -> String {
    let path = consts::SCHEME_HOST_REGEX.replace(url, "");
    let path = path.split('#').next().unwrap_or_default();
    consts::LOCAL_SECTION_REGEX.replace_all(path, "sources").trim_start_matches('/').to_string()
}

/// Builds a book acronym from its display name: the first letter of every
/// word, plus the parenthesized year when there is one.
///
/// # Examples
///
/// ```rust
/// use folio_extract::book_acronym;
/// assert_eq!(book_acronym("Player's Handbook (2014)"), "PH (2014)");
/// assert_eq!(book_acronym("Xanathar's Guide to Everything"), "XGtE");
/// ```
pub fn book_acronym(name: &str) -> String {
    let Some(captures) = consts::BOOK_NAME_REGEX.captures(name) else {
        return String::new();
    };
    let title = captures.name("title").map_or("", |m| m.as_str());
    let mut acronym: String = title.split(' ').filter_map(|word| word.chars().next()).collect();
    if let Some(year) = captures.name("year") {
        acronym.push(' ');
        acronym.push_str(year.as_str());
    }
    acronym
}
