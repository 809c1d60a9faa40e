//! Canonical page identifiers.
//!
//! Pages are cross-referenced (table of contents ↔ captured files ↔ navigation
//! links) through a canonical `/<book-acronym>/<page-slug>` identifier.

use crate::consts;

/// Normalizes a hyperlink into the canonical `/<book>/<page>` identifier.
///
/// Accepts absolute or root-relative links pointing into one of the known
/// section namespaces (`adventures`, `compendium`, `dnd`, `rules`, `sources`).
/// The URL fragment is discarded, a single trailing slash is dropped and the
/// result is lower-cased. Legacy book codes (`mm`, `dmg`, `phb`, `basic-rules`)
/// used as a directory segment become their `-2014` variant, so the legacy and
/// revised editions sharing a code don't collide.
///
/// Returns `None` for links outside the known namespaces; callers skip them.
///
/// # Examples
///
/// ```rust
/// use folio_extract::canonicalize;
/// assert_eq!(
///     canonicalize("https://site.example.com/compendium/rules/phb/equipment#x").as_deref(),
///     Some("/phb-2014/equipment"),
/// );
/// assert_eq!(canonicalize("/sources/dnd/xge/spells").as_deref(), Some("/xge/spells"));
/// assert_eq!(canonicalize("https://example.com/forums/thread/1"), None);
/// ```
pub fn canonicalize(href: &str) -> Option<String> {
    let captures = consts::PAGE_URL_REGEX.captures(href.trim())?;
    let book = captures.name("book")?.as_str();
    let page = captures.name("page")?.as_str();
    let page = page.strip_suffix('/').unwrap_or(page);
    let url = format!("/{book}/{page}");
    // Only directory segments are rewritten: the final segment is never
    // followed by a slash. Matching happens before lower-casing.
    let segments: Vec<&str> = url.split('/').collect();
    let last = segments.len() - 1;
    let rewritten = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| match i < last && consts::LEGACY_BOOK_CODES.contains(segment) {
            true => format!("{segment}-2014"),
            false => (*segment).to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");
    Some(rewritten.to_lowercase())
}

/// Returns `true` when `url` ends with the canonical identifier, ignoring case.
pub fn matches_canonical(url: &str, canonical: &str) -> bool {
    url.len() >= canonical.len()
        && url.is_char_boundary(url.len() - canonical.len())
        && url[url.len() - canonical.len()..].eq_ignore_ascii_case(canonical)
}
