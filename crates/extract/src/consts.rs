use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

const NAMESPACES: &str = "(?:(?:adventures|compendium|dnd|rules|sources)/)+";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Hyperlinks into one of the known section namespaces. Anchored at the start
// only; anything after the page slug (extensions, query strings) is ignored.
regex!(
    PAGE_URL_REGEX,
    format!(
        r"(?i)^(?:https?://[^#]+\.com)?/{}(?P<book>[^\./#]+)/(?P<page>[^\.#]+)(?:#.+)?",
        NAMESPACES
    )
    .as_str()
);
// Scheme and host of an absolute link, stripped to get a local path.
regex!(SCHEME_HOST_REGEX, r"(?i)^https?://[^/#]+");
// Section prefixes that captured libraries store under `sources/`.
regex!(LOCAL_SECTION_REGEX, r"compendium/(?:rules|adventures)|sources/dnd");
// Book names look like "Player's Handbook (2014)".
regex!(BOOK_NAME_REGEX, r"(?P<title>[^\(]+)(?P<year>\(\d+\))?$");
// Content identifiers are a numeric token followed by a separator: `1234-ring-of-protection`.
regex!(CONTENT_ID_REGEX, r"^\d+-");

// Page metadata
selector!(META_PROPERTY_SELECTOR, "meta[property]");
selector!(NAVIGATION_SELECTOR, "div#comp-next-nav");
selector!(MAIN_BODY_SELECTOR, "div.main.content-container");

// Table of contents. Blockquotes are collected before full listings.
selector!(TOC_BLOCKQUOTE_SELECTOR, "blockquote.compendium-toc-blockquote");
selector!(TOC_FULL_SELECTOR, "div.compendium-toc-full");
selector!(ANCHOR_SELECTOR, "a[href]");

// Content references
selector!(LAYOUT_NOISE_SELECTOR, "div.flexible-double-column");
selector!(CONTENT_HEADING_SELECTOR, "h2, h3, h4, h5, p.Stat-Block-Styles_Stat-Block-Title");
selector!(REFERENCE_SELECTOR, "a.magic-item-tooltip, a.monster-tooltip, a.spell-tooltip");
selector!(LISTED_REFERENCE_SELECTOR, "a.magic-item-tooltip, a.monster-tooltip");

// Sources listing
selector!(LISTING_ITEM_SELECTOR, "a.sources-listing--item");

pub(crate) const STAT_BLOCK_TITLE_CLASS: &str = "Stat-Block-Styles_Stat-Block-Title";
pub(crate) const OWNED_CONTENT_CLASS: &str = "owned-content";
pub(crate) const SITE_ROOT: &str = "https://www.dndbeyond.com/";
/// Legacy book codes shared with revised editions, disambiguated as `<code>-2014`.
pub(crate) const LEGACY_BOOK_CODES: [&str; 4] = ["mm", "dmg", "phb", "basic-rules"];
