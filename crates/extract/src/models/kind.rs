use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;

/// Kind of game content a reference anchor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentKind {
    #[cfg_attr(feature = "serde", serde(rename = "magic item"))]
    MagicItem,
    #[cfg_attr(feature = "serde", serde(rename = "monster"))]
    Monster,
    #[cfg_attr(feature = "serde", serde(rename = "spell"))]
    Spell,
}
impl ContentKind {
    /// Every kind, in the order anchors are classified.
    pub const ALL: [ContentKind; 3] = [ContentKind::MagicItem, ContentKind::Monster, ContentKind::Spell];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::MagicItem => "magic item",
            ContentKind::Monster => "monster",
            ContentKind::Spell => "spell",
        }
    }

    /// The anchor marker class identifying this kind.
    pub fn tooltip_class(&self) -> &'static str {
        match self {
            ContentKind::MagicItem => "magic-item-tooltip",
            ContentKind::Monster => "monster-tooltip",
            ContentKind::Spell => "spell-tooltip",
        }
    }

    /// Classifies an anchor by its marker classes; the first known kind wins.
    pub fn from_classes(classes: &[&str]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| classes.contains(&kind.tooltip_class()))
    }
}
impl FromStr for ContentKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "magicitem" | "magicitems" | "item" | "items" => Self::MagicItem,
            "monster" | "monsters" => Self::Monster,
            "spell" | "spells" => Self::Spell,
            _ => return Err(format!("unknown content kind: {s}")),
        })
    }
}
impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// What a captured page is, according to its `og:type` marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PageKind {
    /// A regular book page.
    Article,
    /// The book's landing page, listing its table of contents.
    Toc,
    #[default]
    Unknown,
}
impl PageKind {
    /// Maps an `og:type` value. Landing pages are the only ones published as
    /// `article`; every other typed page is part of the book body.
    pub fn from_og_type(og_type: Option<&str>) -> Self {
        match og_type.map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("article") => Self::Toc,
            Some(t) if !t.is_empty() => Self::Article,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Article => "article",
            PageKind::Toc => "toc",
            PageKind::Unknown => "unknown",
        }
    }
}
impl Display for PageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
