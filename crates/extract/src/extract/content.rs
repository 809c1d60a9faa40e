use super::Skipped;
use crate::consts;
use crate::models::{ContentKind, ContentReference};
use crate::normalize::detach;
use scraper::{ElementRef, Html};

/// Content references found in one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// One reference per (heading, anchor) pair, in document order.
    pub references: Vec<ContentReference>,
    pub skipped: Skipped,
}

/// The handful of element shapes the matchers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Heading(u8),
    StatBlockTitle,
    Paragraph,
    Emphasis,
    Other,
}
impl NodeKind {
    fn of(element: &ElementRef<'_>) -> Self {
        let value = element.value();
        match value.name() {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" if value.classes().any(|c| c == consts::STAT_BLOCK_TITLE_CLASS) => Self::StatBlockTitle,
            "p" => Self::Paragraph,
            "em" => Self::Emphasis,
            _ => Self::Other,
        }
    }

    /// Headings that may introduce a content item.
    fn is_content_heading(self) -> bool {
        matches!(self, Self::Heading(2..=5) | Self::StatBlockTitle)
    }

    /// Siblings that end a fragment.
    fn ends_fragment(self) -> bool {
        matches!(self, Self::Heading(1..=5))
    }
}

/// How a heading is tied to its references.
#[derive(Debug)]
enum Boundary<'a> {
    /// A typed reference anchor inside the heading itself.
    Anchored(ElementRef<'a>),
    /// The next sibling is a paragraph opening with an emphasis element and
    /// listing one or more item or monster anchors (encounter lists).
    Listed(Vec<ElementRef<'a>>),
}
impl<'a> Boundary<'a> {
    fn of(heading: ElementRef<'a>) -> Option<Self> {
        anchored(heading).map(Self::Anchored).or_else(|| listed(heading).map(Self::Listed))
    }

    fn anchors(self) -> Vec<ElementRef<'a>> {
        match self {
            Self::Anchored(anchor) => vec![anchor],
            Self::Listed(anchors) => anchors,
        }
    }
}

fn anchored(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    heading.select(&consts::REFERENCE_SELECTOR).next()
}

fn listed(heading: ElementRef<'_>) -> Option<Vec<ElementRef<'_>>> {
    let paragraph = heading.next_siblings().find_map(ElementRef::wrap)?;
    if !matches!(NodeKind::of(&paragraph), NodeKind::Paragraph | NodeKind::StatBlockTitle) {
        return None;
    }
    // The very first child node, text included, must be the emphasis.
    let first = paragraph.first_child().and_then(ElementRef::wrap)?;
    if NodeKind::of(&first) != NodeKind::Emphasis {
        return None;
    }
    let anchors: Vec<_> = paragraph.select(&consts::LISTED_REFERENCE_SELECTOR).collect();
    (!anchors.is_empty()).then_some(anchors)
}

/// The heading followed by every non-blank sibling up to the next heading.
fn fragment(heading: ElementRef<'_>) -> String {
    let mut html = heading.html();
    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if NodeKind::of(&sibling).ends_fragment() {
            break;
        }
        if sibling.text().any(|t| !t.trim().is_empty()) {
            html.push('\n');
            html.push_str(&sibling.html());
        }
    }
    html
}

/// Identifier of the content an anchor points at: the last path segment of
/// its target, which must start with a number.
fn identifier(anchor: &ElementRef<'_>) -> Option<String> {
    let href = anchor.value().attr("href")?;
    let id = href.rsplit('/').next()?;
    consts::CONTENT_ID_REGEX.is_match(id).then(|| id.to_string())
}

pub(crate) fn extract(mut document: Html, kinds: &[ContentKind]) -> Extraction {
    detach(&mut document, &consts::LAYOUT_NOISE_SELECTOR, |_| true);

    let mut extraction = Extraction::default();
    for heading in document.select(&consts::CONTENT_HEADING_SELECTOR) {
        let node = NodeKind::of(&heading);
        if !node.is_content_heading() {
            continue;
        }
        let Some(boundary) = Boundary::of(heading) else {
            if node == NodeKind::StatBlockTitle {
                extraction.skipped.unreferenced_stat_blocks += 1;
            }
            continue;
        };
        let name: String = heading.text().map(str::trim).collect();
        let html = fragment(heading);
        for anchor in boundary.anchors() {
            let classes: Vec<&str> = anchor.value().classes().collect();
            let Some(kind) = ContentKind::from_classes(&classes) else {
                continue;
            };
            let Some(id) = identifier(&anchor) else {
                tracing::debug!(href = anchor.value().attr("href"), heading = %name, "skipping malformed content identifier");
                extraction.skipped.malformed_identifiers += 1;
                continue;
            };
            if kinds.contains(&kind) {
                extraction.references.push(ContentReference::new(id, kind, name.clone(), html.clone()));
            }
        }
    }
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn extract_all(html: &str) -> Extraction {
        extract(Html::parse_document(html), &ContentKind::ALL)
    }

    #[test]
    fn test_fragment_stops_at_next_heading() {
        let extraction = extract_all(
            r#"<div>
                <h3><a class="tooltip-hover monster-tooltip" href="/monsters/16907-goblin">Goblin</a></h3>
                <p>Small humanoid (goblinoid), neutral evil</p>
                <p>Armor Class 15</p>
                <h3>Tactics</h3>
                <p>Goblins flee when outnumbered.</p>
            </div>"#,
        );
        assert!(extraction.skipped.is_empty());
        let [goblin] = extraction.references.as_slice() else {
            panic!("expected a single reference, got {:?}", extraction.references);
        };
        assert_eq!(goblin.id, "16907-goblin");
        assert_eq!(goblin.kind, ContentKind::Monster);
        assert_eq!(goblin.name, "Goblin");
        assert_eq!(
            goblin.html,
            concat!(
                r#"<h3><a class="tooltip-hover monster-tooltip" href="/monsters/16907-goblin">Goblin</a></h3>"#,
                "\n<p>Small humanoid (goblinoid), neutral evil</p>",
                "\n<p>Armor Class 15</p>",
            )
        );
    }

    #[test]
    fn test_fragment_skips_blank_siblings() {
        let extraction = extract_all(
            r#"<h4><a class="spell-tooltip" href="/spells/2056-fireball">Fireball</a></h4>
               <p>   </p><div><span></span></div><p>3rd-level evocation</p><h1>Appendix</h1><p>Not part of it</p>"#,
        );
        assert_eq!(
            extraction.references[0].html,
            "<h4><a class=\"spell-tooltip\" href=\"/spells/2056-fireball\">Fireball</a></h4>\n<p>3rd-level evocation</p>"
        );
    }

    #[test]
    fn test_sibling_list() {
        let extraction = extract_all(
            r#"<h4>Area 3. Guard Room</h4>
               <p><em>Creatures: <a class="monster-tooltip" href="/monsters/17023-stirge">stirges</a>,
                  <a class="magic-item-tooltip" href="/magic-items/4585-potion-of-healing">potion</a>,
                  <a class="spell-tooltip" href="/spells/2056-fireball">fireball</a></em></p>
               <p>The room smells of rot.</p>"#,
        );
        let ids: Vec<_> = extraction.references.iter().map(|r| (r.id.as_str(), r.kind)).collect();
        assert_eq!(
            ids,
            [("17023-stirge", ContentKind::Monster), ("4585-potion-of-healing", ContentKind::MagicItem)]
        );
        assert!(extraction.references.iter().all(|r| r.name == "Area 3. Guard Room"));
        assert!(extraction.references[0].html.contains("The room smells of rot."));
    }

    #[rstest]
    #[case::text_before_emphasis(r#"<h4>Guard Room</h4><p>Here: <em><a class="monster-tooltip" href="/monsters/17023-stirge">stirge</a></em></p>"#)]
    #[case::not_a_paragraph(r#"<h4>Guard Room</h4><div><em><a class="monster-tooltip" href="/monsters/17023-stirge">stirge</a></em></div>"#)]
    #[case::no_anchors(r#"<h4>Guard Room</h4><p><em>Empty.</em></p>"#)]
    #[case::no_sibling(r#"<div><h4>Guard Room</h4></div>"#)]
    fn test_not_a_boundary(#[case] html: &str) {
        let extraction = extract_all(html);
        assert!(extraction.references.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_stat_block_title() {
        let extraction = extract_all(
            r#"<p class="Stat-Block-Styles_Stat-Block-Title"><a class="monster-tooltip" href="https://www.dndbeyond.com/monsters/16762-bugbear">Bugbear</a></p>
               <p>Medium humanoid</p>
               <p class="Stat-Block-Styles_Stat-Block-Title">Unnamed Beast</p>
               <p>Large beast</p>"#,
        );
        assert_eq!(extraction.references.len(), 1);
        assert_eq!(extraction.references[0].id, "16762-bugbear");
        // The fragment runs past the second title: only h1-h5 end it.
        assert!(extraction.references[0].html.contains("Large beast"));
        assert_eq!(extraction.skipped.unreferenced_stat_blocks, 1);
    }

    #[test]
    fn test_malformed_identifier_is_counted() {
        let extraction = extract_all(
            r#"<h3><a class="magic-item-tooltip" href="/magic-items/ring-of-protection">Ring</a></h3><p>Ring text</p>
               <h3><a class="magic-item-tooltip" href="/magic-items/4701-ring-of-protection">Ring</a></h3><p>Ring text</p>"#,
        );
        assert_eq!(extraction.references.len(), 1);
        assert_eq!(extraction.references[0].id, "4701-ring-of-protection");
        assert_eq!(extraction.skipped.malformed_identifiers, 1);
    }

    #[test]
    fn test_layout_noise_is_removed() {
        let extraction = extract_all(
            r#"<h3><a class="spell-tooltip" href="/spells/2056-fireball">Fireball</a></h3>
               <div class="flexible-double-column"><p>Sidebar</p></div>
               <p>A bright streak</p>"#,
        );
        assert!(!extraction.references[0].html.contains("Sidebar"));
    }

    #[rstest]
    #[case(&[ContentKind::Spell], &["2056-fireball"])]
    #[case(&[ContentKind::MagicItem, ContentKind::Monster], &["4701-ring-of-protection", "16907-goblin"])]
    #[case(&[], &[])]
    fn test_kind_filter(#[case] kinds: &[ContentKind], #[case] expected: &[&str]) {
        let html = r#"
            <h3><a class="magic-item-tooltip" href="/magic-items/4701-ring-of-protection">Ring of Protection</a></h3>
            <h3><a class="monster-tooltip" href="/monsters/16907-goblin">Goblin</a></h3>
            <h3><a class="spell-tooltip" href="/spells/2056-fireball">Fireball</a></h3>
        "#;
        let extraction = extract(Html::parse_document(html), kinds);
        let ids: Vec<_> = extraction.references.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_name_joins_trimmed_text() {
        let extraction = extract_all(
            r#"<h5>
                <a class="magic-item-tooltip" href="/magic-items/4585-potion-of-healing">Potion of Healing</a>
            </h5>"#,
        );
        assert_eq!(extraction.references[0].name, "Potion of Healing");
    }
}
