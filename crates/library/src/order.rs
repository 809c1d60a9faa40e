//! Page ordering.
//!
//! A book's pages are put in reading order by one of two mechanisms:
//!
//! 1. **Table-of-contents binding**, when the book's table of contents lists
//!    at least one page. The declared order is final: entries without a
//!    captured page become URL-only placeholders and captured pages the table
//!    doesn't list are dropped.
//! 2. **Navigation chain walk** otherwise. Starting at the page with an empty
//!    previous link, each next page is the first remaining page whose previous
//!    link is contained in the current tail's URL. When no remaining page
//!    fits, the walk stops and every unplaced page is put *ahead* of the
//!    chain in its original relative order.

use folio_extract::matches_canonical;

/// What the orderer needs to know about a page.
pub trait Orderable: Sized {
    /// The page's own URL, if known.
    fn url(&self) -> Option<&str>;
    /// The raw previous-page link embedded in the page. `None` keeps the
    /// page out of the chain entirely.
    fn previous_link(&self) -> Option<&str>;
    /// A URL-only stand-in for a listed page that wasn't captured.
    fn placeholder(url: &str) -> Self;
}

/// Pages in reading order, with counts of everything that wasn't a clean fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordered<T> {
    pub pages: Vec<T>,
    /// Pages discarded because the table of contents didn't list them.
    pub dropped: usize,
    /// Table-of-contents entries that became placeholders.
    pub placeholders: usize,
    /// Pages the chain walk couldn't place.
    pub unchained: usize,
}
impl<T> Ordered<T> {
    fn new(pages: Vec<T>) -> Self {
        Self {
            pages,
            dropped: 0,
            placeholders: 0,
            unchained: 0,
        }
    }
}

/// Orders `pages` according to `toc` when it is non-empty, or by walking
/// their navigation chain otherwise.
pub fn order<T: Orderable>(toc: &[String], pages: Vec<T>) -> Ordered<T> {
    match toc.is_empty() {
        true => walk_chain(pages),
        false => bind_toc(toc, pages),
    }
}

/// Places, for every listed URL, the first remaining page whose URL ends with
/// it (ignoring case).
pub fn bind_toc<T: Orderable>(toc: &[String], pages: Vec<T>) -> Ordered<T> {
    let mut remaining: Vec<Option<T>> = pages.into_iter().map(Some).collect();
    let mut ordered = Ordered::new(Vec::with_capacity(toc.len()));
    for url in toc {
        let matched = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().and_then(|page| page.url()).is_some_and(|own| matches_canonical(own, url)))
            .and_then(Option::take);
        match matched {
            Some(page) => ordered.pages.push(page),
            None => {
                ordered.placeholders += 1;
                ordered.pages.push(T::placeholder(url));
            },
        }
    }
    ordered.dropped = remaining.iter().flatten().count();
    ordered
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Extending(usize),
    Complete,
    Broken,
}

/// Reconstructs the previous-link chain.
pub fn walk_chain<T: Orderable>(pages: Vec<T>) -> Ordered<T> {
    let count = pages.len();
    let Some(head) = pages.iter().position(|page| page.previous_link() == Some("")) else {
        return Ordered {
            unchained: count,
            ..Ordered::new(pages)
        };
    };

    // For every page, the pages that may follow it, in original order. A
    // previous link is a candidate when it is contained in the tail's URL.
    let successors: Vec<Vec<usize>> = pages
        .iter()
        .enumerate()
        .map(|(tail, page)| {
            let url = page.url().unwrap_or_default();
            pages
                .iter()
                .enumerate()
                .filter(|&(next, candidate)| {
                    next != tail && candidate.previous_link().is_some_and(|link| url.contains(link))
                })
                .map(|(next, _)| next)
                .collect()
        })
        .collect();

    let mut unplaced = vec![true; count];
    let mut placed = Vec::with_capacity(count);
    let mut state = Walk::Extending(head);
    while let Walk::Extending(tail) = state {
        unplaced[tail] = false;
        placed.push(tail);
        state = match successors[tail].iter().find(|&&next| unplaced[next]) {
            Some(&next) => Walk::Extending(next),
            None if placed.len() == count => Walk::Complete,
            None => Walk::Broken,
        };
    }

    let mut slots: Vec<Option<T>> = pages.into_iter().map(Some).collect();
    let unchained: Vec<usize> = (0..count).filter(|&index| unplaced[index]).collect();
    let order = match state {
        Walk::Broken => unchained.iter().chain(placed.iter()).copied().collect::<Vec<_>>(),
        _ => placed,
    };
    Ordered {
        pages: order.into_iter().filter_map(|index| slots[index].take()).collect(),
        unchained: unchained.len(),
        ..Ordered::new(Vec::new())
    }
}
