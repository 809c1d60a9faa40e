//! HTML parsing for captured rules pages.
//!
//! Everything here is pure: input is a page body, output is data. Markup that
//! doesn't have the expected shape is skipped and counted in [`Skipped`]
//! rather than failing the page.

mod consts;
pub mod error;
mod extract;
pub mod models;
mod normalize;
mod url;

pub use crate::extract::{Extraction, Extractor, Skipped, TocOrder, book_acronym, content, listings, page_meta, toc};
pub use crate::normalize::{Normalize, Normalizer};
pub use crate::url::{canonicalize, matches_canonical};
