//! The captured library object graph.
//!
//! A [`Library`] is built from the sources listing document and one folder of
//! captured pages per owned book. Books are put in reading order by
//! [`order`], their pages scanned for content references, and the references
//! of every book merged into one library-wide set by [`Merger`].

mod book;
mod diagnostics;
pub mod error;
mod fs;
mod library;
mod merge;
pub mod order;
mod page;
mod sources;

pub use crate::book::{Book, BookChanges, PageKey};
pub use crate::diagnostics::Diagnostics;
pub use crate::library::{BookFilter, Content, DEFAULT_STATE_FILE, Library, LibraryOptions, Selection};
pub use crate::merge::{Merged, Merger};
pub use crate::page::{Page, Toc, hydrate, load_html};
pub use crate::sources::{DEFAULT_SOURCES_FILE, Sources};
