mod kind;
mod listing;
mod meta;
mod reference;

pub use self::kind::{ContentKind, PageKind};
pub use self::listing::Listing;
pub use self::meta::PageMeta;
pub use self::reference::{BookOrigin, ContentReference, PageOrigin, Provenance};

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace('-', "").replace('_', "").replace(' ', "")
}
