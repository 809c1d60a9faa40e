/// One book entry of the sources listing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Display name, e.g. "Player's Handbook (2014)"
    pub name: String,
    /// Acronym built from the display name, e.g. "PH (2014)"
    pub acronym: String,
    /// Absolute URL of the book
    pub url: String,
    /// Path of the book's folder relative to the library root, e.g. `sources/phb-2014`
    pub local_path: String,
    /// Whether the listing marks the content as owned (accessible)
    pub owned: bool,
}
