use crate::error::Result;
use crate::fs;
use folio_extract::models::Listing;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

pub const DEFAULT_SOURCES_FILE: &str = "sources.html";
const SOURCES_URL: &str = "https://www.dndbeyond.com/sources";

/// The captured sources listing: every book of the library, owned or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sources {
    pub name: String,
    pub file: PathBuf,
    pub path: PathBuf,
    pub url: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub modified: Option<OffsetDateTime>,
}
impl Sources {
    /// The listing document `file` inside the library `root`.
    pub fn new(root: &Path, file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        Self {
            name: "sources".to_string(),
            path: root.join(&file),
            file,
            url: SOURCES_URL.to_string(),
            modified: None,
        }
    }

    /// Records the listing's modification time.
    pub fn refresh(&mut self) -> Result<()> {
        self.modified = Some(fs::modified(&self.path)?);
        Ok(())
    }

    pub fn update_available(&self) -> bool {
        fs::is_stale(Some(&self.path), self.modified)
    }

    pub fn file_exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn validate(&self) -> bool {
        self.file_exists()
    }

    pub fn read_html(&self) -> Result<String> {
        fs::read_html(&self.path)
    }

    /// Book entries of the listing, with `local_path` relative to the library.
    pub fn listings(&self) -> Result<Vec<Listing>> {
        Ok(folio_extract::listings(&self.read_html()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_staleness() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = Sources::new(dir.path(), DEFAULT_SOURCES_FILE);
        assert_eq!(sources.path, dir.path().join("sources.html"));
        assert!(!sources.update_available());
        assert!(matches!(&*sources.refresh().unwrap_err(), ErrorKind::NotFound(_)));

        std::fs::write(&sources.path, "<html></html>").unwrap();
        assert!(sources.update_available());
        sources.refresh().unwrap();
        assert!(!sources.update_available());
        assert!(sources.validate());
        assert!(sources.listings().unwrap().is_empty());
    }
}
