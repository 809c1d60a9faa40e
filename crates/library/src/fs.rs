//! Thin wrappers around `std::fs` mapping I/O failures onto [`ErrorKind`].

use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

pub(crate) fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    }
}

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path).map_err(|e| map_io_error(e, path))?)
}

/// Reads a captured HTML document. Bytes that aren't valid UTF-8 become
/// replacement characters rather than failing the page.
pub(crate) fn read_html(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| map_io_error(e, path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(crate) fn write(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| map_io_error(e, parent))?;
    }
    Ok(std::fs::write(path, contents).map_err(|e| map_io_error(e, path))?)
}

/// Modification time of a file that must exist.
pub(crate) fn modified(path: &Path) -> Result<OffsetDateTime> {
    let metadata = std::fs::metadata(path).map_err(|e| map_io_error(e, path))?;
    Ok(metadata.modified().map_err(ErrorKind::Io)?.into())
}

/// The dirty check shared by every file-backed record: a missing file is
/// never stale, a file never observed always is.
pub(crate) fn is_stale(path: Option<&Path>, observed: Option<OffsetDateTime>) -> bool {
    let Some(path) = path.filter(|p| p.is_file()) else {
        return false;
    };
    match (observed, modified(path)) {
        (None, _) => true,
        (Some(observed), Ok(current)) => observed < current,
        (Some(_), Err(_)) => false,
    }
}

/// Recursively lists the `.html` files under `root`, sorted by path.
pub(crate) fn html_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| map_io_error(e, &current))?;
        for entry in entries {
            let path = entry.map_err(|e| map_io_error(e, &current))?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
                files.push(path);
            }
            // Note: silently drop what is most likely a broken symlink.
        }
    }
    files.sort();
    Ok(files)
}

/// Whether `path` is a directory with at least one entry.
pub(crate) fn has_entries(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}
