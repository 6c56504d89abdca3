//! Filesystem helpers shared by the provenance store and the rearrange step

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{CoreError, Result};

/// Copy the contents of `src` into `dest`, creating `dest` if needed
///
/// Symlinks are followed; the copy is a plain snapshot of what `src` looks
/// like right now. Any unreadable entry aborts the copy.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).map_err(|e| CoreError::io(dest, e))?;

    for entry in WalkDir::new(src).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            CoreError::io(path, e.into())
        })?;

        let rel_path = match entry.path().strip_prefix(src) {
            Ok(p) => p,
            Err(_) => continue,
        };
        let target = dest.join(rel_path);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| CoreError::io(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| CoreError::io(entry.path(), e))?;
        }
    }

    Ok(())
}

/// Remove a directory tree, treating "already gone" as success
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

/// Remove a file, treating "already gone" as success
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

/// Read a file's text if it exists and has content
///
/// An empty file is deleted and reported as `None`.
pub fn take_non_empty(path: &Path) -> Result<Option<String>> {
    let content = match std::fs::read(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::io(path, e)),
    };

    if content.is_empty() {
        remove_file_if_exists(path)?;
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&content).into_owned()))
}
