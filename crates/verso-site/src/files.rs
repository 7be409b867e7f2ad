//! Filesystem helpers shared by the assembly steps.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{AssembleError, IoResultExt};

/// List ref directories directly under `root`, in enumeration order.
///
/// Hidden entries and plain files are skipped.
pub(crate) fn list_ref_dirs(root: &Path) -> Result<Vec<String>, AssembleError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root).at(root)? {
        let entry = entry.at(root)?;
        if !entry.file_type().at(&entry.path())?.is_dir() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!(name = ?raw, "Skipping ref directory with a non-UTF-8 name");
                continue;
            }
        };
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}

/// Replace `dest` with a recursive copy of `src`.
///
/// Any existing `dest` is removed first, so stale files never survive.
pub(crate) fn replace_dir(src: &Path, dest: &Path) -> Result<(), AssembleError> {
    remove_dir_if_exists(dest)?;
    copy_dir(src, dest)
}

fn remove_dir_if_exists(dir: &Path) -> Result<(), AssembleError> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(AssembleError::io(dir, e)),
        _ => Ok(()),
    }
}

fn copy_dir(src: &Path, dest: &Path) -> Result<(), AssembleError> {
    let entries = fs::read_dir(src).at(src)?;
    fs::create_dir_all(dest).at(dest)?;
    for entry in entries {
        let entry = entry.at(src)?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        let file_type = entry.file_type().at(&path)?;
        if file_type.is_dir() {
            copy_dir(&path, &target)?;
        } else {
            fs::copy(&path, &target).at(&target)?;
        }
    }
    Ok(())
}

/// Collect all `.html` files beneath `dir`, sorted for stable processing.
pub(crate) fn html_files(dir: &Path) -> Result<Vec<PathBuf>, AssembleError> {
    let mut files = Vec::new();
    walk_html(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_html(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), AssembleError> {
    for entry in fs::read_dir(current).at(current)? {
        let entry = entry.at(current)?;
        let path = entry.path();
        if entry.file_type().at(&path)?.is_dir() {
            walk_html(&path, files)?;
        } else if path.extension().is_some_and(|e| e == "html") {
            files.push(path);
        }
    }
    Ok(())
}

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Returns `true` when the file was written.
pub(crate) fn write_if_changed(path: &Path, content: &str) -> Result<bool, AssembleError> {
    match fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(AssembleError::io(path, e)),
    }
    fs::write(path, content).at(path)?;
    Ok(true)
}
