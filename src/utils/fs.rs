//! Small filesystem helpers shared by the run phases

use std::io;
use std::path::{Path, PathBuf};

/// True when `path` is a regular file with at least one byte.
pub fn is_nonempty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Remove a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Sibling path used while a file is being written.
pub fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

/// Copy `src` to `dest` through a `.partial` sibling and a rename, so
/// `dest` is either absent or complete.
pub fn copy_atomic(src: &Path, dest: &Path) -> io::Result<u64> {
    let staging = partial_path(dest);
    let copied = match std::fs::copy(src, &staging) {
        Ok(n) => n,
        Err(e) => {
            let _ = remove_if_exists(&staging);
            return Err(e);
        }
    };
    std::fs::rename(&staging, dest)?;
    Ok(copied)
}
