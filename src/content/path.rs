//! Path canonicalization for cache and watch keys.

use std::path::{Path, PathBuf};

/// Resolve `path` to the absolute form used as a cache/watch key.
///
/// Existing files are fully resolved (symlinks, `..`). Paths that do not
/// exist (yet, or any more) fall back to their lexical absolute form so a
/// deleted file still maps to the key it had while present, provided its
/// directory still resolves.
pub fn canonicalize(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => match std::fs::canonicalize(parent) {
            Ok(parent) => parent.join(name),
            Err(_) => absolute,
        },
        _ => absolute,
    }
}
