//! Path helpers shared by the scanner and the document sub-scan

use std::path::{Component, Path};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Check if a path is hidden (starts with '.')
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Number of path segments between `root` and `path`.
///
/// Returns `None` when `path` is not under `root`.
pub fn depth_below(path: &Path, root: &Path) -> Option<usize> {
    path.strip_prefix(root).ok().map(|rel| {
        rel.components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
    })
}

/// Final segment of a path as UTF-8, lossy
pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
