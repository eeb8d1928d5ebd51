//! Auxiliary document sub-scan
//!
//! Walks a project subtree with its own fixed policy, independent of the
//! discovery settings, and collects markdown documents.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::paths::file_name_lossy;
use crate::scan::detect::MARKER_DOCUMENT;

/// Extension of tracked documents
pub const DOCUMENT_EXTENSION: &str = "md";

/// Build and dependency directories never searched for documents
pub const DOCUMENT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    "build",
    "dist",
    "target",
    ".next",
    ".cache",
];

/// Depth bound of the sub-scan, in path segments below the project root
pub const DOCUMENT_MAX_DEPTH: usize = 12;

/// All markdown documents under `project_root`, in display order
pub fn find_documents(project_root: &Path) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(project_root);
    builder
        .hidden(true)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .max_depth(Some(DOCUMENT_MAX_DEPTH))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| DOCUMENT_EXCLUDES.contains(&name)))
        });

    let mut documents = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::trace!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        let is_document = path
            .extension()
            .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
        if is_document && path.is_file() {
            documents.push(entry.into_path());
        }
    }

    sort_documents(&mut documents);
    documents
}

/// Marker document first, then case-insensitive by file name.
///
/// The sort is stable: equal names keep their discovery order.
pub fn sort_documents(documents: &mut [PathBuf]) {
    documents.sort_by_key(|path| {
        let name = file_name_lossy(path);
        (name != MARKER_DOCUMENT, name.to_lowercase())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    fn names(docs: &[PathBuf]) -> Vec<String> {
        docs.iter().map(|d| file_name_lossy(d)).collect()
    }

    #[test]
    fn test_sort_marker_first_then_case_insensitive() {
        let mut docs = vec![
            PathBuf::from("/p/b.md"),
            PathBuf::from("/p/CLAUDE.md"),
            PathBuf::from("/p/A.md"),
        ];
        sort_documents(&mut docs);
        assert_eq!(names(&docs), vec!["CLAUDE.md", "A.md", "b.md"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_names() {
        let mut docs = vec![
            PathBuf::from("/p/z/README.md"),
            PathBuf::from("/p/a/readme.md"),
            PathBuf::from("/p/m/README.md"),
        ];
        sort_documents(&mut docs);
        assert_eq!(
            docs,
            vec![
                PathBuf::from("/p/z/README.md"),
                PathBuf::from("/p/a/readme.md"),
                PathBuf::from("/p/m/README.md"),
            ]
        );
    }

    #[test]
    fn test_find_documents_collects_markdown_only() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("CLAUDE.md"));
        touch(&root.join("b.md"));
        touch(&root.join("docs/A.md"));
        touch(&root.join("src/main.rs"));
        touch(&root.join("notes.markdown"));

        let docs = find_documents(root);
        assert_eq!(names(&docs), vec!["CLAUDE.md", "A.md", "b.md"]);
        assert!(docs.contains(&root.join("docs/A.md")));
    }

    #[test]
    fn test_find_documents_skips_excluded_and_hidden() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("README.md"));
        touch(&root.join("node_modules/pkg/README.md"));
        touch(&root.join("target/doc/index.md"));
        touch(&root.join(".github/PULL_REQUEST_TEMPLATE.md"));
        touch(&root.join(".hidden.md"));

        let docs = find_documents(root);
        assert_eq!(docs, vec![root.join("README.md")]);
    }

    #[test]
    fn test_excluded_name_on_file_does_not_block() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        // A regular file called "build" is not a directory to prune
        touch(&root.join("build"));
        touch(&root.join("guide.md"));

        assert_eq!(find_documents(root), vec![root.join("guide.md")]);
    }

    #[test]
    fn test_find_documents_missing_root() {
        let docs = find_documents(Path::new("/nonexistent/project"));
        assert!(docs.is_empty());
    }
}
